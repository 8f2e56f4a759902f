//! Collision-free identifier allocation for one generation pass.

use crate::block::VariableModel;
use crate::config::NamespaceConfig;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Words the allocator never hands out as bare identifiers. AL keywords plus
/// the names of built-ins that generated code calls directly.
pub const AL_RESERVED_WORDS: &[&str] = &[
    "error", "trigger", "message", "and", "array", "asserterror", "begin", "break", "case",
    "codeunit", "div", "do", "downto", "else", "end", "event", "exit", "false", "for", "foreach",
    "procedure", "if", "in", "local", "mod", "nil", "not", "of", "or", "record", "repeat", "then",
    "to", "true", "until", "var", "while", "with", "xor",
];

static DEFAULT_RESERVED: Lazy<FxHashSet<String>> =
    Lazy::new(|| AL_RESERVED_WORDS.iter().map(|w| w.to_ascii_lowercase()).collect());

/// Punctuation that URI encoding leaves alone; it still is not legal in an
/// identifier and collapses to a single underscore.
const URI_PUNCTUATION: &str = ";,/?:@&=+$-.!~*'()#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKind {
    Variable,
    Procedure,
    /// Names introduced by the generator itself (loop counters, temporaries).
    DeveloperVariable,
}

impl NameKind {
    /// The runtime scope a name of this kind is declared in. Temporaries are
    /// ordinary AL variables once emitted.
    pub fn scope(self) -> NameKind {
        match self {
            NameKind::DeveloperVariable => NameKind::Variable,
            other => other,
        }
    }
}

/// How a kind's names interact with names of other kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespacePolicy {
    /// One pool shared with every other kind.
    #[default]
    Shared,
    /// Only names in the same scope collide.
    Separate,
}

/// Maps logical names to legal, distinct AL identifiers.
///
/// AL identifiers are case-insensitive, so all collision checks compare
/// lowercased names while the allocated spelling keeps the original case.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    reserved: FxHashSet<String>,
    namespaces: NamespaceConfig,
    bindings: FxHashMap<(NameKind, String), String>,
    /// Lowercased name to the kinds holding it.
    used: FxHashMap<String, FxHashSet<NameKind>>,
    /// Variable id to display name.
    variable_map: FxHashMap<String, String>,
}

impl NameAllocator {
    pub fn new<I, S>(extra_reserved: I, namespaces: NamespaceConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reserved = DEFAULT_RESERVED.clone();
        reserved.extend(
            extra_reserved
                .into_iter()
                .map(|w| w.as_ref().to_ascii_lowercase()),
        );
        Self {
            reserved,
            namespaces,
            bindings: FxHashMap::default(),
            used: FxHashMap::default(),
            variable_map: FxHashMap::default(),
        }
    }

    /// Forgets every allocation and the variable map. Reserved words stay.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.used.clear();
        self.variable_map.clear();
    }

    pub fn set_variable_map(&mut self, variables: &[VariableModel]) {
        self.variable_map = variables
            .iter()
            .map(|v| (v.id.clone(), v.name.clone()))
            .collect();
    }

    pub fn populate_variables(&mut self, variables: &[VariableModel]) {
        for variable in variables {
            self.get_name(&variable.id, NameKind::Variable);
        }
    }

    pub fn populate_procedures(&mut self, procedures: &[String]) {
        for procedure in procedures {
            self.get_name(procedure, NameKind::Procedure);
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_ascii_lowercase())
    }

    /// The identifier bound to `name` for `kind`, allocating it on first use.
    /// For variables, `name` may be a variable id known to the variable map.
    pub fn get_name(&mut self, name: &str, kind: NameKind) -> String {
        let logical = match kind {
            NameKind::Variable => self
                .variable_map
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            _ => name.to_string(),
        };
        let key = (kind, logical.to_lowercase());
        if let Some(existing) = self.bindings.get(&key) {
            return existing.clone();
        }

        let any_kind = self.namespaces.policy(kind) == NamespacePolicy::Shared;
        let allocated = self.allocate(&logical, kind, any_kind);
        self.bindings.insert(key, allocated.clone());
        allocated
    }

    /// A name derived from `name` that no earlier allocation of any kind in
    /// this pass has produced. The result is not bound to `name`.
    pub fn get_distinct_name(&mut self, name: &str, kind: NameKind) -> String {
        self.allocate(name, kind, true)
    }

    fn allocate(&mut self, name: &str, kind: NameKind, any_kind: bool) -> String {
        let safe = safe_name(name);
        let mut candidate = safe.clone();
        let mut suffix = 1;
        while self.is_taken(&candidate, kind, any_kind) {
            suffix += 1;
            candidate = format!("{safe}{suffix}");
        }
        if suffix > 1 {
            tracing::trace!("Renamed {:?} to {:?} to avoid a collision", name, candidate);
        }
        self.used
            .entry(candidate.to_lowercase())
            .or_default()
            .insert(kind);
        candidate
    }

    fn is_taken(&self, candidate: &str, kind: NameKind, any_kind: bool) -> bool {
        let key = candidate.to_lowercase();
        if self.reserved.contains(&key) {
            return true;
        }
        match self.used.get(&key) {
            Some(kinds) => any_kind || kinds.iter().any(|k| k.scope() == kind.scope()),
            None => false,
        }
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>(), NamespaceConfig::default())
    }
}

/// Turns arbitrary user text into an identifier: spaces and punctuation
/// become underscores, non-ASCII characters become `_XX` byte escapes, and a
/// leading digit gets a `my_` prefix.
pub fn safe_name(name: &str) -> String {
    if name.is_empty() {
        return "unnamed".to_string();
    }
    let mut safe = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            safe.push(c);
        } else if c == ' ' || URI_PUNCTUATION.contains(c) {
            safe.push('_');
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(safe, "_{byte:02X}");
            }
        }
    }
    if safe.starts_with(|c: char| c.is_ascii_digit()) {
        safe.insert_str(0, "my_");
    }
    safe
}
