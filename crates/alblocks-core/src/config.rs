//! Generator configuration.
//!
//! Every field has a default, so partial YAML/JSON files deserialize into a
//! complete configuration.

use crate::codegen::names::{NameKind, NamespacePolicy};
use serde::{Deserialize, Serialize};

/// Default width, in columns, that block comments are wrapped to.
pub const DEFAULT_COMMENT_WRAP: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Words that may never be produced as bare identifiers, on top of the
    /// built-in AL keyword list.
    pub reserved_words: Vec<String>,

    /// Namespace policy for each kind of name.
    pub namespaces: NamespaceConfig,

    /// Indentation unit used for nested statements and hoisted helpers.
    pub indent: String,

    /// Code injected before every statement. `%1` expands to the quoted
    /// block id.
    pub statement_prefix: Option<String>,

    /// Code injected after every statement. `%1` expands to the quoted
    /// block id.
    pub statement_suffix: Option<String>,

    /// Code injected at the top of every loop and procedure body.
    pub infinite_loop_trap: Option<String>,

    /// Column at which comments are wrapped.
    pub comment_wrap: usize,

    /// Return type written for procedures whose return value type cannot be
    /// guessed from the returning block.
    pub default_return_type: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reserved_words: Vec::new(),
            namespaces: NamespaceConfig::default(),
            indent: "  ".to_string(),
            statement_prefix: None,
            statement_suffix: None,
            infinite_loop_trap: None,
            comment_wrap: DEFAULT_COMMENT_WRAP,
            default_return_type: "Variant".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_statement_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.statement_prefix = Some(prefix.into());
        self
    }

    pub fn with_statement_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.statement_suffix = Some(suffix.into());
        self
    }

    pub fn with_infinite_loop_trap(mut self, trap: impl Into<String>) -> Self {
        self.infinite_loop_trap = Some(trap.into());
        self
    }

    pub fn with_reserved_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn with_namespace(mut self, kind: NameKind, policy: NamespacePolicy) -> Self {
        self.namespaces.set(kind, policy);
        self
    }

    /// Statement prefix, treating an empty string as absent.
    pub fn statement_prefix(&self) -> Option<&str> {
        self.statement_prefix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn statement_suffix(&self) -> Option<&str> {
        self.statement_suffix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn infinite_loop_trap(&self) -> Option<&str> {
        self.infinite_loop_trap.as_deref().filter(|s| !s.is_empty())
    }
}

/// Per-kind namespace policies. Generator temporaries live in the variable
/// scope and follow the variable policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub variable: NamespacePolicy,
    pub procedure: NamespacePolicy,
}

impl NamespaceConfig {
    pub fn policy(&self, kind: NameKind) -> NamespacePolicy {
        match kind.scope() {
            NameKind::Procedure => self.procedure,
            _ => self.variable,
        }
    }

    pub fn set(&mut self, kind: NameKind, policy: NamespacePolicy) {
        match kind.scope() {
            NameKind::Procedure => self.procedure = policy,
            _ => self.variable = policy,
        }
    }
}
