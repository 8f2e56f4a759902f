//! AL code generation.
//!
//! A [`CodeGenerator`] owns everything one generation pass mutates: the name
//! allocator, the hoisted definition table and the stack of loops being
//! emitted. Block types are translated by [`EmissionRule`]s registered by
//! type tag; the built-in catalog lives in [`rules`].

pub mod format;
pub mod helpers;
pub mod names;
pub mod precedence;
pub mod rules;
pub mod scrub;
pub mod traits;

pub use precedence::{Fragment, Order};
pub use traits::{Emission, EmissionRule};

use crate::block::{Block, WorkspaceSource};
use crate::config::GeneratorConfig;
use crate::errors::{GenerationError, Result};
use format::{inject_id, prefix_lines};
use helpers::HelperRegistry;
use names::NameAllocator;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A loop whose body is currently being generated.
#[derive(Debug, Clone)]
struct LoopFrame {
    id: String,
    suppresses_prefix_suffix: bool,
}

pub struct CodeGenerator {
    config: GeneratorConfig,
    names: NameAllocator,
    helpers: HelperRegistry,
    rules: FxHashMap<String, Arc<dyn EmissionRule>>,
    loop_stack: Vec<LoopFrame>,
}

impl CodeGenerator {
    /// A generator with the default configuration and the built-in rules.
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        let names = NameAllocator::new(&config.reserved_words, config.namespaces);
        let mut generator = CodeGenerator {
            config,
            names,
            helpers: HelperRegistry::new(),
            rules: FxHashMap::default(),
            loop_stack: Vec::new(),
        };
        rules::register_builtins(&mut generator);
        generator
    }

    /// Registers (or replaces) the rule for `block_type`.
    pub fn register_rule(&mut self, block_type: impl Into<String>, rule: impl EmissionRule + 'static) {
        self.rules.insert(block_type.into(), Arc::new(rule));
    }

    pub fn has_rule(&self, block_type: &str) -> bool {
        self.rules.contains_key(block_type)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn names(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// The indentation unit.
    pub fn indent(&self) -> &str {
        &self.config.indent
    }

    /// Starts a pass over `workspace`: clears all pass state and reserves the
    /// workspace's variable and procedure names.
    pub fn init(&mut self, workspace: &dyn WorkspaceSource) {
        self.names.reset();
        self.helpers.reset();
        self.loop_stack.clear();

        let variables = workspace.variables();
        self.names.set_variable_map(&variables);
        self.names.populate_variables(&variables);
        self.names.populate_procedures(&workspace.procedure_names());
        tracing::debug!(
            "Initialized generation pass with {} variable(s)",
            variables.len()
        );
    }

    /// Ends the pass: prepends the hoisted definitions to `code` and resets
    /// all pass state.
    pub fn finish(&mut self, code: &str) -> String {
        let definitions = self.helpers.definitions().collect::<Vec<_>>().join("\n\n");
        tracing::debug!("Finished generation pass with {} definition(s)", self.helpers.len());
        self.helpers.reset();
        self.names.reset();
        self.loop_stack.clear();
        format!("{definitions}\n\n\n{code}")
    }

    /// Translates `block` (and, unless `this_only`, the statements chained
    /// after it).
    pub fn block_to_code(&mut self, block: Option<&dyn Block>, this_only: bool) -> Result<Emission> {
        let Some(block) = block else {
            return Ok(Emission::Nothing);
        };
        if !block.is_enabled() {
            tracing::trace!("Skipping disabled block {}", block.block_type());
            return if this_only {
                Ok(Emission::Nothing)
            } else {
                self.block_to_code(block.next_block(), false)
            };
        }

        let rule = self
            .rules
            .get(block.block_type())
            .cloned()
            .ok_or_else(|| GenerationError::UnknownBlockType {
                block_type: block.block_type().to_string(),
            })?;

        match rule.emit(self, block)? {
            Emission::Value(fragment) => {
                let code = self.scrub(block, &fragment.code, this_only)?;
                Ok(Emission::Value(Fragment::new(code, fragment.order)))
            }
            Emission::Statement(mut code) => {
                if !block.suppresses_prefix_suffix() {
                    if let Some(prefix) = self.config.statement_prefix() {
                        code = inject_id(prefix, block.id()) + &code;
                    }
                    if let Some(suffix) = self.config.statement_suffix() {
                        code.push_str(&inject_id(suffix, block.id()));
                    }
                }
                Ok(Emission::Statement(self.scrub(block, &code, this_only)?))
            }
            Emission::Nothing => Ok(Emission::Nothing),
        }
    }

    /// Code of a statement chain starting at `block`.
    pub(crate) fn chain_to_code(&mut self, block: Option<&dyn Block>) -> Result<String> {
        match self.block_to_code(block, false)? {
            Emission::Statement(code) => Ok(code),
            Emission::Nothing => Ok(String::new()),
            Emission::Value(_) => Err(GenerationError::NotAStatement {
                block_type: block.map(|b| b.block_type().to_string()).unwrap_or_default(),
            }),
        }
    }

    /// Code of the block plugged into the value input `name`, parenthesized
    /// for a slot accepting `order`. `None` when nothing usable is connected.
    pub fn value_to_code(&mut self, block: &dyn Block, name: &str, order: Order) -> Result<Option<String>> {
        let Some(target) = block.input_target(name) else {
            return Ok(None);
        };
        match self.block_to_code(Some(target), false)? {
            Emission::Value(fragment) if fragment.code.is_empty() => Ok(None),
            Emission::Value(fragment) => Ok(Some(fragment.into_code_for(order))),
            Emission::Nothing => Ok(None),
            Emission::Statement(_) => Err(GenerationError::NotAValue {
                block_type: target.block_type().to_string(),
            }),
        }
    }

    /// [`value_to_code`](Self::value_to_code) with a default for an empty slot.
    pub fn value_to_code_or(&mut self, block: &dyn Block, name: &str, order: Order, default: &str) -> Result<String> {
        Ok(self
            .value_to_code(block, name, order)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// The statement chain in input `name`, indented one level.
    pub fn statement_to_code(&mut self, block: &dyn Block, name: &str) -> Result<String> {
        let code = self.chain_to_code(block.input_target(name))?;
        if code.is_empty() {
            Ok(code)
        } else {
            Ok(prefix_lines(&code, &self.config.indent))
        }
    }

    /// Registers a helper procedure and returns its name.
    pub fn provide_function(&mut self, key: &str, template: &str) -> String {
        self.helpers
            .provide_function(key, template, &mut self.names, &self.config.indent)
    }

    /// Stores a rendered definition in the hoisted table.
    pub fn define(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.helpers.define(key, text);
    }

    /// `template` with `%1` replaced by the quoted id of `block`.
    pub fn inject_id(&self, template: &str, block: &dyn Block) -> String {
        inject_id(template, block.id())
    }

    /// Indented statement prefix for `block`, or empty.
    pub(crate) fn indented_prefix(&self, block: &dyn Block) -> String {
        self.config
            .statement_prefix()
            .map(|prefix| prefix_lines(&inject_id(prefix, block.id()), &self.config.indent))
            .unwrap_or_default()
    }

    /// Indented statement suffix for `block`, or empty.
    pub(crate) fn indented_suffix(&self, block: &dyn Block) -> String {
        self.config
            .statement_suffix()
            .map(|suffix| prefix_lines(&inject_id(suffix, block.id()), &self.config.indent))
            .unwrap_or_default()
    }

    /// Wraps a loop body with the infinite-loop trap and the loop's own
    /// statement hooks: suffix, trap, body, then prefix.
    pub fn add_loop_trap(&self, branch: &str, block: &dyn Block) -> String {
        let mut out = String::new();
        if !block.suppresses_prefix_suffix() {
            out.push_str(&self.indented_suffix(block));
        }
        if let Some(trap) = self.config.infinite_loop_trap() {
            out.push_str(&prefix_lines(&inject_id(trap, block.id()), &self.config.indent));
        }
        out.push_str(branch);
        if !block.suppresses_prefix_suffix() {
            out.push_str(&self.indented_prefix(block));
        }
        out
    }

    /// Runs `body` with `block` registered as the innermost enclosing loop.
    pub(crate) fn within_loop<T>(
        &mut self,
        block: &dyn Block,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.loop_stack.push(LoopFrame {
            id: block.id().to_string(),
            suppresses_prefix_suffix: block.suppresses_prefix_suffix(),
        });
        let result = body(self);
        self.loop_stack.pop();
        result
    }

    /// Id of the innermost enclosing loop that takes statement hooks.
    pub(crate) fn surrounding_loop_id(&self) -> Option<&str> {
        self.loop_stack
            .last()
            .filter(|frame| !frame.suppresses_prefix_suffix)
            .map(|frame| frame.id.as_str())
    }

    /// Comments out a value block that is not plugged into anything.
    pub fn scrub_naked_value(&self, line: &str) -> String {
        format!("/*\n{line}\n*/\n")
    }

    /// Generates the whole program for `workspace`.
    pub fn workspace_to_code(&mut self, workspace: &dyn WorkspaceSource) -> Result<String> {
        self.init(workspace);

        let mut chunks = Vec::new();
        for block in workspace.top_blocks() {
            let line = match self.block_to_code(Some(block), false)? {
                Emission::Value(fragment) => fragment.code,
                Emission::Statement(code) => code,
                Emission::Nothing => continue,
            };
            if line.is_empty() {
                continue;
            }
            if block.has_output() {
                let mut line = self.scrub_naked_value(&line);
                if !block.suppresses_prefix_suffix() {
                    if let Some(prefix) = self.config.statement_prefix() {
                        line = inject_id(prefix, block.id()) + &line;
                    }
                    if let Some(suffix) = self.config.statement_suffix() {
                        line.push_str(&inject_id(suffix, block.id()));
                    }
                }
                chunks.push(line);
            } else {
                chunks.push(line);
            }
        }

        let code = self.finish(&chunks.join("\n"));
        Ok(tidy_output(&code))
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops leading blank lines, collapses trailing whitespace to a single
/// newline and strips trailing blanks from every line.
fn tidy_output(code: &str) -> String {
    let mut code = code;
    // Leading whitespace up to and including the last newline of the run.
    let leading = code.len() - code.trim_start().len();
    if let Some(pos) = code[..leading].rfind('\n') {
        code = &code[pos + 1..];
    }

    let mut out = code.to_string();
    let trimmed_len = out.trim_end().len();
    if out[trimmed_len..].contains('\n') {
        out.truncate(trimmed_len);
        out.push('\n');
    }

    out.split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}
