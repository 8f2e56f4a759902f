//! Read-only view of a visual block program.
//!
//! The generator never mutates blocks. Anything that can answer the
//! [`Block`] queries can be translated; [`BlockNode`] and [`Workspace`] are
//! the owned implementation used by the CLI and the tests.

mod tree;

pub use tree::{BlockNode, Input, Workspace, WorkspaceError};

/// Connection kind of a block input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Accepts an expression block.
    Value,
    /// Accepts a chain of statement blocks.
    Statement,
    /// Holds only fields.
    Dummy,
}

/// One entry of a block's ordered input list.
#[derive(Clone, Copy)]
pub struct InputRef<'a> {
    pub name: &'a str,
    pub kind: InputKind,
    pub target: Option<&'a dyn Block>,
}

/// The capability set the generator needs from a block.
pub trait Block {
    fn id(&self) -> &str;

    /// Type tag used to look up the emission rule.
    fn block_type(&self) -> &str;

    fn field_value(&self, name: &str) -> Option<&str>;

    /// Inputs in display order.
    fn inputs(&self) -> Vec<InputRef<'_>>;

    fn input_target(&self, name: &str) -> Option<&dyn Block> {
        self.inputs()
            .into_iter()
            .find(|input| input.name == name)
            .and_then(|input| input.target)
    }

    fn has_input(&self, name: &str) -> bool {
        self.inputs().iter().any(|input| input.name == name)
    }

    /// The statement connected below this one.
    fn next_block(&self) -> Option<&dyn Block>;

    /// Whether the block has an output connection at all.
    fn has_output(&self) -> bool;

    /// Whether the output connection is plugged into a parent's value input.
    fn is_output_connected(&self) -> bool;

    fn comment_text(&self) -> Option<&str>;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Blocks that place statement prefix/suffix hooks themselves.
    fn suppresses_prefix_suffix(&self) -> bool {
        false
    }

    /// Variable names owned by the block (procedure parameters, call
    /// arguments).
    fn vars(&self) -> Vec<String> {
        Vec::new()
    }

    /// Mutator state not represented by fields or inputs.
    fn mutation(&self, _key: &str) -> Option<String> {
        None
    }
}

/// A variable declared in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableModel {
    pub id: String,
    pub name: String,
}

impl VariableModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The program-level context bound at the start of a pass.
pub trait WorkspaceSource {
    /// Unattached blocks, in generation order.
    fn top_blocks(&self) -> Vec<&dyn Block>;

    fn variables(&self) -> Vec<VariableModel>;

    fn procedure_names(&self) -> Vec<String>;
}
