//! Code synthesis engine that turns visually composed block programs into
//! AL source text.
//!
//! The engine is driven by [`codegen::CodeGenerator`]: one value owns the
//! state of a generation pass (name allocation, hoisted definitions) and
//! dispatches every block to the emission rule registered for its type.

pub mod block;
pub mod codegen;
pub mod config;
pub mod errors;

pub use block::{Block, BlockNode, InputKind, InputRef, VariableModel, Workspace, WorkspaceSource};
pub use codegen::{CodeGenerator, Emission, EmissionRule, Fragment, Order};
pub use config::GeneratorConfig;
pub use errors::{GenerationError, Result};
