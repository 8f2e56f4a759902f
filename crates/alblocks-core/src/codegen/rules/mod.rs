//! Built-in emission rules, one module per block category.

pub mod logic;
pub mod loops;
pub mod math;
pub mod procedures;
pub mod text;
pub mod variables;

use crate::block::Block;
use crate::codegen::CodeGenerator;
use crate::errors::GenerationError;

pub(crate) fn register_builtins(generator: &mut CodeGenerator) {
    logic::register(generator);
    loops::register(generator);
    math::register(generator);
    procedures::register(generator);
    text::register(generator);
    variables::register(generator);
}

/// The value of dropdown `field`, or the empty string.
pub(crate) fn field<'a>(block: &'a dyn Block, name: &str) -> &'a str {
    block.field_value(name).unwrap_or_default()
}

pub(crate) fn unknown_field(block: &dyn Block, field: &str) -> GenerationError {
    GenerationError::unknown_field(block.block_type(), field, block.field_value(field))
}
