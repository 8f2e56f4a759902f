use thiserror::Error;

/// Fatal conditions of a generation pass.
///
/// Missing operands and name collisions are never errors: the former fall
/// back to per-rule defaults and the latter are resolved by the name
/// allocator. Everything here aborts the pass, and the message names the
/// block type (and field value) that could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("AL generator does not know how to generate code for block type \"{block_type}\"")]
    UnknownBlockType { block_type: String },

    #[error("unknown value \"{value}\" in field {field} of block type \"{block_type}\"")]
    UnknownFieldValue {
        block_type: String,
        field: String,
        value: String,
    },

    #[error("block type \"{block_type}\" does not produce a value")]
    NotAValue { block_type: String },

    #[error("block type \"{block_type}\" produces a value where a statement is expected")]
    NotAStatement { block_type: String },
}

impl GenerationError {
    pub fn unknown_field(block_type: &str, field: &str, value: Option<&str>) -> Self {
        GenerationError::UnknownFieldValue {
            block_type: block_type.to_string(),
            field: field.to_string(),
            value: value.unwrap_or_default().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
