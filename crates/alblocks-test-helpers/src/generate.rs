//! One-call generation for tests.

use alblocks_core::{
    Block, BlockNode, CodeGenerator, Emission, GenerationError, GeneratorConfig, Workspace,
};

/// Generate AL for a workspace made of `blocks`, in order
///
/// # Arguments
/// * `blocks` - Top-level blocks of the workspace
///
/// # Returns
/// The generated AL text or the generation error
pub fn generate(blocks: Vec<BlockNode>) -> Result<String, GenerationError> {
    generate_with_config(blocks, GeneratorConfig::default())
}

/// Generate AL for `blocks` with a custom configuration
pub fn generate_with_config(
    blocks: Vec<BlockNode>,
    config: GeneratorConfig,
) -> Result<String, GenerationError> {
    let workspace = blocks
        .into_iter()
        .fold(Workspace::new(), |workspace, block| workspace.with_block(block));
    CodeGenerator::with_config(config).workspace_to_code(&workspace)
}

/// Generate AL for a serialized JSON workspace
///
/// # Returns
/// The generated AL text, or a message describing the load or generation error
pub fn generate_json(json: &str) -> Result<String, String> {
    let workspace = Workspace::from_json(json).map_err(|e| e.to_string())?;
    CodeGenerator::new()
        .workspace_to_code(&workspace)
        .map_err(|e| e.to_string())
}

/// The expression text of a single value block, outside any workspace
pub fn generate_value(block: &BlockNode) -> Result<String, GenerationError> {
    let mut generator = CodeGenerator::new();
    match generator.block_to_code(Some(block), true)? {
        Emission::Value(fragment) => Ok(fragment.code),
        _ => Err(GenerationError::NotAValue {
            block_type: block.block_type().to_string(),
        }),
    }
}
