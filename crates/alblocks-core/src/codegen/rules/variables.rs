//! Variable access. Dynamically typed variables generate the same code.

use super::field;
use crate::block::Block;
use crate::codegen::names::NameKind;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("variables_get", emit_get);
    generator.register_rule("variables_get_dynamic", emit_get);
    generator.register_rule("variables_set", emit_set);
    generator.register_rule("variables_set_dynamic", emit_set);
}

fn emit_get(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let name = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    Ok(Emission::value(name, Order::Atomic))
}

fn emit_set(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let value = generator.value_to_code_or(block, "VALUE", Order::None, "0")?;
    let name = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    Ok(Emission::statement(format!("{name} := {value};\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockNode, Workspace};

    #[test]
    fn test_set_defaults_to_zero() {
        let block = BlockNode::new("variables_set").with_field("VAR", "x");
        assert_eq!(
            CodeGenerator::new().block_to_code(Some(&block), true).unwrap(),
            Emission::statement("x := 0;\n")
        );
    }

    #[test]
    fn test_variable_ids_resolve_to_display_names() {
        let workspace = Workspace::new()
            .with_variable("v1", "item count")
            .with_block(
                BlockNode::new("variables_set_dynamic")
                    .with_field("VAR", "v1")
                    .with_value("VALUE", BlockNode::new("variables_get").with_field("VAR", "v1")),
            );
        assert_eq!(
            CodeGenerator::new().workspace_to_code(&workspace).unwrap(),
            "item_count := item_count;\n"
        );
    }

    #[test]
    fn test_reserved_variable_names_are_renamed() {
        let workspace = Workspace::new()
            .with_variable("v1", "end")
            .with_block(BlockNode::new("variables_set").with_field("VAR", "v1"));
        assert_eq!(
            CodeGenerator::new().workspace_to_code(&workspace).unwrap(),
            "end2 := 0;\n"
        );
    }
}
