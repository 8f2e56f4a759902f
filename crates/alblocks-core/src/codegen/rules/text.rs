//! Text values and operations.

use super::math::negate;
use super::{field, unknown_field};
use crate::block::Block;
use crate::codegen::format::quote;
use crate::codegen::names::NameKind;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("text", emit_text);
    generator.register_rule("text_append", emit_append);
    generator.register_rule("text_length", emit_length);
    generator.register_rule("text_isEmpty", emit_is_empty);
    generator.register_rule("text_indexOf", emit_index_of);
    generator.register_rule("text_getSubstring", emit_get_substring);
    generator.register_rule("text_changeCase", emit_change_case);
    generator.register_rule("text_print", emit_print);
}

fn emit_text(_generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    Ok(Emission::value(quote(field(block, "TEXT")), Order::Atomic))
}

fn emit_append(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let variable = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    let value = generator.value_to_code_or(block, "TEXT", Order::Concatenation, "''")?;
    Ok(Emission::statement(format!(
        "{variable} := {variable} + {value};\n"
    )))
}

fn emit_length(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let text = generator.value_to_code_or(block, "VALUE", Order::Unary, "''")?;
    Ok(Emission::value(format!("strlen({text})"), Order::Unary))
}

fn emit_is_empty(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let text = generator.value_to_code_or(block, "VALUE", Order::Unary, "''")?;
    Ok(Emission::value(format!("{text} = ''"), Order::Relational))
}

fn emit_index_of(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let substring = generator.value_to_code_or(block, "FIND", Order::None, "''")?;
    let text = generator.value_to_code_or(block, "VALUE", Order::None, "''")?;
    Ok(Emission::value(
        format!("strpos({text}, {substring})"),
        Order::High,
    ))
}

/// One end of a substring range. Position inputs are only generated when the
/// dropdown uses them.
fn substring_position(
    generator: &mut CodeGenerator,
    block: &dyn Block,
    where_field: &str,
    at_input: &str,
    fixed: (&str, &str),
) -> Result<String> {
    let (fixed_mode, fixed_code) = fixed;
    match field(block, where_field) {
        mode if mode == fixed_mode => Ok(fixed_code.to_string()),
        "FROM_START" => generator.value_to_code_or(block, at_input, Order::None, "1"),
        "FROM_END" => {
            let at = generator.value_to_code_or(block, at_input, Order::Unary, "1")?;
            Ok(negate(&at))
        }
        _ => Err(unknown_field(block, where_field)),
    }
}

fn emit_get_substring(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let text = generator.value_to_code_or(block, "STRING", Order::None, "''")?;
    let start = substring_position(generator, block, "WHERE1", "AT1", ("FIRST", "1"))?;
    let end = substring_position(generator, block, "WHERE2", "AT2", ("LAST", "-1"))?;
    Ok(Emission::value(
        format!("string.sub({text}, {start}, {end})"),
        Order::High,
    ))
}

fn emit_change_case(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    // AL has no title case conversion.
    let function = match field(block, "CASE") {
        "UPPERCASE" | "TITLECASE" => "UpperCase",
        "LOWERCASE" => "LowerCase",
        _ => return Err(unknown_field(block, "CASE")),
    };
    let text = generator.value_to_code_or(block, "TEXT", Order::None, "''")?;
    Ok(Emission::value(format!("{function}({text})"), Order::High))
}

fn emit_print(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let message = generator.value_to_code_or(block, "TEXT", Order::None, "''")?;
    Ok(Emission::statement(format!("message({message});\n")))
}
