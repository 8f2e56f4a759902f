//! Conditionals and boolean expressions.

use super::{field, unknown_field};
use crate::block::Block;
use crate::codegen::format::inject_id;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("controls_if", emit_if);
    generator.register_rule("controls_ifelse", emit_if);
    generator.register_rule("logic_compare", emit_compare);
    generator.register_rule("logic_operation", emit_operation);
    generator.register_rule("logic_negate", emit_negate);
    generator.register_rule("logic_boolean", emit_boolean);
    generator.register_rule("logic_null", emit_null);
    generator.register_rule("logic_ternary", emit_ternary);
}

fn emit_if(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let mut code = String::new();
    // Hooks are placed here rather than around the whole statement.
    if let Some(prefix) = generator.config().statement_prefix() {
        code.push_str(&inject_id(prefix, block.id()));
    }
    let suffix = generator.indented_suffix(block);

    let mut arm = 0;
    loop {
        let condition =
            generator.value_to_code_or(block, &format!("IF{arm}"), Order::None, "false")?;
        let branch = generator.statement_to_code(block, &format!("DO{arm}"))?;
        if arm == 0 {
            code.push_str(&format!("if {condition} then begin\n"));
        } else {
            code.push_str(&format!("end else if {condition} then begin\n"));
        }
        code.push_str(&suffix);
        code.push_str(&branch);
        arm += 1;
        if !block.has_input(&format!("IF{arm}")) {
            break;
        }
    }

    if block.has_input("ELSE") || !suffix.is_empty() {
        let branch = generator.statement_to_code(block, "ELSE")?;
        code.push_str("end else begin\n");
        code.push_str(&suffix);
        code.push_str(&branch);
    }
    code.push_str("end;\n");
    Ok(Emission::statement(code))
}

fn emit_compare(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let operator = match field(block, "OP") {
        "EQ" => "=",
        "NEQ" => "<>",
        "LT" => "<",
        "LTE" => "<=",
        "GT" => ">",
        "GTE" => ">=",
        _ => return Err(unknown_field(block, "OP")),
    };
    let operand = Order::Relational.tighter();
    let a = generator.value_to_code_or(block, "A", operand, "0")?;
    let b = generator.value_to_code_or(block, "B", operand, "0")?;
    Ok(Emission::value(format!("{a} {operator} {b}"), Order::Relational))
}

fn emit_operation(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let (operator, order) = match field(block, "OP") {
        "AND" => ("and", Order::And),
        "OR" => ("or", Order::Or),
        _ => return Err(unknown_field(block, "OP")),
    };
    let a = generator.value_to_code(block, "A", order)?;
    let b = generator.value_to_code(block, "B", order)?;
    let (a, b) = match (a, b) {
        (None, None) => ("false".to_string(), "false".to_string()),
        (a, b) => {
            // A single missing operand must not change the result.
            let neutral = if operator == "and" { "true" } else { "false" };
            (
                a.unwrap_or_else(|| neutral.to_string()),
                b.unwrap_or_else(|| neutral.to_string()),
            )
        }
    };
    Ok(Emission::value(format!("{a} {operator} {b}"), order))
}

fn emit_negate(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let operand = generator.value_to_code_or(block, "BOOL", Order::Unary, "true")?;
    Ok(Emission::value(format!("not {operand}"), Order::Unary))
}

fn emit_boolean(_generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let code = if field(block, "BOOL") == "TRUE" { "true" } else { "false" };
    Ok(Emission::value(code, Order::Atomic))
}

fn emit_null(_generator: &mut CodeGenerator, _block: &dyn Block) -> Result<Emission> {
    Ok(Emission::value("nil", Order::Atomic))
}

fn emit_ternary(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let condition = generator.value_to_code_or(block, "IF", Order::And, "false")?;
    let then = generator.value_to_code_or(block, "THEN", Order::And, "nil")?;
    let otherwise = generator.value_to_code_or(block, "ELSE", Order::Or, "nil")?;
    Ok(Emission::value(
        format!("{condition} and {then} or {otherwise}"),
        Order::Or,
    ))
}
