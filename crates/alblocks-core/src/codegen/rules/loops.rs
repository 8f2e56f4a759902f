//! Loops and loop control.
//!
//! AL has no `continue`. A continue is emitted as [`CONTINUE_MARKER`] and
//! every loop whose body text contains the marker gets a `::continue::`
//! label appended after its body. The scan is textual, so a loop may get a
//! label it does not need (an outer loop, or a string literal containing the
//! marker); such labels are harmless.

use super::{field, unknown_field};
use crate::block::Block;
use crate::codegen::format::{format_number, inject_id, is_number, parse_number};
use crate::codegen::names::NameKind;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

pub const CONTINUE_MARKER: &str = "goto continue\n";

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("controls_repeat_ext", emit_repeat);
    generator.register_rule("controls_repeat", emit_repeat);
    generator.register_rule("controls_whileUntil", emit_while_until);
    generator.register_rule("controls_for", emit_for);
    generator.register_rule("controls_forEach", emit_for_each);
    generator.register_rule("controls_flow_statements", emit_flow_statement);
}

/// Appends the continue label to `body` if it contains a continue.
pub fn add_continue_label(body: &str, indent: &str) -> String {
    if body.contains(CONTINUE_MARKER) {
        format!("{body}{indent}::continue::\n")
    } else {
        body.to_string()
    }
}

/// The `DO` body of a loop block with trap, hooks and continue label.
fn loop_body(generator: &mut CodeGenerator, block: &dyn Block) -> Result<String> {
    generator.within_loop(block, |generator| {
        let branch = generator.statement_to_code(block, "DO")?;
        let branch = generator.add_loop_trap(&branch, block);
        Ok(add_continue_label(&branch, generator.indent()))
    })
}

fn emit_repeat(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let repeats = match block.field_value("TIMES") {
        Some(times) => format_number(parse_number(times)),
        None => generator.value_to_code_or(block, "TIMES", Order::None, "0")?,
    };
    let repeats = if is_number(&repeats) {
        // Whole iterations only.
        format_number(parse_number(&repeats).trunc())
    } else {
        format!("math.floor({repeats})")
    };
    let branch = loop_body(generator, block)?;
    let counter = generator.names().get_distinct_name("count", NameKind::DeveloperVariable);
    Ok(Emission::statement(format!(
        "for {counter} := 1 to {repeats} do begin\n{branch}end;\n"
    )))
}

fn emit_while_until(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let until = match field(block, "MODE") {
        "WHILE" => false,
        "UNTIL" => true,
        _ => return Err(unknown_field(block, "MODE")),
    };
    let order = if until { Order::Unary } else { Order::None };
    let condition = generator.value_to_code_or(block, "BOOL", order, "false")?;
    let branch = loop_body(generator, block)?;
    let condition = if until {
        format!("not {condition}")
    } else {
        condition
    };
    Ok(Emission::statement(format!(
        "while {condition} do begin\n{branch}end;\n"
    )))
}

fn emit_for(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let variable = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    let from = generator.value_to_code_or(block, "FROM", Order::None, "0")?;
    let to = generator.value_to_code_or(block, "TO", Order::None, "0")?;
    let by = generator.value_to_code_or(block, "BY", Order::None, "1")?;
    let branch = loop_body(generator, block)?;

    let mut code = String::new();
    let increment = if is_number(&from) && is_number(&to) && is_number(&by) {
        let up = parse_number(&from) <= parse_number(&to);
        let step = format_number(parse_number(&by).abs());
        if up {
            step
        } else {
            format!("-{step}")
        }
    } else {
        // Direction is fixed once, before the first iteration, even if the
        // bounds change inside the loop.
        let increment = generator
            .names()
            .get_distinct_name(&format!("{variable}_inc"), NameKind::DeveloperVariable);
        let step = if is_number(&by) {
            format_number(parse_number(&by).abs())
        } else {
            format!("math.abs({by})")
        };
        let indent = generator.indent();
        code.push_str(&format!("{increment} := {step};\n"));
        code.push_str(&format!("if ({from}) > ({to}) then begin\n"));
        code.push_str(&format!("{indent}{increment} := -{increment};\n"));
        code.push_str("end;\n");
        increment
    };
    code.push_str(&format!(
        "for {variable} := {from} to {to}, {increment} do begin\n{branch}end;\n"
    ));
    Ok(Emission::statement(code))
}

fn emit_for_each(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let variable = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    let list = generator.value_to_code_or(block, "LIST", Order::None, "{}")?;
    let branch = loop_body(generator, block)?;
    Ok(Emission::statement(format!(
        "for _, {variable} in ipairs({list}) do begin\n{branch}end;\n"
    )))
}

fn emit_flow_statement(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let mut xfix = String::new();
    let prefix = generator.config().statement_prefix();
    if let Some(prefix) = prefix {
        xfix.push_str(&inject_id(prefix, block.id()));
    }
    // The regular suffix would be skipped once control leaves the loop.
    if let Some(suffix) = generator.config().statement_suffix() {
        xfix.push_str(&inject_id(suffix, block.id()));
    }
    if let (Some(prefix), Some(loop_id)) = (prefix, generator.surrounding_loop_id()) {
        xfix.push_str(&inject_id(prefix, loop_id));
    }

    match field(block, "FLOW") {
        "BREAK" => Ok(Emission::statement(format!("{xfix}break;\n"))),
        "CONTINUE" => Ok(Emission::statement(format!("{xfix}{CONTINUE_MARKER}"))),
        _ => Err(unknown_field(block, "FLOW")),
    }
}
