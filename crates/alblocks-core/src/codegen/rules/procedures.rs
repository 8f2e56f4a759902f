//! Procedure definitions and calls.
//!
//! Definitions are hoisted into the definition table under `%` + name so
//! they can never collide with helper keys, and emit nothing in place.

use super::field;
use crate::block::Block;
use crate::codegen::format::prefix_lines;
use crate::codegen::names::NameKind;
use crate::codegen::traits::emit::comma_list;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("procedures_defreturn", emit_definition);
    generator.register_rule("procedures_defnoreturn", emit_definition);
    generator.register_rule("procedures_callreturn", emit_call_return);
    generator.register_rule("procedures_callnoreturn", emit_call_no_return);
    generator.register_rule("procedures_ifreturn", emit_if_return);
}

/// AL type written for the value returned by a block of `block_type`.
fn return_type<'a>(block_type: &str, default: &'a str) -> &'a str {
    match block_type {
        "math_number" | "math_arithmetic" => "Decimal",
        "logic_boolean" => "Boolean",
        "text" => "Text",
        _ => default,
    }
}

fn emit_definition(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let name = generator.names().get_name(field(block, "NAME"), NameKind::Procedure);
    let indent = generator.indent().to_string();

    let mut hooks = String::new();
    if let Some(prefix) = generator.config().statement_prefix() {
        hooks.push_str(&generator.inject_id(prefix, block));
    }
    if let Some(suffix) = generator.config().statement_suffix() {
        hooks.push_str(&generator.inject_id(suffix, block));
    }
    if !hooks.is_empty() {
        hooks = prefix_lines(&hooks, &indent);
    }
    let loop_trap = generator
        .config()
        .infinite_loop_trap()
        .map(|trap| prefix_lines(&generator.inject_id(trap, block), &indent))
        .unwrap_or_default();

    let branch = generator.statement_to_code(block, "STACK")?;
    let return_value = generator.value_to_code(block, "RETURN", Order::None)?;

    let mut signature = format!("procedure {name}(");
    let params = block
        .vars()
        .iter()
        .map(|param| generator.names().get_name(param, NameKind::Variable))
        .collect::<Vec<_>>();
    signature.push_str(&comma_list(&params));
    signature.push(')');

    let mut exit = String::new();
    if let Some(value) = &return_value {
        let returned = block
            .input_target("RETURN")
            .map(|target| target.block_type())
            .unwrap_or_default();
        let default = generator.config().default_return_type.as_str();
        signature.push_str(" : ");
        signature.push_str(return_type(returned, default));
        // The hooks run again once the body is done, before returning.
        if !branch.is_empty() {
            exit.push_str(&hooks);
        }
        exit.push_str(&format!("{indent}exit({value});\n"));
    }

    let code = format!("{signature}\nbegin\n{hooks}{loop_trap}{branch}{exit}end;\n");
    let code = generator.scrub(block, &code, false)?;
    tracing::debug!("Hoisted procedure {}", name);
    generator.define(format!("%{name}"), code);
    Ok(Emission::Nothing)
}

fn call_code(generator: &mut CodeGenerator, block: &dyn Block) -> Result<String> {
    let name = generator.names().get_name(field(block, "NAME"), NameKind::Procedure);
    let mut args = Vec::new();
    for i in 0..block.vars().len() {
        args.push(generator.value_to_code_or(block, &format!("ARG{i}"), Order::None, "nil")?);
    }
    Ok(format!("{name}({})", comma_list(&args)))
}

fn emit_call_return(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    Ok(Emission::value(call_code(generator, block)?, Order::High))
}

fn emit_call_no_return(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    Ok(Emission::statement(format!("{};\n", call_code(generator, block)?)))
}

/// Whether a conditional return carries a value. Set by the enclosing
/// definition's kind; defaults to true.
fn has_return_value(block: &dyn Block) -> bool {
    let no_value = block.mutation("value").is_some_and(|v| v == "0")
        || block.mutation("hasReturnValue").is_some_and(|v| v == "false");
    !no_value
}

fn emit_if_return(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let condition = generator.value_to_code_or(block, "CONDITION", Order::None, "false")?;
    let indent = generator.indent().to_string();
    let mut code = format!("if {condition} then begin\n");
    // The regular suffix is skipped when the return is taken.
    code.push_str(&generator.indented_suffix(block));
    if has_return_value(block) {
        let value = generator.value_to_code_or(block, "VALUE", Order::None, "nil")?;
        code.push_str(&format!("{indent}exit({value});\n"));
    } else {
        code.push_str(&format!("{indent}exit;\n"));
    }
    code.push_str("end;\n");
    Ok(Emission::statement(code))
}
