//! Whole-workspace generation: hoisted procedures and helpers, comments,
//! statement hooks and the per-pass name state.

use alblocks_core::codegen::names::{NameKind, NamespacePolicy};
use alblocks_core::{
    Block, BlockNode, CodeGenerator, Emission, GenerationError, GeneratorConfig, Order, Result,
    Workspace,
};
use alblocks_test_helpers::blocks::{
    call, if_then, is_prime, number, on_list, print, procedure, repeat, set, text, var,
    while_loop, boolean,
};
use alblocks_test_helpers::{generate, generate_with_config};
use indoc::indoc;

// ============================================================================
// Procedures
// ============================================================================

#[test]
fn test_procedure_is_hoisted_above_body() {
    let definition =
        procedure("greet", ["who"], None).with_statement("STACK", print(var("who")));
    let program = vec![call("greet", vec![text("Bob")]), definition];
    assert_eq!(
        generate(program).unwrap(),
        indoc! {"
            procedure greet(who)
            begin
              message(who);
            end;



            greet('Bob');
        "}
    );
}

#[test]
fn test_procedure_return_type_follows_returned_block() {
    let definition = procedure("answer", Vec::<String>::new(), Some(number("42")));
    let code = generate(vec![definition]).unwrap();
    assert!(code.starts_with("procedure answer() : Decimal\nbegin\n  exit(42);\nend;"));
}

#[test]
fn test_procedure_and_variable_share_namespace() {
    let program = vec![
        procedure("total", Vec::<String>::new(), None),
        set("total", number("1")),
    ];
    assert_eq!(
        generate(program).unwrap(),
        "procedure total()\nbegin\nend;\n\n\n\ntotal2 := 1;\n"
    );
}

#[test]
fn test_separate_namespaces_allow_same_name() {
    let config = GeneratorConfig::default()
        .with_namespace(NameKind::Variable, NamespacePolicy::Separate)
        .with_namespace(NameKind::Procedure, NamespacePolicy::Separate);
    let program = vec![
        procedure("total", Vec::<String>::new(), None),
        set("total", number("1")),
    ];
    assert_eq!(
        generate_with_config(program, config).unwrap(),
        "procedure total()\nbegin\nend;\n\n\n\ntotal := 1;\n"
    );
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_helper_is_emitted_once() {
    let program = set("a", on_list("SUM", var("xs")))
        .with_next(set("b", on_list("SUM", var("ys"))))
        .with_next(set("c", on_list("AVERAGE", var("xs"))));
    let code = generate(vec![program]).unwrap();

    assert_eq!(code.matches("procedure math_sum(").count(), 1);
    assert_eq!(code.matches("procedure math_average(").count(), 1);
    assert!(code.contains("exit(math_sum(t) / t.Count());"));
    assert!(code.ends_with("a := math_sum(xs);\nb := math_sum(ys);\nc := math_average(xs);\n"));
}

#[test]
fn test_helpers_precede_body() {
    let code = generate(vec![set("p", is_prime(number("7")))]).unwrap();
    assert!(code.starts_with("procedure math_isPrime(n : Decimal) : Boolean\n"));
    assert!(code.ends_with("end;\n\n\np := math_isPrime(7);\n"));
}

#[test]
fn test_helper_name_avoids_user_procedure() {
    let program = vec![
        procedure("math_sum", Vec::<String>::new(), None),
        set("a", on_list("SUM", var("xs"))),
    ];
    let code = generate(program).unwrap();
    assert!(code.contains("procedure math_sum()"));
    assert!(code.contains("procedure math_sum2(t : List of [Decimal]) : Decimal"));
    assert!(code.ends_with("a := math_sum2(xs);\n"));
}

#[test]
fn test_unknown_list_operation_registers_nothing() {
    let mut generator = CodeGenerator::new();
    let workspace = Workspace::new().with_block(set("a", on_list("PRODUCT", var("xs"))));
    assert_eq!(
        generator.workspace_to_code(&workspace).unwrap_err(),
        GenerationError::unknown_field("math_on_list", "OP", Some("PRODUCT"))
    );
    assert!(generator.helpers().is_empty());
}

#[test]
fn test_helper_reindented_to_configured_unit() {
    let config = GeneratorConfig::default().with_indent("\t");
    let code = generate_with_config(vec![set("a", on_list("SUM", var("xs")))], config).unwrap();
    assert!(code.contains("\ttotal := 0;\n"));
    assert!(!code.contains("  total := 0;"));
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_statement_and_nested_value_comments() {
    let program = set("x", number("1").with_comment("one")).with_comment("assign");
    assert_eq!(generate(vec![program]).unwrap(), "// assign\n// one\nx := 1;\n");
}

#[test]
fn test_long_comment_is_wrapped() {
    let comment = "word ".repeat(20);
    let program = print(text("a")).with_comment(comment.trim());
    let code = generate(vec![program]).unwrap();
    for line in code.lines().filter(|l| l.starts_with("//")) {
        assert!(line.len() <= 60, "line too long: {line}");
    }
    assert!(code.ends_with("message('a');\n"));
}

// ============================================================================
// Statement hooks
// ============================================================================

#[test]
fn test_prefix_and_suffix_wrap_statements() {
    let config = GeneratorConfig::default()
        .with_statement_prefix("Trace(%1);\n")
        .with_statement_suffix("Done(%1);\n");
    let program = print(text("a")).with_id("p");
    assert_eq!(
        generate_with_config(vec![program], config).unwrap(),
        "Trace('p');\nmessage('a');\nDone('p');\n"
    );
}

#[test]
fn test_if_places_hooks_inside_branches() {
    let config = GeneratorConfig::default()
        .with_statement_prefix("Trace(%1);\n")
        .with_statement_suffix("Done(%1);\n");
    let program = if_then(var("c"), print(text("a")).with_id("p")).with_id("i");
    assert_eq!(
        generate_with_config(vec![program], config).unwrap(),
        indoc! {"
            Trace('i');
            if c then begin
              Done('i');
              Trace('p');
              message('a');
              Done('p');
            end else begin
              Done('i');
            end;
        "}
    );
}

#[test]
fn test_loop_trap_heads_loop_bodies() {
    let config = GeneratorConfig::default().with_infinite_loop_trap("CheckLoop(%1);\n");
    let program = while_loop(boolean(true), print(text("a"))).with_id("w");
    assert_eq!(
        generate_with_config(vec![program], config).unwrap(),
        "while true do begin\n  CheckLoop('w');\n  message('a');\nend;\n"
    );
}

#[test]
fn test_loop_suffix_closes_previous_iteration_before_trap() {
    let config = GeneratorConfig::default()
        .with_statement_suffix("Done(%1);\n")
        .with_infinite_loop_trap("CheckLoop(%1);\n");
    let program = while_loop(boolean(true), print(text("a")).with_id("p")).with_id("w");
    assert_eq!(
        generate_with_config(vec![program], config).unwrap(),
        indoc! {"
            while true do begin
              Done('w');
              CheckLoop('w');
              message('a');
              Done('p');
            end;
            Done('w');
        "}
    );
}

// ============================================================================
// Pass state
// ============================================================================

#[test]
fn test_generator_is_reusable_across_passes() {
    let workspace = Workspace::new()
        .with_block(repeat(number("2"), repeat(number("3"), print(var("count")))))
        .with_block(set("p", is_prime(var("n"))));
    let mut generator = CodeGenerator::new();
    let first = generator.workspace_to_code(&workspace).unwrap();
    let second = generator.workspace_to_code(&workspace).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.matches("procedure math_isPrime(").count(), 1);
}

#[test]
fn test_custom_rule_extends_catalog() {
    let mut generator = CodeGenerator::new();
    generator.register_rule(
        "lists_create_empty",
        |_generator: &mut CodeGenerator, _block: &dyn Block| -> Result<Emission> {
            Ok(Emission::value("[]", Order::Atomic))
        },
    );
    let workspace =
        Workspace::new().with_block(set("items", BlockNode::new("lists_create_empty")));
    assert_eq!(generator.workspace_to_code(&workspace).unwrap(), "items := [];\n");
}
