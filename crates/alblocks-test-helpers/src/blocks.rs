//! Constructors for the blocks tests use most.
//!
//! Every constructor returns a plain [`BlockNode`], so fixtures can keep
//! chaining the builder methods (`with_id`, `with_comment`, `with_next`).

use alblocks_core::BlockNode;

pub fn number(value: impl Into<String>) -> BlockNode {
    BlockNode::new("math_number").with_field("NUM", value)
}

pub fn text(value: impl Into<String>) -> BlockNode {
    BlockNode::new("text").with_field("TEXT", value)
}

pub fn boolean(value: bool) -> BlockNode {
    BlockNode::new("logic_boolean").with_field("BOOL", if value { "TRUE" } else { "FALSE" })
}

pub fn var(name: impl Into<String>) -> BlockNode {
    BlockNode::new("variables_get").with_field("VAR", name)
}

pub fn set(name: impl Into<String>, value: BlockNode) -> BlockNode {
    BlockNode::new("variables_set")
        .with_field("VAR", name)
        .with_value("VALUE", value)
}

/// `math_arithmetic` with operator `op` (`ADD`, `MINUS`, `MULTIPLY`,
/// `DIVIDE`, `POWER`).
pub fn arithmetic(op: &str, a: BlockNode, b: BlockNode) -> BlockNode {
    BlockNode::new("math_arithmetic")
        .with_field("OP", op)
        .with_value("A", a)
        .with_value("B", b)
}

pub fn add(a: BlockNode, b: BlockNode) -> BlockNode {
    arithmetic("ADD", a, b)
}

pub fn minus(a: BlockNode, b: BlockNode) -> BlockNode {
    arithmetic("MINUS", a, b)
}

pub fn multiply(a: BlockNode, b: BlockNode) -> BlockNode {
    arithmetic("MULTIPLY", a, b)
}

/// `logic_compare` with operator `op` (`EQ`, `NEQ`, `LT`, `LTE`, `GT`, `GTE`).
pub fn compare(op: &str, a: BlockNode, b: BlockNode) -> BlockNode {
    BlockNode::new("logic_compare")
        .with_field("OP", op)
        .with_value("A", a)
        .with_value("B", b)
}

pub fn print(value: BlockNode) -> BlockNode {
    BlockNode::new("text_print").with_value("TEXT", value)
}

pub fn if_then(condition: BlockNode, body: BlockNode) -> BlockNode {
    BlockNode::new("controls_if")
        .with_value("IF0", condition)
        .with_statement("DO0", body)
}

pub fn if_else(condition: BlockNode, then: BlockNode, otherwise: BlockNode) -> BlockNode {
    if_then(condition, then).with_statement("ELSE", otherwise)
}

pub fn while_loop(condition: BlockNode, body: BlockNode) -> BlockNode {
    BlockNode::new("controls_whileUntil")
        .with_field("MODE", "WHILE")
        .with_value("BOOL", condition)
        .with_statement("DO", body)
}

pub fn repeat(times: BlockNode, body: BlockNode) -> BlockNode {
    BlockNode::new("controls_repeat_ext")
        .with_value("TIMES", times)
        .with_statement("DO", body)
}

pub fn for_range(
    variable: impl Into<String>,
    from: BlockNode,
    to: BlockNode,
    by: BlockNode,
    body: BlockNode,
) -> BlockNode {
    BlockNode::new("controls_for")
        .with_field("VAR", variable)
        .with_value("FROM", from)
        .with_value("TO", to)
        .with_value("BY", by)
        .with_statement("DO", body)
}

pub fn continue_loop() -> BlockNode {
    BlockNode::new("controls_flow_statements").with_field("FLOW", "CONTINUE")
}

pub fn break_loop() -> BlockNode {
    BlockNode::new("controls_flow_statements").with_field("FLOW", "BREAK")
}

/// `math_on_list` with operation `op` (`SUM`, `AVERAGE`, `STD_DEV`, ...).
pub fn on_list(op: &str, list: BlockNode) -> BlockNode {
    BlockNode::new("math_on_list")
        .with_field("OP", op)
        .with_value("LIST", list)
}

pub fn is_prime(value: BlockNode) -> BlockNode {
    BlockNode::new("math_number_property")
        .with_field("PROPERTY", "PRIME")
        .with_value("NUMBER_TO_CHECK", value)
}

/// A procedure definition; `returns` selects `procedures_defreturn`.
pub fn procedure<I, S>(name: impl Into<String>, params: I, returns: Option<BlockNode>) -> BlockNode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let block_type = if returns.is_some() {
        "procedures_defreturn"
    } else {
        "procedures_defnoreturn"
    };
    let block = BlockNode::new(block_type)
        .with_field("NAME", name)
        .with_vars(params);
    match returns {
        Some(value) => block.with_value("RETURN", value),
        None => block,
    }
}

/// A call statement passing `args` positionally.
pub fn call(name: impl Into<String>, args: Vec<BlockNode>) -> BlockNode {
    let params = (0..args.len()).map(|i| format!("arg{i}")).collect::<Vec<_>>();
    args.into_iter().enumerate().fold(
        BlockNode::new("procedures_callnoreturn")
            .with_field("NAME", name)
            .with_vars(params),
        |block, (i, arg)| block.with_value(format!("ARG{i}"), arg),
    )
}
