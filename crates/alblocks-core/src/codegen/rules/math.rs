//! Numbers, arithmetic and the list statistics helpers.

use super::{field, unknown_field};
use crate::block::Block;
use crate::codegen::format::{format_number, parse_number};
use crate::codegen::names::NameKind;
use crate::codegen::{CodeGenerator, Emission, Order};
use crate::errors::Result;

/// Stands for the name of the sum helper in templates that call it.
const SUM_PLACEHOLDER: &str = "{%SUM%}";

const IS_PRIME: &str = "
procedure {%FUNCTION_NAME%}(n : Decimal) : Boolean
var
  x : Integer;
begin
  // https://en.wikipedia.org/wiki/Primality_test#Naive_methods
  if (n = 2) or (n = 3) then
    exit(true);
  // Not prime if n is at most 1, not whole, or divisible by 2 or 3.
  if (n <= 1) or (n <> Round(n, 1)) or (n mod 2 = 0) or (n mod 3 = 0) then
    exit(false);
  // Check all numbers of the form 6k +/- 1 up to sqrt(n).
  x := 6;
  while x <= Power(n, 0.5) + 1.5 do begin
    if (n mod (x - 1) = 0) or (n mod (x + 1) = 0) then
      exit(false);
    x := x + 6;
  end;
  exit(true);
end;
";

const SUM: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
var
  v : Decimal;
  total : Decimal;
begin
  total := 0;
  foreach v in t do
    total := total + v;
  exit(total);
end;
";

const MIN: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
var
  v : Decimal;
  smallest : Decimal;
begin
  if t.Count() = 0 then
    exit(0);
  smallest := t.Get(1);
  foreach v in t do
    if v < smallest then
      smallest := v;
  exit(smallest);
end;
";

const MAX: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
var
  v : Decimal;
  largest : Decimal;
begin
  if t.Count() = 0 then
    exit(0);
  largest := t.Get(1);
  foreach v in t do
    if v > largest then
      largest := v;
  exit(largest);
end;
";

const AVERAGE: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
begin
  if t.Count() = 0 then
    exit(0);
  exit({%SUM%}(t) / t.Count());
end;
";

const MEDIAN: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
var
  sorted : List of [Decimal];
  i : Integer;
  j : Integer;
  swap : Decimal;
  middle : Integer;
begin
  if t.Count() = 0 then
    exit(0);
  sorted.AddRange(t);
  for i := 1 to sorted.Count() - 1 do
    for j := i + 1 to sorted.Count() do
      if sorted.Get(j) < sorted.Get(i) then begin
        swap := sorted.Get(i);
        sorted.Set(i, sorted.Get(j));
        sorted.Set(j, swap);
      end;
  middle := sorted.Count() div 2;
  if sorted.Count() mod 2 = 0 then
    exit((sorted.Get(middle) + sorted.Get(middle + 1)) / 2);
  exit(sorted.Get(middle + 1));
end;
";

const MODES: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : List of [Decimal]
var
  counts : Dictionary of [Decimal, Integer];
  modes : List of [Decimal];
  v : Decimal;
  seen : Integer;
  biggestCount : Integer;
begin
  foreach v in t do
    if counts.Get(v, seen) then
      counts.Set(v, seen + 1)
    else
      counts.Add(v, 1);
  foreach v in counts.Keys() do
    if counts.Get(v) > biggestCount then
      biggestCount := counts.Get(v);
  foreach v in counts.Keys() do
    if counts.Get(v) = biggestCount then
      modes.Add(v);
  exit(modes);
end;
";

const STANDARD_DEVIATION: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
var
  mean : Decimal;
  v : Decimal;
  total : Decimal;
begin
  if t.Count() < 2 then
    exit(0);
  mean := {%SUM%}(t) / t.Count();
  foreach v in t do
    total := total + (v - mean) * (v - mean);
  exit(Power(total / (t.Count() - 1), 0.5));
end;
";

const RANDOM_ITEM: &str = "
procedure {%FUNCTION_NAME%}(t : List of [Decimal]) : Decimal
begin
  if t.Count() = 0 then
    exit(0);
  exit(t.Get(Random(t.Count())));
end;
";

pub fn register(generator: &mut CodeGenerator) {
    generator.register_rule("math_number", emit_number);
    generator.register_rule("math_arithmetic", emit_arithmetic);
    generator.register_rule("math_single", emit_single);
    generator.register_rule("math_round", emit_single);
    generator.register_rule("math_trig", emit_single);
    generator.register_rule("math_constant", emit_constant);
    generator.register_rule("math_number_property", emit_number_property);
    generator.register_rule("math_change", emit_change);
    generator.register_rule("math_on_list", emit_on_list);
    generator.register_rule("math_modulo", emit_modulo);
    generator.register_rule("math_constrain", emit_constrain);
    generator.register_rule("math_random_int", emit_random_int);
    generator.register_rule("math_random_float", emit_random_float);
    generator.register_rule("math_atan2", emit_atan2);
}

/// Unary minus applied to `operand`, which must already be grouped for a
/// unary slot.
pub(crate) fn negate(operand: &str) -> String {
    // Keep two minus signs apart.
    if operand.starts_with('-') {
        format!("- {operand}")
    } else {
        format!("-{operand}")
    }
}

fn emit_number(_generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let value = parse_number(field(block, "NUM"));
    // Negative literals bind like a unary minus.
    let order = if value < 0.0 { Order::Unary } else { Order::Atomic };
    Ok(Emission::value(format_number(value), order))
}

fn emit_arithmetic(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    // (operator, result order, left operand order, right operand order)
    let (operator, order, left, right) = match field(block, "OP") {
        "ADD" => ("+", Order::Additive, Order::Additive, Order::Additive),
        "MINUS" => ("-", Order::Additive, Order::Additive, Order::Additive.tighter()),
        // `%` shares this class, so a right-nested product or modulo keeps its parentheses.
        "MULTIPLY" => (
            "*",
            Order::Multiplicative,
            Order::Multiplicative,
            Order::Multiplicative.tighter(),
        ),
        "DIVIDE" => (
            "/",
            Order::Multiplicative,
            Order::Multiplicative,
            Order::Multiplicative.tighter(),
        ),
        // Right associative.
        "POWER" => (
            "^",
            Order::Exponentiation,
            Order::Exponentiation.tighter(),
            Order::Exponentiation,
        ),
        _ => return Err(unknown_field(block, "OP")),
    };
    let a = generator.value_to_code_or(block, "A", left, "0")?;
    let b = generator.value_to_code_or(block, "B", right, "0")?;
    Ok(Emission::value(format!("{a} {operator} {b}"), order))
}

fn emit_single(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let operator = field(block, "OP");
    match operator {
        "NEG" => {
            let arg = generator.value_to_code_or(block, "NUM", Order::Unary, "0")?;
            return Ok(Emission::value(negate(&arg), Order::Unary));
        }
        "POW10" => {
            let arg = generator.value_to_code_or(block, "NUM", Order::Exponentiation, "0")?;
            return Ok(Emission::value(format!("10 ^ {arg}"), Order::Exponentiation));
        }
        _ => {}
    }

    let template: fn(&str) -> String = match operator {
        "ABS" => |arg| format!("abs({arg})"),
        "ROOT" => |arg| format!("math.sqrt({arg})"),
        "LN" => |arg| format!("math.log({arg})"),
        "LOG10" => |arg| format!("math.log({arg}, 10)"),
        "EXP" => |arg| format!("math.exp({arg})"),
        "ROUND" => |arg| format!("math.floor({arg} + .5)"),
        "ROUNDUP" => |arg| format!("math.ceil({arg})"),
        "ROUNDDOWN" => |arg| format!("math.floor({arg})"),
        "SIN" => |arg| format!("math.sin(math.rad({arg}))"),
        "COS" => |arg| format!("math.cos(math.rad({arg}))"),
        "TAN" => |arg| format!("math.tan(math.rad({arg}))"),
        "ASIN" => |arg| format!("math.deg(math.asin({arg}))"),
        "ACOS" => |arg| format!("math.deg(math.acos({arg}))"),
        "ATAN" => |arg| format!("math.deg(math.atan({arg}))"),
        _ => return Err(unknown_field(block, "OP")),
    };
    let order = if operator == "ROUND" {
        Order::Additive
    } else {
        Order::None
    };
    let arg = generator.value_to_code_or(block, "NUM", order, "0")?;
    Ok(Emission::value(template(&arg), Order::High))
}

fn emit_constant(_generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let (code, order) = match field(block, "CONSTANT") {
        "PI" => ("math.pi", Order::High),
        "E" => ("math.exp(1)", Order::High),
        "GOLDEN_RATIO" => ("(1 + math.sqrt(5)) / 2", Order::Multiplicative),
        "SQRT2" => ("math.sqrt(2)", Order::High),
        "SQRT1_2" => ("math.sqrt(1 / 2)", Order::High),
        "INFINITY" => ("math.huge", Order::High),
        _ => return Err(unknown_field(block, "CONSTANT")),
    };
    Ok(Emission::value(code, order))
}

fn emit_number_property(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let property = field(block, "PROPERTY");
    let (suffix, input_order, output_order) = match property {
        "EVEN" => (" % 2 = 0", Order::Multiplicative, Order::Relational),
        "ODD" => (" % 2 = 1", Order::Multiplicative, Order::Relational),
        "WHOLE" => (" % 1 = 0", Order::Multiplicative, Order::Relational),
        "POSITIVE" => (" > 0", Order::Relational.tighter(), Order::Relational),
        "NEGATIVE" => (" < 0", Order::Relational.tighter(), Order::Relational),
        "DIVISIBLE_BY" => ("", Order::Multiplicative, Order::Relational),
        "PRIME" => ("", Order::None, Order::High),
        _ => return Err(unknown_field(block, "PROPERTY")),
    };
    let number = generator.value_to_code_or(block, "NUMBER_TO_CHECK", input_order, "0")?;

    let code = match property {
        "PRIME" => {
            let is_prime = generator.provide_function("math_isPrime", IS_PRIME);
            format!("{is_prime}({number})")
        }
        "DIVISIBLE_BY" => {
            let divisor = generator.value_to_code_or(
                block,
                "DIVISOR",
                Order::Multiplicative.tighter(),
                "0",
            )?;
            // Known at generation time to divide by zero.
            if divisor == "0" {
                return Ok(Emission::value("nil", Order::Atomic));
            }
            format!("{number} % {divisor} = 0")
        }
        _ => format!("{number}{suffix}"),
    };
    Ok(Emission::value(code, output_order))
}

fn emit_change(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let delta = generator.value_to_code_or(block, "DELTA", Order::Additive, "0")?;
    let variable = generator.names().get_name(field(block, "VAR"), NameKind::Variable);
    Ok(Emission::statement(format!(
        "{variable} := {variable} + {delta};\n"
    )))
}

fn provide_sum(generator: &mut CodeGenerator) -> String {
    generator.provide_function("math_sum", SUM)
}

fn emit_on_list(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let operation = field(block, "OP");
    if !matches!(
        operation,
        "SUM" | "MIN" | "MAX" | "AVERAGE" | "MEDIAN" | "MODE" | "STD_DEV" | "RANDOM"
    ) {
        return Err(unknown_field(block, "OP"));
    }
    let list = generator.value_to_code_or(block, "LIST", Order::None, "{}")?;

    let helper = match operation {
        "SUM" => provide_sum(generator),
        "MIN" => generator.provide_function("math_min", MIN),
        "MAX" => generator.provide_function("math_max", MAX),
        "AVERAGE" => {
            let sum = provide_sum(generator);
            generator.provide_function("math_average", &AVERAGE.replace(SUM_PLACEHOLDER, &sum))
        }
        "MEDIAN" => generator.provide_function("math_median", MEDIAN),
        "MODE" => generator.provide_function("math_modes", MODES),
        "STD_DEV" => {
            let sum = provide_sum(generator);
            generator.provide_function(
                "math_standard_deviation",
                &STANDARD_DEVIATION.replace(SUM_PLACEHOLDER, &sum),
            )
        }
        _ => generator.provide_function("math_random_list", RANDOM_ITEM),
    };
    Ok(Emission::value(format!("{helper}({list})"), Order::High))
}

fn emit_modulo(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let dividend = generator.value_to_code_or(block, "DIVIDEND", Order::Multiplicative, "0")?;
    let divisor =
        generator.value_to_code_or(block, "DIVISOR", Order::Multiplicative.tighter(), "0")?;
    Ok(Emission::value(
        format!("{dividend} % {divisor}"),
        Order::Multiplicative,
    ))
}

fn emit_constrain(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let value = generator.value_to_code_or(block, "VALUE", Order::None, "0")?;
    let low = generator.value_to_code_or(block, "LOW", Order::None, "-math.huge")?;
    let high = generator.value_to_code_or(block, "HIGH", Order::None, "math.huge")?;
    Ok(Emission::value(
        format!("math.min(math.max({value}, {low}), {high})"),
        Order::High,
    ))
}

fn emit_random_int(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let from = generator.value_to_code_or(block, "FROM", Order::None, "0")?;
    let to = generator.value_to_code_or(block, "TO", Order::None, "0")?;
    Ok(Emission::value(format!("math.random({from}, {to})"), Order::High))
}

fn emit_random_float(_generator: &mut CodeGenerator, _block: &dyn Block) -> Result<Emission> {
    Ok(Emission::value("math.random()", Order::High))
}

fn emit_atan2(generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
    let x = generator.value_to_code_or(block, "X", Order::None, "0")?;
    let y = generator.value_to_code_or(block, "Y", Order::None, "0")?;
    Ok(Emission::value(
        format!("math.deg(math.atan2({y}, {x}))"),
        Order::High,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockNode;
    use crate::codegen::Fragment;
    use crate::errors::GenerationError;

    fn number(n: &str) -> BlockNode {
        BlockNode::new("math_number").with_field("NUM", n)
    }

    fn var(name: &str) -> BlockNode {
        BlockNode::new("variables_get").with_field("VAR", name)
    }

    fn arithmetic(op: &str, a: BlockNode, b: BlockNode) -> BlockNode {
        BlockNode::new("math_arithmetic")
            .with_field("OP", op)
            .with_value("A", a)
            .with_value("B", b)
    }

    fn fragment_with(generator: &mut CodeGenerator, block: &BlockNode) -> Fragment {
        match generator.block_to_code(Some(block), true).unwrap() {
            Emission::Value(fragment) => fragment,
            other => panic!("expected a value, got {other:?}"),
        }
    }

    fn value_of(block: &BlockNode) -> String {
        fragment_with(&mut CodeGenerator::new(), block).code
    }

    #[test]
    fn test_number_formatting_and_order() {
        let positive = fragment_with(&mut CodeGenerator::new(), &number("3.50"));
        assert_eq!(positive, Fragment::atomic("3.5"));
        let negative = fragment_with(&mut CodeGenerator::new(), &number("-5"));
        assert_eq!(negative, Fragment::new("-5", Order::Unary));
    }

    #[test]
    fn test_negative_literal_is_grouped_under_power() {
        let block = arithmetic("POWER", number("-5"), number("2"));
        assert_eq!(value_of(&block), "(-5) ^ 2");
    }

    #[test]
    fn test_subtraction_associativity() {
        let left = arithmetic("MINUS", arithmetic("MINUS", var("a"), var("b")), var("c"));
        assert_eq!(value_of(&left), "a - b - c");
        let right = arithmetic("MINUS", var("a"), arithmetic("MINUS", var("b"), var("c")));
        assert_eq!(value_of(&right), "a - (b - c)");
    }

    #[test]
    fn test_division_and_power_grouping() {
        let quotient = arithmetic("DIVIDE", var("a"), arithmetic("MULTIPLY", var("b"), var("c")));
        assert_eq!(value_of(&quotient), "a / (b * c)");
        let tower = arithmetic("POWER", arithmetic("POWER", var("a"), var("b")), var("c"));
        assert_eq!(value_of(&tower), "(a ^ b) ^ c");
        let right = arithmetic("POWER", var("a"), arithmetic("POWER", var("b"), var("c")));
        assert_eq!(value_of(&right), "a ^ b ^ c");
    }

    #[test]
    fn test_product_keeps_right_nested_modulo_grouped() {
        let modulo = BlockNode::new("math_modulo")
            .with_value("DIVIDEND", var("b"))
            .with_value("DIVISOR", var("c"));
        let product = arithmetic("MULTIPLY", var("a"), modulo.clone());
        assert_eq!(value_of(&product), "a * (b % c)");
        let left = arithmetic("MULTIPLY", modulo, var("a"));
        assert_eq!(value_of(&left), "b % c * a");
        let nested = arithmetic("MULTIPLY", var("a"), arithmetic("MULTIPLY", var("b"), var("c")));
        assert_eq!(value_of(&nested), "a * (b * c)");
    }

    #[test]
    fn test_arithmetic_defaults() {
        let block = BlockNode::new("math_arithmetic").with_field("OP", "MULTIPLY");
        assert_eq!(value_of(&block), "0 * 0");
    }

    #[test]
    fn test_single_operators() {
        let root = BlockNode::new("math_single")
            .with_field("OP", "ROOT")
            .with_value("NUM", var("x"));
        assert_eq!(value_of(&root), "math.sqrt(x)");
        let round = BlockNode::new("math_round")
            .with_field("OP", "ROUND")
            .with_value("NUM", arithmetic("ADD", var("a"), var("b")));
        assert_eq!(value_of(&round), "math.floor(a + b + .5)");
        let sin = BlockNode::new("math_trig").with_field("OP", "SIN");
        assert_eq!(value_of(&sin), "math.sin(math.rad(0))");
        let pow = BlockNode::new("math_single")
            .with_field("OP", "POW10")
            .with_value("NUM", number("3"));
        assert_eq!(value_of(&pow), "10 ^ 3");
    }

    #[test]
    fn test_negation_of_negative_literal_keeps_a_space() {
        let block = BlockNode::new("math_single")
            .with_field("OP", "NEG")
            .with_value("NUM", number("-2"));
        assert_eq!(value_of(&block), "- -2");
        let plain = BlockNode::new("math_single")
            .with_field("OP", "NEG")
            .with_value("NUM", var("x"));
        assert_eq!(value_of(&plain), "-x");
    }

    #[test]
    fn test_unknown_single_operator() {
        let block = BlockNode::new("math_single").with_field("OP", "CBRT");
        let err = CodeGenerator::new()
            .block_to_code(Some(&block), true)
            .unwrap_err();
        assert_eq!(err, GenerationError::unknown_field("math_single", "OP", Some("CBRT")));
    }

    #[test]
    fn test_constants() {
        let golden = BlockNode::new("math_constant").with_field("CONSTANT", "GOLDEN_RATIO");
        let fragment = fragment_with(&mut CodeGenerator::new(), &golden);
        assert_eq!(fragment.order, Order::Multiplicative);
        let unknown = BlockNode::new("math_constant").with_field("CONSTANT", "TAU");
        assert!(CodeGenerator::new().block_to_code(Some(&unknown), true).is_err());
    }

    #[test]
    fn test_number_properties() {
        let even = BlockNode::new("math_number_property")
            .with_field("PROPERTY", "EVEN")
            .with_value("NUMBER_TO_CHECK", arithmetic("ADD", var("a"), number("1")));
        assert_eq!(value_of(&even), "(a + 1) % 2 = 0");

        let positive = BlockNode::new("math_number_property")
            .with_field("PROPERTY", "POSITIVE")
            .with_value("NUMBER_TO_CHECK", var("a"));
        assert_eq!(value_of(&positive), "a > 0");
    }

    #[test]
    fn test_divisible_by_literal_zero_is_nil() {
        let block = BlockNode::new("math_number_property")
            .with_field("PROPERTY", "DIVISIBLE_BY")
            .with_value("NUMBER_TO_CHECK", var("a"))
            .with_value("DIVISOR", number("0"));
        let fragment = fragment_with(&mut CodeGenerator::new(), &block);
        assert_eq!(fragment, Fragment::atomic("nil"));

        let by_three = BlockNode::new("math_number_property")
            .with_field("PROPERTY", "DIVISIBLE_BY")
            .with_value("NUMBER_TO_CHECK", var("a"))
            .with_value("DIVISOR", number("3"));
        assert_eq!(value_of(&by_three), "a % 3 = 0");
    }

    #[test]
    fn test_prime_registers_helper_once() {
        let mut generator = CodeGenerator::new();
        let prime = BlockNode::new("math_number_property")
            .with_field("PROPERTY", "PRIME")
            .with_value("NUMBER_TO_CHECK", var("n"));
        assert_eq!(fragment_with(&mut generator, &prime).code, "math_isPrime(n)");
        assert_eq!(fragment_with(&mut generator, &prime).code, "math_isPrime(n)");
        assert_eq!(generator.helpers().len(), 1);
        let text = generator.helpers().get("math_isPrime").unwrap();
        assert!(text.starts_with("procedure math_isPrime(n : Decimal) : Boolean"));
    }

    #[test]
    fn test_average_and_std_dev_share_sum() {
        let mut generator = CodeGenerator::new();
        let average = BlockNode::new("math_on_list")
            .with_field("OP", "AVERAGE")
            .with_value("LIST", var("values"));
        let deviation = BlockNode::new("math_on_list").with_field("OP", "STD_DEV");
        assert_eq!(fragment_with(&mut generator, &average).code, "math_average(values)");
        assert_eq!(
            fragment_with(&mut generator, &deviation).code,
            "math_standard_deviation({})"
        );
        let keys: Vec<_> = generator.helpers().definitions().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys[0].starts_with("procedure math_sum("));
        assert!(keys[1].contains("exit(math_sum(t) / t.Count());"));
        assert!(keys[2].contains("mean := math_sum(t) / t.Count();"));
    }

    #[test]
    fn test_on_list_unknown_operation_registers_nothing() {
        let mut generator = CodeGenerator::new();
        let block = BlockNode::new("math_on_list").with_field("OP", "PRODUCT");
        assert!(generator.block_to_code(Some(&block), true).is_err());
        assert!(generator.helpers().is_empty());
    }

    #[test]
    fn test_change_modulo_constrain_random() {
        let change = BlockNode::new("math_change")
            .with_field("VAR", "total")
            .with_value("DELTA", number("2"));
        let mut generator = CodeGenerator::new();
        assert_eq!(
            generator.block_to_code(Some(&change), true).unwrap(),
            Emission::statement("total := total + 2;\n")
        );

        let modulo = BlockNode::new("math_modulo")
            .with_value("DIVIDEND", var("a"))
            .with_value("DIVISOR", arithmetic("MULTIPLY", var("b"), var("c")));
        assert_eq!(value_of(&modulo), "a % (b * c)");

        let constrain = BlockNode::new("math_constrain").with_value("VALUE", var("x"));
        assert_eq!(value_of(&constrain), "math.min(math.max(x, -math.huge), math.huge)");

        let random = BlockNode::new("math_random_int").with_value("TO", number("6"));
        assert_eq!(value_of(&random), "math.random(0, 6)");
        assert_eq!(value_of(&BlockNode::new("math_random_float")), "math.random()");

        let atan2 = BlockNode::new("math_atan2")
            .with_value("X", number("1"))
            .with_value("Y", number("2"));
        assert_eq!(value_of(&atan2), "math.deg(math.atan2(2, 1))");
    }
}
