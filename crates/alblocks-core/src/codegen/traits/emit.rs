use crate::block::Block;
use crate::codegen::precedence::{Fragment, Order};
use crate::codegen::CodeGenerator;
use crate::errors::Result;

/// What a rule produced for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// An expression and its precedence.
    Value(Fragment),
    /// Statement text, newline terminated.
    Statement(String),
    /// The block contributes nothing in place, e.g. a hoisted definition.
    Nothing,
}

impl Emission {
    pub fn value(code: impl Into<String>, order: Order) -> Self {
        Emission::Value(Fragment::new(code, order))
    }

    pub fn statement(code: impl Into<String>) -> Self {
        Emission::Statement(code.into())
    }
}

/// Translates one block type into AL text.
///
/// Rules read the block, ask the generator for their children's code and
/// return their own emission. They are looked up by block type tag.
pub trait EmissionRule: Send + Sync {
    fn emit(&self, generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission>;
}

impl<F> EmissionRule for F
where
    F: Fn(&mut CodeGenerator, &dyn Block) -> Result<Emission> + Send + Sync,
{
    fn emit(&self, generator: &mut CodeGenerator, block: &dyn Block) -> Result<Emission> {
        self(generator, block)
    }
}

/// Joins already generated arguments into a call argument list.
pub fn comma_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(item.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_list() {
        assert_eq!(comma_list(["a", "b", "c"]), "a, b, c");
        assert_eq!(comma_list(Vec::<String>::new()), "");
    }

    #[test]
    fn test_emission_constructors() {
        assert_eq!(
            Emission::value("x", Order::Atomic),
            Emission::Value(Fragment::atomic("x"))
        );
        assert_eq!(Emission::statement("x;\n"), Emission::Statement("x;\n".to_string()));
    }
}
