//! Operator precedence classes and parenthesization.

/// Precedence of an emitted expression. Lower values bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    /// Literals and identifiers.
    Atomic = 0,
    /// Procedure calls and indexing.
    High = 1,
    /// `^`
    Exponentiation = 2,
    /// `not`, unary `-`
    Unary = 3,
    /// `*` `/` `%`
    Multiplicative = 4,
    /// `+` `-`
    Additive = 5,
    Concatenation = 6,
    /// `=` `<>` `<` `<=` `>` `>=`
    Relational = 7,
    And = 8,
    Or = 9,
    /// Whole expressions in slots that need no grouping at all.
    None = 99,
}

impl Order {
    /// The next tighter class. Used for operand slots of non-associative
    /// operators so an operand of equal precedence gets grouped.
    pub fn tighter(self) -> Order {
        match self {
            Order::Atomic | Order::High => Order::Atomic,
            Order::Exponentiation => Order::High,
            Order::Unary => Order::Exponentiation,
            Order::Multiplicative => Order::Unary,
            Order::Additive => Order::Multiplicative,
            Order::Concatenation => Order::Additive,
            Order::Relational => Order::Concatenation,
            Order::And => Order::Relational,
            Order::Or => Order::And,
            Order::None => Order::Or,
        }
    }

    /// Whether an expression of this order can sit unparenthesized in a slot
    /// that accepts `required`.
    pub fn fits(self, required: Order) -> bool {
        self <= required
    }
}

/// Generated expression text together with its precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub code: String,
    pub order: Order,
}

impl Fragment {
    pub fn new(code: impl Into<String>, order: Order) -> Self {
        Self {
            code: code.into(),
            order,
        }
    }

    pub fn atomic(code: impl Into<String>) -> Self {
        Self::new(code, Order::Atomic)
    }

    /// The fragment's text, parenthesized when it does not fit `required`.
    pub fn into_code_for(self, required: Order) -> String {
        if self.order.fits(required) {
            self.code
        } else {
            format!("({})", self.code)
        }
    }
}
