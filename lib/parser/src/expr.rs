use scanner::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),
    Grouping(Box<Expr>),
    Unary { operator: Token, right: Box<Expr> },
    Binary { left: Box<Expr>, operator: Token, right: Box<Expr> },
    Ternary { condition: Box<Expr>, positive: Box<Expr>, negative: Box<Expr> },
    /// The comma operator: `left` is evaluated and discarded, `right` is the result.
    Sequenced { left: Box<Expr>, right: Box<Expr> },
}

/// Displays the way a printer renders it: numbers in shortest form, strings without quotes.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum LiteralValue {
    Str(String),
    Number(f64),
    Boolean(bool),
    #[display(fmt = "nil")]
    Nil,
    /// A reserved word standing for a value, rendered as its spelling.
    Keyword(String),
}

/// A traversal over [`Expr`] trees.
///
/// There's one handler per variant, so a visitor that forgets a variant doesn't compile.
pub trait Visitor {
    type Output;

    fn visit_literal(&mut self, value: &LiteralValue) -> Self::Output;
    fn visit_grouping(&mut self, expression: &Expr) -> Self::Output;
    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Self::Output;
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Self::Output;
    fn visit_ternary(&mut self, condition: &Expr, positive: &Expr, negative: &Expr)
        -> Self::Output;
    fn visit_sequenced(&mut self, left: &Expr, right: &Expr) -> Self::Output;
}

impl Expr {
    /// Calls the handler of `visitor` matching this node's variant.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Literal(value) => visitor.visit_literal(value),
            Expr::Grouping(expression) => visitor.visit_grouping(expression),
            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),
            Expr::Binary { left, operator, right } => visitor.visit_binary(left, operator, right),
            Expr::Ternary { condition, positive, negative } => {
                visitor.visit_ternary(condition, positive, negative)
            }
            Expr::Sequenced { left, right } => visitor.visit_sequenced(left, right),
        }
    }
}

impl From<LiteralValue> for Expr {
    fn from(value: LiteralValue) -> Self {
        Expr::Literal(value)
    }
}
