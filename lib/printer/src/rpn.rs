use parser::{Expr, LiteralValue, Visitor};
use scanner::Token;

/// Renders operands first and their operator last, without any parentheses.
#[derive(Default)]
pub(crate) struct RpnPrinter {
    buf: String,
}

impl RpnPrinter {
    pub(crate) fn print(mut self, expr: &Expr) -> String {
        expr.accept(&mut self);
        self.buf
    }

    fn notate(&mut self, name: &str, exprs: &[&Expr]) {
        for expr in exprs {
            expr.accept(self);
            self.buf.push(' ');
        }
        self.buf.push_str(name);
    }
}

impl Visitor for RpnPrinter {
    type Output = ();

    fn visit_literal(&mut self, value: &LiteralValue) {
        self.buf.push_str(&value.to_string());
    }

    fn visit_grouping(&mut self, expression: &Expr) {
        expression.accept(self);
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) {
        self.notate(operator.lexeme(), &[right]);
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) {
        self.notate(operator.lexeme(), &[left, right]);
    }

    // `?`, `:` and `;` close the condition and the two branches.
    fn visit_ternary(&mut self, condition: &Expr, positive: &Expr, negative: &Expr) {
        self.notate("?", &[condition]);
        self.buf.push(' ');
        self.notate(":", &[positive]);
        self.buf.push(' ');
        self.notate(";", &[negative]);
    }

    fn visit_sequenced(&mut self, left: &Expr, right: &Expr) {
        left.accept(self);
        self.buf.push_str(" -> ");
        right.accept(self);
    }
}
