use parser::{Expr, LiteralValue, Visitor};
use scanner::Token;

/// Renders `(<operator> <operand>...)` forms.
#[derive(Default)]
pub(crate) struct AstPrinter {
    buf: String,
}

impl AstPrinter {
    pub(crate) fn print(mut self, expr: &Expr) -> String {
        expr.accept(&mut self);
        self.buf
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) {
        self.buf.push('(');
        self.buf.push_str(name);
        for expr in exprs {
            self.buf.push(' ');
            expr.accept(self);
        }
        self.buf.push(')');
    }
}

impl Visitor for AstPrinter {
    type Output = ();

    fn visit_literal(&mut self, value: &LiteralValue) {
        self.buf.push_str(&value.to_string());
    }

    fn visit_grouping(&mut self, expression: &Expr) {
        self.parenthesize("group", &[expression]);
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) {
        self.parenthesize(operator.lexeme(), &[right]);
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) {
        self.parenthesize(operator.lexeme(), &[left, right]);
    }

    fn visit_ternary(&mut self, condition: &Expr, positive: &Expr, negative: &Expr) {
        self.parenthesize("if", &[condition, positive, negative]);
    }

    fn visit_sequenced(&mut self, left: &Expr, right: &Expr) {
        left.accept(self);
        self.buf.push_str(" -> ");
        right.accept(self);
    }
}
