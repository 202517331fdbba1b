//! Human-readable renderings of expression trees. The output is not meant to be parsed back.

use parser::Expr;

mod prefix;
mod rpn;

use prefix::AstPrinter;
use rpn::RpnPrinter;

/// Parenthesized prefix form, e.g. `(* (- 123) (group 45.67))`.
pub fn print(expr: &Expr) -> String {
    AstPrinter::default().print(expr)
}

/// Reverse polish notation, e.g. `123 - 45.67 *`.
pub fn print_rpn(expr: &Expr) -> String {
    RpnPrinter::default().print(expr)
}
