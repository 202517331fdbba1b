mod expr;
use std::fmt::Display;

pub use expr::{Expr, LiteralValue, Visitor};

use errors::{Diagnostic, Located, Reporter};
use scanner::{Token, TokenData, TokenType};

use TokenType::*;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect ':' between ternary branches.")]
    ExpectedColon,
    #[error("Expect end of expression.")]
    ExpectedEnd,
    #[error("Expression nested too deeply.")]
    TooDeep,
}

/// How deep the parser nests groupings, unary operators, ternaries and operator chains
/// before it gives up with [`ParseErrorType::TooDeep`].
pub const MAX_DEPTH: usize = 255;

/// First grammar violation of a parse, bound to the token that failed to match.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub token: Token,
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        Diagnostic::new(e.token.line(), e.token.at(), &e.error)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Diagnostic::from(self))
    }
}

/// Parses a complete token sequence into one expression.
pub fn parse(tokens: &[Token], reporter: &mut dyn Reporter) -> Result<Expr> {
    Parser::new(tokens, reporter).parse()
}

/// Recursive descent over a token slice, one production per precedence level.
///
/// A slice that doesn't end in an `Eof` token behaves as if it did.
pub struct Parser<'a, 'r> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
    eof: Token,
    reporter: &'r mut dyn Reporter,
}

impl<'a, 'r> Parser<'a, 'r> {
    pub fn new(tokens: &'a [Token], reporter: &'r mut dyn Reporter) -> Self {
        let line = tokens.last().map(|t| t.line).unwrap_or_default();
        Self { tokens, current: 0, depth: 0, eof: Token::eof(line), reporter }
    }

    /// Parses one expression that has to span the rest of the tokens.
    ///
    /// Unlike a parser that stops after the first complete expression, leftover tokens
    /// such as the `2` in `1 2` are rejected with [`ParseErrorType::ExpectedEnd`].
    pub fn parse(&mut self) -> Result<Expr> {
        self.depth = 0;
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(self.error_at_peek(ParseErrorType::ExpectedEnd));
        }

        log::debug!("Parsed expression: {:?}", expr);
        Ok(expr)
    }

    /// Skips tokens until just after a `;` or until the next token starts a statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().is_some_and(|t| t.ty() == Semicolon) {
                return;
            }

            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().ty() {
                return;
            }

            log::trace!("Syncing... skipping {:?}", self.peek());
            self.advance();
        }
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.sequence()
    }

    fn sequence(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = self.ternary()?;

        while let Comma = self.peek().ty() {
            self.deepen()?;
            self.advance();
            let right = Box::new(self.ternary()?);
            expr = Expr::Sequenced { left: Box::new(expr), right };
        }
        self.depth = depth;
        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr> {
        let condition = self.equality()?;

        if let QuestionMark = self.peek().ty() {
            let depth = self.depth;
            self.deepen()?;
            self.advance();
            // Both branches recurse into the top rule, which makes `?:` right-associative.
            let positive = Box::new(self.expression()?);
            self.consume(Colon, ParseErrorType::ExpectedColon)?;
            let negative = Box::new(self.expression()?);
            self.depth = depth;
            return Ok(Expr::Ternary { condition: Box::new(condition), positive, negative });
        }

        Ok(condition)
    }

    fn equality(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek().ty() {
            self.deepen()?;
            let operator = self.advance();
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = self.addition()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek().ty() {
            self.deepen()?;
            let operator = self.advance();
            let right = Box::new(self.addition()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn addition(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = self.multiplication()?;

        while let Minus | Plus = self.peek().ty() {
            self.deepen()?;
            let operator = self.advance();
            let right = Box::new(self.multiplication()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = self.unary()?;

        while let Slash | Star = self.peek().ty() {
            self.deepen()?;
            let operator = self.advance();
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Bang | Minus = self.peek().ty() {
            let depth = self.depth;
            self.deepen()?;
            let operator = self.advance();
            let right = Box::new(self.unary()?);
            self.depth = depth;
            return Ok(Expr::Unary { operator, right });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let value = match self.peek().data.clone() {
            TokenData::False => LiteralValue::Boolean(false),
            TokenData::True => LiteralValue::Boolean(true),
            TokenData::Nil => LiteralValue::Nil,
            TokenData::Number(n) => LiteralValue::Number(n),
            TokenData::Str(s) => LiteralValue::Str(s),
            TokenData::LeftParen => {
                let depth = self.depth;
                self.deepen()?;
                self.advance();
                let expr = self.expression()?;
                self.consume(RightParen, ParseErrorType::ExpectedRightParen)?;
                self.depth = depth;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error_at_peek(ParseErrorType::ExpectedExpression)),
        };

        self.advance();
        Ok(Expr::Literal(value))
    }
}

// Helpers
impl<'a, 'r> Parser<'a, 'r> {
    fn previous(&self) -> Option<&Token> {
        self.current.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Consumes the current token and returns it. Stays put on `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Enters one more level of the tree, failing at the peeked token past [`MAX_DEPTH`].
    fn deepen(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_at_peek(ParseErrorType::TooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn consume(&mut self, ty: TokenType, error: ParseErrorType) -> Result<Token> {
        if self.peek().ty() == ty {
            Ok(self.advance())
        } else {
            Err(self.error_at_peek(error))
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn error_at_peek(&mut self, error: ParseErrorType) -> ParseError {
        let token = self.peek().clone();
        self.error(error, token)
    }

    fn error(&mut self, error: ParseErrorType, token: Token) -> ParseError {
        log::trace!("Hit error: {:?} at {:?}", error, token);
        self.reporter.report_at_token(&token, &error.to_string());
        ParseError { error, token }
    }
}

#[cfg(test)]
mod tests {
    use cursor::Line;
    use errors::Diagnostics;
    use pretty_assertions::assert_eq;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scan_ok(source: &str) -> Vec<Token> {
        let mut diagnostics = Diagnostics::default();
        let scanned = scanner::scan(source, &mut diagnostics);
        assert!(!scanned.had_error, "{diagnostics}");
        scanned.tokens
    }

    fn parse_source(source: &str) -> (Result<Expr>, Diagnostics) {
        let tokens = scan_ok(source);
        let mut diagnostics = Diagnostics::default();
        let result = parse(&tokens, &mut diagnostics);
        (result, diagnostics)
    }

    fn parse_ok(source: &str) -> Expr {
        let (result, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "{diagnostics}");
        result.unwrap()
    }

    fn parse_err(source: &str) -> (ParseError, String) {
        let (result, diagnostics) = parse_source(source);
        (result.unwrap_err(), diagnostics.to_string())
    }

    fn op(data: TokenData, lexeme: &str) -> Token {
        Token::new(data, lexeme, Line(1))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(LiteralValue::Number(n)))
    }

    fn boolean(b: bool) -> Box<Expr> {
        Box::new(Expr::Literal(LiteralValue::Boolean(b)))
    }

    fn binary(left: Box<Expr>, operator: Token, right: Box<Expr>) -> Box<Expr> {
        Box::new(Expr::Binary { left, operator, right })
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            parse_ok("1+2*3"),
            *binary(num(1.0), op(TokenData::Plus, "+"), binary(num(2.0), op(TokenData::Star, "*"), num(3.0)))
        );
        assert_eq!(
            parse_ok("1*2+3"),
            *binary(binary(num(1.0), op(TokenData::Star, "*"), num(2.0)), op(TokenData::Plus, "+"), num(3.0))
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let minus = op(TokenData::Minus, "-");
        assert_eq!(
            parse_ok("5 - 3 - 1"),
            *binary(binary(num(5.0), minus.clone(), num(3.0)), minus, num(1.0))
        );

        let slash = op(TokenData::Slash, "/");
        assert_eq!(
            parse_ok("8 / 4 / 2"),
            *binary(binary(num(8.0), slash.clone(), num(4.0)), slash, num(2.0))
        );
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        assert_eq!(
            parse_ok("1 < 2 == 3 >= 4"),
            *binary(
                binary(num(1.0), op(TokenData::Less, "<"), num(2.0)),
                op(TokenData::EqualEqual, "=="),
                binary(num(3.0), op(TokenData::GreaterEqual, ">="), num(4.0)),
            )
        );
        assert_eq!(
            parse_ok("true != false"),
            *binary(boolean(true), op(TokenData::BangEqual, "!="), boolean(false))
        );
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(
            parse_ok("!-1"),
            Expr::Unary {
                operator: op(TokenData::Bang, "!"),
                right: Box::new(Expr::Unary { operator: op(TokenData::Minus, "-"), right: num(1.0) }),
            }
        );
        assert_eq!(
            parse_ok("-1 * 2"),
            *binary(
                Box::new(Expr::Unary { operator: op(TokenData::Minus, "-"), right: num(1.0) }),
                op(TokenData::Star, "*"),
                num(2.0)
            )
        );
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(
            parse_ok("(1 + 2) * 3"),
            *binary(
                Box::new(Expr::Grouping(binary(num(1.0), op(TokenData::Plus, "+"), num(2.0)))),
                op(TokenData::Star, "*"),
                num(3.0)
            )
        );
    }

    #[test]
    fn literals() {
        assert_eq!(parse_ok("nil"), Expr::Literal(LiteralValue::Nil));
        assert_eq!(parse_ok("false"), Expr::Literal(LiteralValue::Boolean(false)));
        assert_eq!(parse_ok("\"text\""), Expr::Literal(LiteralValue::Str("text".to_string())));
        assert_eq!(parse_ok("123.45"), Expr::Literal(LiteralValue::Number(123.45)));
    }

    #[test]
    fn ternary_is_right_associative() {
        assert_eq!(
            parse_ok("true ? 1 : false ? 2 : 3"),
            Expr::Ternary {
                condition: boolean(true),
                positive: num(1.0),
                negative: Box::new(Expr::Ternary {
                    condition: boolean(false),
                    positive: num(2.0),
                    negative: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn ternary_branches_take_full_expressions() {
        assert_eq!(
            parse_ok("true ? 1, 2 : 3"),
            Expr::Ternary {
                condition: boolean(true),
                positive: Box::new(Expr::Sequenced { left: num(1.0), right: num(2.0) }),
                negative: num(3.0),
            }
        );

        // the condition is parsed at equality level
        assert_eq!(
            parse_ok("1 == 2 ? 3 : 4"),
            Expr::Ternary {
                condition: binary(num(1.0), op(TokenData::EqualEqual, "=="), num(2.0)),
                positive: num(3.0),
                negative: num(4.0),
            }
        );
    }

    #[test]
    fn sequence_is_left_associative() {
        assert_eq!(
            parse_ok("1, 2, 3"),
            Expr::Sequenced {
                left: Box::new(Expr::Sequenced { left: num(1.0), right: num(2.0) }),
                right: num(3.0),
            }
        );
    }

    #[test]
    fn missing_expression() {
        let (error, diagnostics) = parse_err("1 + )");
        assert_eq!(error.error, ParseErrorType::ExpectedExpression);
        assert_eq!(error.token, op(TokenData::RightParen, ")"));
        assert_eq!(diagnostics, "[line 1] Error at ')': Expect expression.");
        assert_eq!(error.to_string(), diagnostics);

        let (error, diagnostics) = parse_err("");
        assert_eq!(error.token, Token::eof(Line(1)));
        assert_eq!(diagnostics, "[line 1] Error at end: Expect expression.");

        // identifiers are scanned but there is no expression using them
        let (_, diagnostics) = parse_err("a + 1");
        assert_eq!(diagnostics, "[line 1] Error at 'a': Expect expression.");
    }

    #[test]
    fn missing_right_paren() {
        let (error, diagnostics) = parse_err("(1 + 2\n");
        assert_eq!(error.error, ParseErrorType::ExpectedRightParen);
        assert!(error.token.is_eof());
        assert_eq!(diagnostics, "[line 2] Error at end: Expect ')' after expression.");
    }

    #[test]
    fn missing_colon() {
        let (error, diagnostics) = parse_err("true ? 1 2");
        assert_eq!(error.error, ParseErrorType::ExpectedColon);
        assert_eq!(diagnostics, "[line 1] Error at '2': Expect ':' between ternary branches.");
    }

    #[test]
    fn trailing_tokens() {
        let (error, diagnostics) = parse_err("1 2");
        assert_eq!(error.error, ParseErrorType::ExpectedEnd);
        assert_eq!(diagnostics, "[line 1] Error at '2': Expect end of expression.");
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let source = format!("{}1{}", "(".repeat(20000), ")".repeat(20000));
        let (error, diagnostics) = parse_err(&source);
        assert_eq!(error.error, ParseErrorType::TooDeep);
        assert_eq!(error.token, op(TokenData::LeftParen, "("));
        assert_eq!(diagnostics, "[line 1] Error at '(': Expression nested too deeply.");

        let (error, _) = parse_err(&format!("{}1", "-".repeat(20000)));
        assert_eq!(error.error, ParseErrorType::TooDeep);

        let (error, _) = parse_err(&format!("1{}", " + 1".repeat(20000)));
        assert_eq!(error.error, ParseErrorType::TooDeep);

        let (error, _) = parse_err(&format!("{}1", "true ? 1 : ".repeat(20000)));
        assert_eq!(error.error, ParseErrorType::TooDeep);
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let source = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let mut expr = parse_ok(&source);
        for _ in 0..MAX_DEPTH {
            expr = match expr {
                Expr::Grouping(inner) => *inner,
                other => panic!("expected grouping, got {other:?}"),
            };
        }
        assert_eq!(expr, *num(1.0));

        // siblings don't add up, only the current nesting counts
        let group = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        let source = format!("{group}, {group}");
        assert!(matches!(parse_ok(&source), Expr::Sequenced { .. }));
    }

    #[test]
    fn depth_resets_between_parses() {
        let source = format!("{}1 ; 1", "(".repeat(MAX_DEPTH + 1));
        let tokens = scan_ok(&source);
        let mut diagnostics = Diagnostics::default();
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        assert_eq!(parser.parse().unwrap_err().error, ParseErrorType::TooDeep);

        parser.synchronize();
        assert_eq!(parser.parse(), Ok(*num(1.0)));
    }

    #[test]
    fn only_first_error_is_reported() {
        let (_, diagnostics) = parse_err("(1 + ) ) )");
        assert_eq!(diagnostics, "[line 1] Error at ')': Expect expression.");
    }

    #[test]
    fn missing_eof_is_tolerated() {
        let mut diagnostics = Diagnostics::default();
        assert_eq!(parse(&[], &mut diagnostics).unwrap_err().token, Token::eof(Line(1)));

        let tokens = [Token::new(TokenData::Number(1.0), "1", Line(3))];
        let mut diagnostics = Diagnostics::default();
        assert_eq!(parse(&tokens, &mut diagnostics), Ok(*num(1.0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn synchronize_stops_after_semicolon() {
        let tokens = scan_ok("1 + ; 2");
        let mut diagnostics = Diagnostics::default();
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        parser.synchronize();
        assert_eq!(parser.peek().ty(), Number);
        assert_eq!(parser.peek().lexeme(), "2");
    }

    #[test]
    fn synchronize_stops_before_statement_keyword() {
        let tokens = scan_ok("1 2 var x");
        let mut diagnostics = Diagnostics::default();
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        parser.synchronize();
        assert_eq!(parser.peek().ty(), Var);

        let tokens = scan_ok("1 2 3");
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        parser.synchronize();
        assert!(parser.peek().is_eof());
        parser.synchronize();
        assert!(parser.peek().is_eof());
    }

    #[test]
    fn parse_again_after_synchronize() {
        let tokens = scan_ok(") ; 1 + 2");
        let mut diagnostics = Diagnostics::default();
        let mut parser = Parser::new(&tokens, &mut diagnostics);

        let error = parser.parse().unwrap_err();
        assert_eq!(error.error, ParseErrorType::ExpectedExpression);

        parser.synchronize();
        assert_eq!(
            parser.parse(),
            Ok(*binary(num(1.0), op(TokenData::Plus, "+"), num(2.0)))
        );
        drop(parser);
        assert_eq!(diagnostics.len(), 1);
    }
}
