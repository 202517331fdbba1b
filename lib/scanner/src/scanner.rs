use cursor::Cursor;
use errors::Reporter;

pub mod token;
pub use token::{Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Unterminated block comment.")]
    UnterminatedBlockComment,
}

/// Result of a complete scanning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub tokens: Vec<Token>,
    pub had_error: bool,
}

/// Scans `source` in one pass. Lexical errors go to `reporter` and don't stop the scan.
pub fn scan(source: &str, reporter: &mut dyn Reporter) -> Scanned {
    let mut scanner = Scanner::new(source, reporter);
    let had_error = scanner.scan_tokens();
    Scanned { tokens: scanner.into_tokens(), had_error }
}

pub struct Scanner<'a, 'r> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token>,
    had_error: bool,
    completed: bool,
    reporter: &'r mut dyn Reporter,
}

impl<'a, 'r> Scanner<'a, 'r> {
    pub fn new(source: &'a str, reporter: &'r mut dyn Reporter) -> Self {
        let cursor = Cursor::new(source);
        Self {
            start: cursor.clone(),
            current: cursor,
            tokens: Vec::new(),
            had_error: false,
            completed: false,
            reporter,
        }
    }

    /// Scans the whole source and returns whether any lexical error occurred.
    ///
    /// Calling this again after the first pass returns the same flag without rescanning.
    pub fn scan_tokens(&mut self) -> bool {
        if self.completed {
            return self.had_error;
        }

        while !self.current.is_at_end() {
            self.start = self.current.clone();
            self.scan_token();
        }

        self.tokens.push(Token::eof(self.current.line()));
        self.completed = true;

        log::debug!(
            "Scanned {} tokens, ending on line {} (had_error: {})",
            self.tokens.len(),
            self.current.line(),
            self.had_error
        );

        self.had_error
    }

    /// Tokens scanned so far, empty until [`Scanner::scan_tokens`] has been called.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn scan_token(&mut self) {
        let Some(c) = self.current.next() else {
            return;
        };

        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '?' => self.add_token(QuestionMark),
            ':' => self.add_token(Colon),

            '!' => self.add_token_if_followed_by('=', BangEqual, Bang),
            '=' => self.add_token_if_followed_by('=', EqualEqual, Equal),
            '<' => self.add_token_if_followed_by('=', LessEqual, Less),
            '>' => self.add_token_if_followed_by('=', GreaterEqual, Greater),

            '/' => {
                if self.current.advance_if('/') {
                    // The newline is left for the main loop so it gets counted.
                    self.current.advance_while(|c| c != '\n');
                } else if self.current.advance_if('*') {
                    self.block_comment();
                } else {
                    self.add_token(Slash)
                }
            }

            '"' => self.string(),

            d if d.is_ascii_digit() => self.number(),

            a if a.is_alphabetic() => self.identifier(),

            // Newlines are counted by the cursor.
            ' ' | '\r' | '\t' | '\n' => (),

            c => self.error(ScanErrorType::UnexpectedCharacter(c)),
        }
    }

    fn lexeme(&self) -> &'a str {
        self.start.slice_until(&self.current)
    }

    fn add_token(&mut self, data: TokenData) {
        let token = Token::new(data, self.lexeme(), self.current.line());
        log::trace!("{:?}", token);
        self.tokens.push(token);
    }

    fn add_token_if_followed_by(&mut self, next: char, matched: TokenData, single: TokenData) {
        if self.current.advance_if(next) {
            self.add_token(matched)
        } else {
            self.add_token(single)
        }
    }

    fn error(&mut self, error: ScanErrorType) {
        log::trace!("Scan error on line {}: {:?}", self.current.line(), error);
        self.had_error = true;
        self.reporter.report_at_line(self.current.line(), &error.to_string());
    }

    fn block_comment(&mut self) {
        let mut depth = 1usize;
        while depth > 0 {
            match (self.current.peek(), self.current.peek_next()) {
                (None, _) => return self.error(ScanErrorType::UnterminatedBlockComment),
                (Some('*'), Some('/')) => {
                    depth -= 1;
                    self.current.next();
                    self.current.next();
                }
                (Some('/'), Some('*')) => {
                    depth += 1;
                    self.current.next();
                    self.current.next();
                }
                _ => {
                    self.current.next();
                }
            }
        }
    }

    fn string(&mut self) {
        self.current.advance_while(|c| c != '"');

        if !self.current.advance_if('"') {
            return self.error(ScanErrorType::UnterminatedString);
        }

        let lexeme = self.lexeme();
        let value = &lexeme[1..lexeme.len() - 1];
        self.add_token(Str(value.to_string()));
    }

    fn number(&mut self) {
        self.current.advance_while(|c| c.is_ascii_digit());

        // A trailing '.' without digits is left alone, e.g. for `123.method()`
        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        // Digits with an optional fraction always parse, too many of them give infinity.
        let value = self.lexeme().parse().unwrap_or(f64::INFINITY);
        self.add_token(Number(value));
    }

    fn identifier(&mut self) {
        self.current.advance_while(|c| c.is_alphanumeric() || c == '_');

        let data = TokenData::keyword(self.lexeme()).unwrap_or(Identifier);
        self.add_token(data);
    }
}
