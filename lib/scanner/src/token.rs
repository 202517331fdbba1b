use std::fmt::Display;

use cursor::Line;
use errors::{At, Located};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub data: TokenData,
    pub lexeme: String,
    pub line: Line,
}

impl Token {
    pub fn new(data: TokenData, lexeme: impl Into<String>, line: Line) -> Self {
        Self { data, lexeme: lexeme.into(), line }
    }

    pub fn eof(line: Line) -> Self {
        Self::new(TokenData::Eof, "", line)
    }

    pub fn ty(&self) -> TokenType {
        TokenType::from(&self.data)
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }
}

impl Located for Token {
    fn line(&self) -> Line {
        self.line
    }

    fn at(&self) -> At {
        if self.is_eof() {
            At::End
        } else {
            At::Lexeme(self.lexeme.clone())
        }
    }
}

/// `<Kind> <lexeme> <literal>`, used for token dumps.
impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ", self.ty(), self.lexeme)?;
        match &self.data {
            TokenData::Str(s) => write!(f, "{s}"),
            TokenData::Number(n) => write!(f, "{n}"),
            _ => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(TokenType), derive(strum_macros::Display, Hash))]
pub enum TokenData {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    QuestionMark,
    Colon,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str(String),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenData {
    /// Reserved words, matched against a complete identifier lexeme.
    pub fn keyword(lexeme: &str) -> Option<TokenData> {
        use TokenData::*;
        Some(match lexeme {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => return None,
        })
    }
}
