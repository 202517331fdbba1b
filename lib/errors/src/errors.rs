use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use cursor::Line;
use itertools::Itertools;

/// Where on a line a diagnostic points.
#[derive(Clone, Debug, PartialEq)]
pub enum At {
    /// Only the line is known, e.g. for errors found while scanning.
    Nowhere,
    /// The end-of-input token.
    End,
    Lexeme(String),
}

impl Display for At {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            At::Nowhere => Ok(()),
            At::End => write!(f, " at end"),
            At::Lexeme(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{at}: {message}")]
pub struct Diagnostic {
    pub line: Line,
    pub at: At,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: Line, at: At, message: impl ToString) -> Self {
        Self { line, at, message: message.to_string() }
    }
}

/// Anything a diagnostic can be attached to.
pub trait Located {
    fn line(&self) -> Line;
    fn at(&self) -> At;
}

/// Sink for diagnostics. Scanner and parser report through this as soon as they hit a problem.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);

    fn report_at_line(&mut self, line: Line, message: &str) {
        self.report(Diagnostic::new(line, At::Nowhere, message));
    }

    fn report_at_token(&mut self, token: &dyn Located, message: &str) {
        self.report(Diagnostic::new(token.line(), token.at(), message));
    }
}

/// Collects every reported diagnostic in order.
#[derive(thiserror::Error, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Reporter for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(d: Diagnostic) -> Self {
        Self(vec![d])
    }
}

impl Deref for Diagnostics {
    type Target = [Diagnostic];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}
