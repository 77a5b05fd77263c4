use crate::ast::SourceLoc;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InnerLexError {
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Integer constant '{0}' is out of range")]
    IntegerOutOfRange(String),
}

/// A lexical error anchored at the position where the offending text
/// starts.
#[derive(Debug, Clone)]
pub struct LexError {
    inner: InnerLexError,
    loc: SourceLoc,
}

impl LexError {
    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }
}

impl InnerLexError {
    pub(super) fn at(self, loc: SourceLoc) -> LexError {
        LexError { inner: self, loc }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: Error: {}", self.loc, self.inner)
    }
}

impl std::error::Error for LexError {}
