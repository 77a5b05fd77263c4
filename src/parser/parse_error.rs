use crate::ast::SourceLoc;
use crate::lexer::Token;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InnerParseError {
    #[error("Expected token {0:?}, but got {1:?}")]
    ExpectedButGot(Token, Token),
    #[error("Expected an identifier, but got {0:?}")]
    ExpectedIdentifierButGot(Token),
    #[error("Expected a statement, but got {0:?}")]
    ExpectedStatement(Token),
    #[error("Expected a type, but got {0:?}")]
    BadType(Token),
    #[error("Expected an integer literal, but got {0:?}")]
    ExpectedIntLiteralButGot(Token),
    #[error("Expected a comparison operator, but got {0:?}")]
    ExpectedRelop(Token),
    #[error("Bad factor {0:?}")]
    BadFactor(Token),
    #[error("Trailing input after end of program: {0:?}")]
    TrailingInput(Token),
    #[error("Reached unexpected end of file")]
    UnexpectedEof,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    inner: InnerParseError,
    loc: SourceLoc,
}

impl ParseError {
    pub fn new(inner: InnerParseError, loc: SourceLoc) -> Self {
        Self { inner, loc }
    }

    pub fn expected_but_got(expected: Token, got: Token, loc: SourceLoc) -> Self {
        Self::new(InnerParseError::ExpectedButGot(expected, got), loc)
    }

    pub fn unexpected_eof(loc: SourceLoc) -> Self {
        Self::new(InnerParseError::UnexpectedEof, loc)
    }

    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }

    pub fn inner(&self) -> &InnerParseError {
        &self.inner
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: Error: {}", self.loc, self.inner)
    }
}

impl std::error::Error for ParseError {}
