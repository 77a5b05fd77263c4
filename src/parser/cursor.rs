use crate::ast::{NodeId, SourceLoc};
use crate::lexer::{LocatedToken, Token};
use crate::parser::{ParseError, Result};
use std::sync::Arc;

/// Token cursor. Also hands out [`NodeId`]s so every expression and type
/// node built during the parse gets a unique identity.
#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: &'a [LocatedToken],
    position: usize,
    fallback: SourceLoc,
    next_id: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [LocatedToken], file: Arc<str>) -> Self {
        Self {
            tokens,
            position: 0,
            fallback: SourceLoc::new(file, 1, 1),
            next_id: 0,
        }
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|t| &**t)
    }

    pub fn peek_located(&self) -> Option<&LocatedToken> {
        self.tokens.get(self.position)
    }

    /// Location of the next token, or of the end of input when exhausted.
    pub fn loc(&self) -> SourceLoc {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or_else(|| self.fallback.clone(), |t| t.loc().clone())
    }

    pub fn bump(&mut self) {
        self.position += 1;
    }

    pub fn bump_if(&mut self, t: &Token) -> bool {
        let condition = self.peek() == Some(t);
        if condition {
            self.bump();
        }
        condition
    }

    pub fn next_or_error(&mut self) -> Result<&LocatedToken> {
        let next = self
            .tokens
            .get(self.position)
            .ok_or_else(|| ParseError::unexpected_eof(self.loc()))?;
        self.position += 1;
        Ok(next)
    }

    pub fn expect(&mut self, t: &Token) -> Result<()> {
        let loc = self.loc();
        let next = self.next_or_error()?;
        if &**next == t {
            Ok(())
        } else {
            let got = (**next).clone();
            Err(ParseError::expected_but_got(t.clone(), got, loc))
        }
    }
}
