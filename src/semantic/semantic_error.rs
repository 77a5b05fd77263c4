use crate::ast::SourceLoc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SemanticError>;

/// Fatal semantic diagnostics. Every variant carries the source location of
/// the offending identifier; there is no recovery, the first error ends the
/// compilation.
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    #[error("{loc}: Error: Name '{name}' is already defined")]
    Redeclaration { name: String, loc: SourceLoc },
    #[error("{loc}: Error: Unknown type '{name}'")]
    UnknownType { name: String, loc: SourceLoc },
    #[error("{loc}: Error: Undefined variable '{name}'")]
    UndefinedVariable { name: String, loc: SourceLoc },
    #[error("{loc}: Error: Subscripted name is not an array")]
    NotAnArray { loc: SourceLoc },
    #[error("{loc}: Error: Field access on a value that is not a record")]
    NotARecord { loc: SourceLoc },
    #[error("{loc}: Error: Unknown field '{name}'")]
    UnknownField { name: String, loc: SourceLoc },
}
