mod builder;
mod semantic_error;
#[cfg(test)]
mod semantic_tests;

pub use builder::{build_symtab, SemanticOutput, TypeMap};
pub use semantic_error::{Result, SemanticError};
