use crate::symtab::ScopeId;
use std::fmt;
use std::rc::Rc;

/// Every storage unit the back-end addresses is one 8-byte word.
pub const WORD_SIZE: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Integer,
    Char,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Char => "CHAR",
        }
    }
}

/// A SimpleP type. Immutable once constructed and shared by reference; the
/// two primitives exist as one canonical instance per compilation (created
/// by the semantic pass), arrays and records are built as declarations are
/// processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(Primitive),
    Array {
        length: i64,
        element: Rc<Type>,
    },
    /// Fields live in their own scope, referenced by id into the
    /// compilation's [`ScopeArena`](crate::symtab::ScopeArena). The size is
    /// fixed at construction, once the field scope is fully populated.
    Record {
        fields: ScopeId,
        size: i64,
    },
}

impl Type {
    pub fn integer() -> Self {
        Self::Primitive(Primitive::Integer)
    }

    pub fn char() -> Self {
        Self::Primitive(Primitive::Char)
    }

    pub fn array(length: i64, element: Rc<Type>) -> Self {
        Self::Array { length, element }
    }

    pub fn record(fields: ScopeId, size: i64) -> Self {
        Self::Record { fields, size }
    }

    pub fn size(&self) -> i64 {
        match self {
            Self::Primitive(_) => WORD_SIZE,
            Self::Array { length, element } => length * element.size(),
            Self::Record { size, .. } => *size,
        }
    }

    pub fn as_record(&self) -> Option<ScopeId> {
        match self {
            Self::Record { fields, .. } => Some(*fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<(i64, &Rc<Type>)> {
        match self {
            Self::Array { length, element } => Some((*length, element)),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p.name()),
            Self::Array { length, element } => write!(f, "ARRAY {length} OF {element}"),
            // field lines are the symbol table's job
            Self::Record { .. } => write!(f, "RECORD"),
        }
    }
}
