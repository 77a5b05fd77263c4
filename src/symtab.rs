//! Lexically nested symbol tables.
//!
//! All scopes of one compilation live in a single [`ScopeArena`] and refer
//! to each other by [`ScopeId`]. Ownership is tree-shaped (the arena owns
//! every scope, a record type references its field scope by id); parent
//! links are plain back-references, so no reference cycles arise.

use crate::types::Type;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Const,
    Variable,
    Type,
    RecordField,
}

impl SymbolKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Const => "CONST",
            Self::Variable => "VAR",
            Self::Type => "TYPE",
            Self::RecordField => "FIELD",
        }
    }

    /// Storage-bearing symbols occupy stack (or record) space and advance
    /// the offset cursor; TYPE entries do not.
    pub fn is_storage(self) -> bool {
        !matches!(self, Self::Type)
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Rc<Type>,
    /// Byte offset within the enclosing frame (globals) or record
    /// (fields). Only meaningful for storage-bearing kinds.
    pub offset: i64,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    depth: u32,
    // declaration order matters for printing and field layout
    symbols: Vec<Symbol>,
}

#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Creates the arena together with its root (global) scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                depth: 0,
                symbols: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let depth = self.scopes[parent.0].depth + 1;
        self.scopes.push(Scope {
            parent: Some(parent),
            depth,
            symbols: Vec::new(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn depth(&self, scope: ScopeId) -> u32 {
        self.scopes[scope.0].depth
    }

    pub fn symbols(&self, scope: ScopeId) -> &[Symbol] {
        &self.scopes[scope.0].symbols
    }

    /// Appends. The semantic pass checks for duplicates with [`exists`]
    /// before inserting.
    ///
    /// [`exists`]: ScopeArena::exists
    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) {
        self.scopes[scope.0].symbols.push(symbol);
    }

    /// Searches this scope only. Record fields resolve against their
    /// record, never the enclosing scopes.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.0].symbols.iter().find(|s| s.name == name)
    }

    /// Searches the scope and its ancestors, innermost first.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    pub fn exists(&self, scope: ScopeId, name: &str) -> bool {
        self.lookup(scope, name).is_some()
    }

    /// Total bytes of storage declared directly in this scope. This is the
    /// frame contribution the code generator sizes against.
    pub fn total_size(&self, scope: ScopeId) -> i64 {
        self.scopes[scope.0]
            .symbols
            .iter()
            .filter(|s| s.kind.is_storage())
            .map(|s| s.ty.size())
            .sum()
    }

    /// One CSV line per symbol in declaration order:
    /// `<depth>,<kind>,<name>,<type>`. A symbol of record type prints its
    /// field scope (at the greater depth) before its own line.
    pub fn write_csv(&self, scope: ScopeId, out: &mut impl fmt::Write) -> fmt::Result {
        let depth = self.depth(scope);
        for symbol in self.symbols(scope) {
            if let Some(fields) = symbol.ty.as_record() {
                self.write_csv(fields, out)?;
            }
            writeln!(
                out,
                "{},{},{},{}",
                depth,
                symbol.kind.name(),
                symbol.name,
                symbol.ty
            )?;
        }
        Ok(())
    }

    pub fn to_csv(&self, scope: ScopeId) -> String {
        let mut out = String::new();
        self.write_csv(scope, &mut out)
            .expect("writing to a String cannot fail");
        out
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
