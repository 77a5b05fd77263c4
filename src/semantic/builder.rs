use crate::ast::*;
use crate::semantic::{Result, SemanticError};
use crate::symtab::{ScopeArena, ScopeId, Symbol, SymbolKind};
use crate::types::Type;

use std::collections::HashMap;
use std::rc::Rc;

/// Resolved type of each expression/type node, keyed by node id. Nodes with
/// deliberately unchecked typing (array element and field references) have
/// no entry.
pub type TypeMap = HashMap<NodeId, Rc<Type>>;

/// Everything later passes need from semantic analysis.
#[derive(Debug)]
pub struct SemanticOutput {
    pub arena: ScopeArena,
    pub global: ScopeId,
    pub types: TypeMap,
}

struct SymbolTableBuilder {
    arena: ScopeArena,
    scope: ScopeId,
    /// Next free byte in the current scope. Resets to zero on record scope
    /// entry, so field offsets are record-relative.
    offset: i64,
    integer_type: Rc<Type>,
    char_type: Rc<Type>,
    types: TypeMap,
}

impl SymbolTableBuilder {
    fn new() -> Self {
        let arena = ScopeArena::new();
        let scope = arena.root();
        Self {
            arena,
            scope,
            offset: 0,
            integer_type: Rc::new(Type::integer()),
            char_type: Rc::new(Type::char()),
            types: TypeMap::new(),
        }
    }

    fn define(&mut self, name: &Ident, kind: SymbolKind, ty: Rc<Type>) -> Result<()> {
        if self.arena.exists(self.scope, &name.name) {
            return Err(SemanticError::Redeclaration {
                name: name.name.clone(),
                loc: name.loc.clone(),
            });
        }
        let offset = if kind.is_storage() {
            let offset = self.offset;
            self.offset += ty.size();
            offset
        } else {
            0
        };
        self.arena.insert(
            self.scope,
            Symbol {
                name: name.name.clone(),
                kind,
                ty,
                offset,
            },
        );
        Ok(())
    }

    fn visit_program(&mut self, program: &Program) -> Result<()> {
        for declaration in &program.declarations {
            self.visit_declaration(declaration)?;
        }
        for statement in &program.body {
            self.visit_statement(statement)?;
        }
        Ok(())
    }

    fn visit_declaration(&mut self, declaration: &Declaration) -> Result<()> {
        match declaration {
            Declaration::Const(def) => {
                let ty = self.visit_expr(&def.value)?;
                self.define(&def.name, SymbolKind::Const, ty)
            }
            Declaration::Type(def) => {
                let ty = self.visit_type_expr(&def.ty)?;
                self.define(&def.name, SymbolKind::Type, ty)
            }
            Declaration::Var(def) => self.visit_var_def(def, SymbolKind::Variable),
        }
    }

    fn visit_var_def(&mut self, def: &VarDef, kind: SymbolKind) -> Result<()> {
        let ty = self.visit_type_expr(&def.ty)?;
        for name in &def.names {
            self.define(name, kind, Rc::clone(&ty))?;
        }
        Ok(())
    }

    fn visit_type_expr(&mut self, type_expr: &TypeExpr) -> Result<Rc<Type>> {
        let ty = match &type_expr.kind {
            TypeExprKind::Named(name) if name == "INTEGER" => Rc::clone(&self.integer_type),
            TypeExprKind::Named(name) if name == "CHAR" => Rc::clone(&self.char_type),
            TypeExprKind::Named(name) => {
                let symbol = self.arena.lookup(self.scope, name).ok_or_else(|| {
                    SemanticError::UnknownType {
                        name: name.clone(),
                        loc: type_expr.loc.clone(),
                    }
                })?;
                Rc::clone(&symbol.ty)
            }
            TypeExprKind::Array { length, element } => {
                let element = self.visit_type_expr(element)?;
                self.visit_expr(length)?;
                let ExprKind::IntLiteral(length) = length.kind else {
                    unreachable!("parser only accepts literal array lengths");
                };
                Rc::new(Type::array(length, element))
            }
            TypeExprKind::Record { fields } => {
                // records are the only construct that pushes a scope
                let parent = self.scope;
                let saved_offset = self.offset;
                self.scope = self.arena.push_scope(parent);
                self.offset = 0;

                for group in fields {
                    self.visit_var_def(group, SymbolKind::RecordField)?;
                }

                let field_scope = self.scope;
                let size = self.arena.total_size(field_scope);
                self.scope = parent;
                self.offset = saved_offset;
                Rc::new(Type::record(field_scope, size))
            }
        };
        self.types.insert(type_expr.id, Rc::clone(&ty));
        Ok(ty)
    }

    fn visit_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Assign { target, value } => {
                self.visit_expr(target)?;
                self.visit_expr(value)?;
                Ok(())
            }
            Statement::If { cond, then, els } => {
                self.visit_condition(cond)?;
                self.visit_statement(then)?;
                if let Some(els) = els {
                    self.visit_statement(els)?;
                }
                Ok(())
            }
            Statement::While { cond, body } => {
                self.visit_condition(cond)?;
                self.visit_statement(body)
            }
            Statement::Repeat { body, cond } => {
                for statement in body {
                    self.visit_statement(statement)?;
                }
                self.visit_condition(cond)
            }
            Statement::Read(target) => self.visit_expr(target).map(|_| ()),
            Statement::Write(value) => self.visit_expr(value).map(|_| ()),
            Statement::Compound(body) => {
                for statement in body {
                    self.visit_statement(statement)?;
                }
                Ok(())
            }
        }
    }

    fn visit_condition(&mut self, condition: &Condition) -> Result<()> {
        self.visit_expr(&condition.lhs)?;
        self.visit_expr(&condition.rhs)?;
        Ok(())
    }

    /// Resolves names and records every expression node's type. Designators
    /// are shape-checked here, so code generation can rely on subscripts
    /// hitting arrays and field accesses hitting declared record fields.
    fn visit_expr(&mut self, expr: &Expr) -> Result<Rc<Type>> {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(_) => Rc::clone(&self.integer_type),
            ExprKind::VarRef(name) => {
                let symbol = self.arena.lookup(self.scope, name).ok_or_else(|| {
                    SemanticError::UndefinedVariable {
                        name: name.clone(),
                        loc: expr.loc.clone(),
                    }
                })?;
                Rc::clone(&symbol.ty)
            }
            ExprKind::ArrayElement { array, index } => {
                let base = self.visit_expr(array)?;
                self.visit_expr(index)?;
                match base.as_array() {
                    Some((_, element)) => Rc::clone(element),
                    None => {
                        return Err(SemanticError::NotAnArray {
                            loc: expr.loc.clone(),
                        })
                    }
                }
            }
            ExprKind::FieldRef { record, field } => {
                let base = self.visit_expr(record)?;
                let Some(fields) = base.as_record() else {
                    return Err(SemanticError::NotARecord {
                        loc: record.loc.clone(),
                    });
                };
                let symbol = self.arena.lookup_local(fields, &field.name).ok_or_else(|| {
                    SemanticError::UnknownField {
                        name: field.name.clone(),
                        loc: field.loc.clone(),
                    }
                })?;
                Rc::clone(&symbol.ty)
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs)?;
                self.visit_expr(rhs)?;
                Rc::clone(&self.integer_type)
            }
        };
        self.types.insert(expr.id, Rc::clone(&ty));
        Ok(ty)
    }
}

/// Walks the AST once, building the scope tree, assigning storage offsets
/// and resolving every name. Fails fast on the first semantic error.
pub fn build_symtab(program: &Program) -> Result<SemanticOutput> {
    let mut builder = SymbolTableBuilder::new();
    builder.visit_program(program)?;
    let global = builder.arena.root();
    Ok(SemanticOutput {
        arena: builder.arena,
        global,
        types: builder.types,
    })
}
