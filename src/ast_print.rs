//! Plain-text views of a parsed program: an indented tree for `-p` and a
//! Graphviz DOT digraph for `-g`.

use crate::ast::*;
use std::fmt::{self, Write};

struct TreePrinter {
    out: String,
}

impl TreePrinter {
    fn line(&mut self, depth: usize, label: &str) -> fmt::Result {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        writeln!(self.out, "{label}")
    }

    fn program(&mut self, program: &Program) -> fmt::Result {
        self.line(0, &format!("PROGRAM {}", program.name.name))?;
        for declaration in &program.declarations {
            self.declaration(1, declaration)?;
        }
        self.line(1, "BLOCK")?;
        for statement in &program.body {
            self.statement(2, statement)?;
        }
        Ok(())
    }

    fn declaration(&mut self, depth: usize, declaration: &Declaration) -> fmt::Result {
        match declaration {
            Declaration::Const(def) => {
                self.line(depth, &format!("CONST_DEF {}", def.name.name))?;
                self.expr(depth + 1, &def.value)
            }
            Declaration::Type(def) => {
                self.line(depth, &format!("TYPE_DEF {}", def.name.name))?;
                self.type_expr(depth + 1, &def.ty)
            }
            Declaration::Var(def) => self.var_def(depth, def),
        }
    }

    fn var_def(&mut self, depth: usize, def: &VarDef) -> fmt::Result {
        let names: Vec<&str> = def.names.iter().map(|n| n.name.as_str()).collect();
        self.line(depth, &format!("VAR_DEF {}", names.join(", ")))?;
        self.type_expr(depth + 1, &def.ty)
    }

    fn type_expr(&mut self, depth: usize, type_expr: &TypeExpr) -> fmt::Result {
        match &type_expr.kind {
            TypeExprKind::Named(name) => self.line(depth, &format!("NAMED_TYPE {name}")),
            TypeExprKind::Array { length, element } => {
                self.line(depth, "ARRAY_TYPE")?;
                self.expr(depth + 1, length)?;
                self.type_expr(depth + 1, element)
            }
            TypeExprKind::Record { fields } => {
                self.line(depth, "RECORD_TYPE")?;
                for group in fields {
                    self.var_def(depth + 1, group)?;
                }
                Ok(())
            }
        }
    }

    fn statement(&mut self, depth: usize, statement: &Statement) -> fmt::Result {
        match statement {
            Statement::Assign { target, value } => {
                self.line(depth, "ASSIGN")?;
                self.expr(depth + 1, target)?;
                self.expr(depth + 1, value)
            }
            Statement::If { cond, then, els } => {
                self.line(depth, if els.is_some() { "IF_ELSE" } else { "IF" })?;
                self.condition(depth + 1, cond)?;
                self.statement(depth + 1, then)?;
                if let Some(els) = els {
                    self.statement(depth + 1, els)?;
                }
                Ok(())
            }
            Statement::While { cond, body } => {
                self.line(depth, "WHILE")?;
                self.condition(depth + 1, cond)?;
                self.statement(depth + 1, body)
            }
            Statement::Repeat { body, cond } => {
                self.line(depth, "REPEAT")?;
                for statement in body {
                    self.statement(depth + 1, statement)?;
                }
                self.condition(depth + 1, cond)
            }
            Statement::Read(target) => {
                self.line(depth, "READ")?;
                self.expr(depth + 1, target)
            }
            Statement::Write(value) => {
                self.line(depth, "WRITE")?;
                self.expr(depth + 1, value)
            }
            Statement::Compound(body) => {
                self.line(depth, "BLOCK")?;
                for statement in body {
                    self.statement(depth + 1, statement)?;
                }
                Ok(())
            }
        }
    }

    fn condition(&mut self, depth: usize, condition: &Condition) -> fmt::Result {
        self.line(depth, &format!("COMPARE {}", condition.op))?;
        self.expr(depth + 1, &condition.lhs)?;
        self.expr(depth + 1, &condition.rhs)
    }

    fn expr(&mut self, depth: usize, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::IntLiteral(value) => self.line(depth, &format!("INT_LITERAL {value}")),
            ExprKind::VarRef(name) => self.line(depth, &format!("VAR_REF {name}")),
            ExprKind::ArrayElement { array, index } => {
                self.line(depth, "ARRAY_ELEMENT_REF")?;
                self.expr(depth + 1, array)?;
                self.expr(depth + 1, index)
            }
            ExprKind::FieldRef { record, field } => {
                self.line(depth, &format!("FIELD_REF {}", field.name))?;
                self.expr(depth + 1, record)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.line(depth, &format!("BINARY {op}"))?;
                self.expr(depth + 1, lhs)?;
                self.expr(depth + 1, rhs)
            }
        }
    }
}

pub fn render_tree(program: &Program) -> String {
    let mut printer = TreePrinter { out: String::new() };
    printer
        .program(program)
        .expect("writing to a String cannot fail");
    printer.out
}

pub fn print_tree(program: &Program) {
    print!("{}", render_tree(program));
}

struct DotPrinter {
    out: String,
    next: u32,
}

impl DotPrinter {
    fn node(&mut self, label: &str) -> fmt::Result {
        writeln!(self.out, "  n{} [label=\"{label}\"];", self.next)?;
        self.next += 1;
        Ok(())
    }

    fn edge(&mut self, parent: u32, child: u32) -> fmt::Result {
        writeln!(self.out, "  n{parent} -> n{child};")
    }

    fn add(&mut self, parent: Option<u32>, label: &str) -> Result<u32, fmt::Error> {
        let id = self.next;
        self.node(label)?;
        if let Some(parent) = parent {
            self.edge(parent, id)?;
        }
        Ok(id)
    }

    fn program(&mut self, program: &Program) -> fmt::Result {
        let root = self.add(None, &format!("PROGRAM {}", program.name.name))?;
        for declaration in &program.declarations {
            self.declaration(root, declaration)?;
        }
        let block = self.add(Some(root), "BLOCK")?;
        for statement in &program.body {
            self.statement(block, statement)?;
        }
        Ok(())
    }

    fn declaration(&mut self, parent: u32, declaration: &Declaration) -> fmt::Result {
        match declaration {
            Declaration::Const(def) => {
                let id = self.add(Some(parent), &format!("CONST_DEF {}", def.name.name))?;
                self.expr(id, &def.value)
            }
            Declaration::Type(def) => {
                let id = self.add(Some(parent), &format!("TYPE_DEF {}", def.name.name))?;
                self.type_expr(id, &def.ty)
            }
            Declaration::Var(def) => self.var_def(parent, def),
        }
    }

    fn var_def(&mut self, parent: u32, def: &VarDef) -> fmt::Result {
        let names: Vec<&str> = def.names.iter().map(|n| n.name.as_str()).collect();
        let id = self.add(Some(parent), &format!("VAR_DEF {}", names.join(", ")))?;
        self.type_expr(id, &def.ty)
    }

    fn type_expr(&mut self, parent: u32, type_expr: &TypeExpr) -> fmt::Result {
        match &type_expr.kind {
            TypeExprKind::Named(name) => {
                self.add(Some(parent), &format!("NAMED_TYPE {name}"))?;
                Ok(())
            }
            TypeExprKind::Array { length, element } => {
                let id = self.add(Some(parent), "ARRAY_TYPE")?;
                self.expr(id, length)?;
                self.type_expr(id, element)
            }
            TypeExprKind::Record { fields } => {
                let id = self.add(Some(parent), "RECORD_TYPE")?;
                for group in fields {
                    self.var_def(id, group)?;
                }
                Ok(())
            }
        }
    }

    fn statement(&mut self, parent: u32, statement: &Statement) -> fmt::Result {
        match statement {
            Statement::Assign { target, value } => {
                let id = self.add(Some(parent), "ASSIGN")?;
                self.expr(id, target)?;
                self.expr(id, value)
            }
            Statement::If { cond, then, els } => {
                let label = if els.is_some() { "IF_ELSE" } else { "IF" };
                let id = self.add(Some(parent), label)?;
                self.condition(id, cond)?;
                self.statement(id, then)?;
                if let Some(els) = els {
                    self.statement(id, els)?;
                }
                Ok(())
            }
            Statement::While { cond, body } => {
                let id = self.add(Some(parent), "WHILE")?;
                self.condition(id, cond)?;
                self.statement(id, body)
            }
            Statement::Repeat { body, cond } => {
                let id = self.add(Some(parent), "REPEAT")?;
                for statement in body {
                    self.statement(id, statement)?;
                }
                self.condition(id, cond)
            }
            Statement::Read(target) => {
                let id = self.add(Some(parent), "READ")?;
                self.expr(id, target)
            }
            Statement::Write(value) => {
                let id = self.add(Some(parent), "WRITE")?;
                self.expr(id, value)
            }
            Statement::Compound(body) => {
                let id = self.add(Some(parent), "BLOCK")?;
                for statement in body {
                    self.statement(id, statement)?;
                }
                Ok(())
            }
        }
    }

    fn condition(&mut self, parent: u32, condition: &Condition) -> fmt::Result {
        let id = self.add(Some(parent), &format!("COMPARE {}", condition.op))?;
        self.expr(id, &condition.lhs)?;
        self.expr(id, &condition.rhs)
    }

    fn expr(&mut self, parent: u32, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                self.add(Some(parent), &format!("INT_LITERAL {value}"))?;
                Ok(())
            }
            ExprKind::VarRef(name) => {
                self.add(Some(parent), &format!("VAR_REF {name}"))?;
                Ok(())
            }
            ExprKind::ArrayElement { array, index } => {
                let id = self.add(Some(parent), "ARRAY_ELEMENT_REF")?;
                self.expr(id, array)?;
                self.expr(id, index)
            }
            ExprKind::FieldRef { record, field } => {
                let id = self.add(Some(parent), &format!("FIELD_REF {}", field.name))?;
                self.expr(id, record)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let id = self.add(Some(parent), &format!("BINARY {op}"))?;
                self.expr(id, lhs)?;
                self.expr(id, rhs)
            }
        }
    }
}

pub fn render_graph(program: &Program) -> String {
    let mut printer = DotPrinter {
        out: String::from("digraph program {\n"),
        next: 0,
    };
    printer
        .program(program)
        .expect("writing to a String cannot fail");
    printer.out.push_str("}\n");
    printer.out
}

pub fn print_graph(program: &Program) {
    print!("{}", render_graph(program));
}

#[cfg(test)]
mod ast_print_tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn program(source: &str) -> Program {
        let tokens = lex(source, "test.sp").expect("should lex");
        parse(&tokens, "test.sp").expect("should parse")
    }

    #[test]
    fn test_tree_shape() {
        let program = program("PROGRAM p; VAR x : INTEGER; BEGIN x := 1 + 2 END.");
        let expected = "\
PROGRAM p
  VAR_DEF x
    NAMED_TYPE INTEGER
  BLOCK
    ASSIGN
      VAR_REF x
      BINARY +
        INT_LITERAL 1
        INT_LITERAL 2
";
        assert_eq!(render_tree(&program), expected);
    }

    #[test]
    fn test_graph_is_wellformed() {
        let program = program("PROGRAM p; BEGIN IF 1 < 2 THEN WRITE 1 END.");
        let dot = render_graph(&program);
        assert!(dot.starts_with("digraph program {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("n0 [label=\"PROGRAM p\"];"));
        assert!(dot.contains("COMPARE <"));
        // every edge references declared nodes
        for line in dot.lines().filter(|l| l.contains("->")) {
            let (from, to) = line
                .trim()
                .trim_end_matches(';')
                .split_once(" -> ")
                .expect("edge line");
            assert!(dot.contains(&format!("{from} [label=")));
            assert!(dot.contains(&format!("{to} [label=")));
        }
    }
}
