mod cursor;
mod parse_error;
#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::lexer::{LocatedToken, Token};
use cursor::Cursor;
use std::sync::Arc;

pub use parse_error::{InnerParseError, ParseError, Result};

fn parse_ident(cursor: &mut Cursor) -> Result<Ident> {
    let loc = cursor.loc();
    let next = cursor.next_or_error()?;
    if let Token::Identifier(name) = &**next {
        let name = name.clone();
        Ok(Ident { name, loc })
    } else {
        let got = (**next).clone();
        Err(ParseError::new(
            InnerParseError::ExpectedIdentifierButGot(got),
            loc,
        ))
    }
}

fn parse_ident_list(cursor: &mut Cursor) -> Result<Vec<Ident>> {
    let mut names = vec![parse_ident(cursor)?];
    while cursor.bump_if(&Token::Comma) {
        names.push(parse_ident(cursor)?);
    }
    Ok(names)
}

fn parse_int_literal(cursor: &mut Cursor) -> Result<Expr> {
    let loc = cursor.loc();
    let next = cursor.next_or_error()?;
    if let Token::IntLiteral(value) = **next {
        let id = cursor.next_node_id();
        Ok(Expr {
            id,
            loc,
            kind: ExprKind::IntLiteral(value),
        })
    } else {
        let got = (**next).clone();
        Err(ParseError::new(
            InnerParseError::ExpectedIntLiteralButGot(got),
            loc,
        ))
    }
}

fn parse_type(cursor: &mut Cursor) -> Result<TypeExpr> {
    let loc = cursor.loc();
    match cursor.peek() {
        Some(Token::Identifier(_)) => {
            let name = parse_ident(cursor)?;
            let id = cursor.next_node_id();
            Ok(TypeExpr {
                id,
                loc,
                kind: TypeExprKind::Named(name.name),
            })
        }
        Some(Token::Array) => {
            cursor.bump();
            let length = parse_int_literal(cursor).map(Box::new)?;
            cursor.expect(&Token::Of)?;
            let element = parse_type(cursor).map(Box::new)?;
            let id = cursor.next_node_id();
            Ok(TypeExpr {
                id,
                loc,
                kind: TypeExprKind::Array { length, element },
            })
        }
        Some(Token::Record) => {
            cursor.bump();
            let mut fields = Vec::new();
            while matches!(cursor.peek(), Some(Token::Identifier(_))) {
                let names = parse_ident_list(cursor)?;
                cursor.expect(&Token::Colon)?;
                let ty = parse_type(cursor)?;
                fields.push(VarDef { names, ty });
                // separator is optional before END
                if !cursor.bump_if(&Token::Semicolon) {
                    break;
                }
            }
            cursor.expect(&Token::End)?;
            let id = cursor.next_node_id();
            Ok(TypeExpr {
                id,
                loc,
                kind: TypeExprKind::Record { fields },
            })
        }
        Some(other) => {
            let other = other.clone();
            Err(ParseError::new(InnerParseError::BadType(other), loc))
        }
        None => Err(ParseError::unexpected_eof(loc)),
    }
}

fn parse_designator(cursor: &mut Cursor) -> Result<Expr> {
    let base = parse_ident(cursor)?;
    let id = cursor.next_node_id();
    let mut designator = Expr {
        id,
        loc: base.loc,
        kind: ExprKind::VarRef(base.name),
    };

    loop {
        if cursor.bump_if(&Token::OpenBracket) {
            let index = parse_expr(cursor).map(Box::new)?;
            cursor.expect(&Token::CloseBracket)?;
            let id = cursor.next_node_id();
            let loc = designator.loc.clone();
            designator = Expr {
                id,
                loc,
                kind: ExprKind::ArrayElement {
                    array: Box::new(designator),
                    index,
                },
            };
        } else if cursor.bump_if(&Token::Dot) {
            let field = parse_ident(cursor)?;
            let id = cursor.next_node_id();
            let loc = designator.loc.clone();
            designator = Expr {
                id,
                loc,
                kind: ExprKind::FieldRef {
                    record: Box::new(designator),
                    field,
                },
            };
        } else {
            return Ok(designator);
        }
    }
}

fn parse_factor(cursor: &mut Cursor) -> Result<Expr> {
    let loc = cursor.loc();
    match cursor.peek() {
        Some(Token::IntLiteral(_)) => parse_int_literal(cursor),
        Some(Token::Identifier(_)) => parse_designator(cursor),
        Some(Token::OpenParanth) => {
            cursor.bump();
            let inner = parse_expr(cursor)?;
            cursor.expect(&Token::CloseParanth)?;
            Ok(inner)
        }
        Some(other) => {
            let other = other.clone();
            Err(ParseError::new(InnerParseError::BadFactor(other), loc))
        }
        None => Err(ParseError::unexpected_eof(loc)),
    }
}

fn parse_term(cursor: &mut Cursor) -> Result<Expr> {
    let mut left = parse_factor(cursor)?;
    loop {
        let op = match cursor.peek() {
            Some(Token::Asterisk) => BinaryOp::Mul,
            Some(Token::FSlash) => BinaryOp::Div,
            Some(Token::Mod) => BinaryOp::Mod,
            _ => return Ok(left),
        };
        let loc = cursor.loc();
        cursor.bump();
        let right = parse_factor(cursor)?;
        let id = cursor.next_node_id();
        left = Expr {
            id,
            loc,
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            },
        };
    }
}

fn parse_expr(cursor: &mut Cursor) -> Result<Expr> {
    let mut left = parse_term(cursor)?;
    loop {
        let op = match cursor.peek() {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => return Ok(left),
        };
        let loc = cursor.loc();
        cursor.bump();
        let right = parse_term(cursor)?;
        let id = cursor.next_node_id();
        left = Expr {
            id,
            loc,
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            },
        };
    }
}

fn parse_condition(cursor: &mut Cursor) -> Result<Condition> {
    let lhs = parse_expr(cursor)?;
    let loc = cursor.loc();
    let next = cursor.next_or_error()?;
    let op = match &**next {
        Token::Equal => CompareOp::Eq,
        Token::NotEqual => CompareOp::Neq,
        Token::Less => CompareOp::Lt,
        Token::LessEq => CompareOp::Lte,
        Token::Greater => CompareOp::Gt,
        Token::GreaterEq => CompareOp::Gte,
        other => {
            let other = other.clone();
            return Err(ParseError::new(InnerParseError::ExpectedRelop(other), loc));
        }
    };
    let rhs = parse_expr(cursor)?;
    Ok(Condition { op, lhs, rhs })
}

fn starts_statement(token: &Token) -> bool {
    matches!(
        token,
        Token::Identifier(_)
            | Token::If
            | Token::While
            | Token::Repeat
            | Token::Read
            | Token::Write
            | Token::Begin
    )
}

fn parse_statement(cursor: &mut Cursor) -> Result<Statement> {
    let loc = cursor.loc();
    match cursor.peek() {
        Some(Token::Identifier(_)) => {
            let target = parse_designator(cursor)?;
            cursor.expect(&Token::Assign)?;
            let value = parse_expr(cursor)?;
            Ok(Statement::Assign { target, value })
        }
        Some(Token::If) => {
            cursor.bump();
            let cond = parse_condition(cursor)?;
            cursor.expect(&Token::Then)?;
            let then = parse_statement(cursor).map(Box::new)?;
            let els = if cursor.bump_if(&Token::Else) {
                Some(parse_statement(cursor).map(Box::new)?)
            } else {
                None
            };
            Ok(Statement::If { cond, then, els })
        }
        Some(Token::While) => {
            cursor.bump();
            let cond = parse_condition(cursor)?;
            cursor.expect(&Token::Do)?;
            let body = parse_statement(cursor).map(Box::new)?;
            Ok(Statement::While { cond, body })
        }
        Some(Token::Repeat) => {
            cursor.bump();
            let body = parse_statement_seq(cursor)?;
            cursor.expect(&Token::Until)?;
            let cond = parse_condition(cursor)?;
            Ok(Statement::Repeat { body, cond })
        }
        Some(Token::Read) => {
            cursor.bump();
            let target = parse_designator(cursor)?;
            Ok(Statement::Read(target))
        }
        Some(Token::Write) => {
            cursor.bump();
            let value = parse_expr(cursor)?;
            Ok(Statement::Write(value))
        }
        Some(Token::Begin) => {
            cursor.bump();
            let body = parse_statement_seq(cursor)?;
            cursor.expect(&Token::End)?;
            Ok(Statement::Compound(body))
        }
        Some(other) => {
            let other = other.clone();
            Err(ParseError::new(InnerParseError::ExpectedStatement(other), loc))
        }
        None => Err(ParseError::unexpected_eof(loc)),
    }
}

/// Possibly-empty `;`-separated statement sequence. The caller consumes the
/// terminator (`END` or `UNTIL`).
fn parse_statement_seq(cursor: &mut Cursor) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    if cursor.peek().filter(|t| starts_statement(t)).is_none() {
        return Ok(statements);
    }
    statements.push(parse_statement(cursor)?);
    while cursor.bump_if(&Token::Semicolon) {
        statements.push(parse_statement(cursor)?);
    }
    Ok(statements)
}

fn parse_const_section(cursor: &mut Cursor, declarations: &mut Vec<Declaration>) -> Result<()> {
    cursor.expect(&Token::Const)?;
    while matches!(cursor.peek(), Some(Token::Identifier(_))) {
        let name = parse_ident(cursor)?;
        cursor.expect(&Token::Equal)?;
        let value = parse_expr(cursor)?;
        cursor.expect(&Token::Semicolon)?;
        declarations.push(Declaration::Const(ConstDef { name, value }));
    }
    Ok(())
}

fn parse_type_section(cursor: &mut Cursor, declarations: &mut Vec<Declaration>) -> Result<()> {
    cursor.expect(&Token::Type)?;
    while matches!(cursor.peek(), Some(Token::Identifier(_))) {
        let name = parse_ident(cursor)?;
        cursor.expect(&Token::Equal)?;
        let ty = parse_type(cursor)?;
        cursor.expect(&Token::Semicolon)?;
        declarations.push(Declaration::Type(TypeDef { name, ty }));
    }
    Ok(())
}

fn parse_var_section(cursor: &mut Cursor, declarations: &mut Vec<Declaration>) -> Result<()> {
    cursor.expect(&Token::Var)?;
    while matches!(cursor.peek(), Some(Token::Identifier(_))) {
        let names = parse_ident_list(cursor)?;
        cursor.expect(&Token::Colon)?;
        let ty = parse_type(cursor)?;
        cursor.expect(&Token::Semicolon)?;
        declarations.push(Declaration::Var(VarDef { names, ty }));
    }
    Ok(())
}

fn parse_declarations(cursor: &mut Cursor) -> Result<Vec<Declaration>> {
    let mut declarations = Vec::new();
    loop {
        match cursor.peek() {
            Some(Token::Const) => parse_const_section(cursor, &mut declarations)?,
            Some(Token::Type) => parse_type_section(cursor, &mut declarations)?,
            Some(Token::Var) => parse_var_section(cursor, &mut declarations)?,
            _ => return Ok(declarations),
        }
    }
}

fn parse_program(cursor: &mut Cursor) -> Result<Program> {
    cursor.expect(&Token::Program)?;
    let name = parse_ident(cursor)?;
    cursor.expect(&Token::Semicolon)?;
    let declarations = parse_declarations(cursor)?;
    cursor.expect(&Token::Begin)?;
    let body = parse_statement_seq(cursor)?;
    cursor.expect(&Token::End)?;
    cursor.expect(&Token::Dot)?;
    Ok(Program {
        name,
        declarations,
        body,
    })
}

pub fn parse(tokens: &[LocatedToken], filename: &str) -> Result<Program> {
    let mut cursor = Cursor::new(tokens, Arc::from(filename));
    let program = parse_program(&mut cursor)?;

    if let Some(extra) = cursor.peek_located() {
        let got = (**extra).clone();
        let loc = extra.loc().clone();
        return Err(ParseError::new(InnerParseError::TrailingInput(got), loc));
    }

    Ok(program)
}
