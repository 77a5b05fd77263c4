use super::*;
use crate::lexer::lex;

fn parse_source(source: &str) -> Result<Program> {
    let tokens = lex(source, "test.sp").expect("should lex");
    parse(&tokens, "test.sp")
}

fn parse_ok(source: &str) -> Program {
    parse_source(source).expect("should parse")
}

#[test]
fn test_minimal_program() {
    let program = parse_ok("PROGRAM p; BEGIN END.");
    assert_eq!(program.name.name, "p");
    assert!(program.declarations.is_empty());
    assert!(program.body.is_empty());
}

#[test]
fn test_assignment_of_sum() {
    let program = parse_ok("PROGRAM p; VAR x : INTEGER; BEGIN x := 2 + 3 END.");
    assert_eq!(program.declarations.len(), 1);
    let Declaration::Var(var) = &program.declarations[0] else {
        panic!("expected a VAR declaration");
    };
    assert_eq!(var.names[0].name, "x");
    assert!(matches!(var.ty.kind, TypeExprKind::Named(ref n) if n == "INTEGER"));

    let Statement::Assign { target, value } = &program.body[0] else {
        panic!("expected an assignment");
    };
    assert!(matches!(target.kind, ExprKind::VarRef(ref n) if n == "x"));
    let ExprKind::Binary { op, lhs, rhs } = &value.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(lhs.kind, ExprKind::IntLiteral(2)));
    assert!(matches!(rhs.kind, ExprKind::IntLiteral(3)));
}

#[test]
fn test_term_binds_tighter_than_sum() {
    let program = parse_ok("PROGRAM p; VAR x : INTEGER; BEGIN x := 1 + 2 * 3 END.");
    let Statement::Assign { value, .. } = &program.body[0] else {
        panic!("expected an assignment");
    };
    let ExprKind::Binary { op, rhs, .. } = &value.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_while_with_compound_body() {
    let program = parse_ok(
        "PROGRAM p; VAR i : INTEGER; BEGIN WHILE i <= 3 DO BEGIN WRITE i; i := i + 1 END END.",
    );
    let Statement::While { cond, body } = &program.body[0] else {
        panic!("expected a while loop");
    };
    assert_eq!(cond.op, CompareOp::Lte);
    let Statement::Compound(inner) = &**body else {
        panic!("expected a compound body");
    };
    assert_eq!(inner.len(), 2);
}

#[test]
fn test_if_else_single_statements() {
    let program = parse_ok("PROGRAM p; BEGIN IF 1 > 0 THEN WRITE 1 ELSE WRITE 0 END.");
    let Statement::If { cond, then, els } = &program.body[0] else {
        panic!("expected an if");
    };
    assert_eq!(cond.op, CompareOp::Gt);
    assert!(matches!(**then, Statement::Write(_)));
    assert!(matches!(els.as_deref(), Some(Statement::Write(_))));
}

#[test]
fn test_repeat_until() {
    let program = parse_ok("PROGRAM p; VAR i : INTEGER; BEGIN REPEAT i := i + 1 UNTIL i = 10 END.");
    let Statement::Repeat { body, cond } = &program.body[0] else {
        panic!("expected a repeat loop");
    };
    assert_eq!(body.len(), 1);
    assert_eq!(cond.op, CompareOp::Eq);
}

#[test]
fn test_array_designator_and_type() {
    let program = parse_ok(
        "PROGRAM p; VAR a : ARRAY 3 OF INTEGER; BEGIN a[2] := 4; READ a[0]; WRITE a[1] END.",
    );
    let Declaration::Var(var) = &program.declarations[0] else {
        panic!("expected a VAR declaration");
    };
    let TypeExprKind::Array { length, element } = &var.ty.kind else {
        panic!("expected an array type");
    };
    assert!(matches!(length.kind, ExprKind::IntLiteral(3)));
    assert!(matches!(element.kind, TypeExprKind::Named(ref n) if n == "INTEGER"));

    let Statement::Assign { target, .. } = &program.body[0] else {
        panic!("expected an assignment");
    };
    assert!(matches!(target.kind, ExprKind::ArrayElement { .. }));
}

#[test]
fn test_record_type_with_field_groups() {
    let program =
        parse_ok("PROGRAM p; TYPE T = RECORD a, b : INTEGER; c : CHAR; END; BEGIN END.");
    let Declaration::Type(def) = &program.declarations[0] else {
        panic!("expected a TYPE declaration");
    };
    let TypeExprKind::Record { fields } = &def.ty.kind else {
        panic!("expected a record type");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].names.len(), 2);
}

#[test]
fn test_field_designator() {
    let program = parse_ok("PROGRAM p; BEGIN r.x := 1 END.");
    let Statement::Assign { target, .. } = &program.body[0] else {
        panic!("expected an assignment");
    };
    let ExprKind::FieldRef { record, field } = &target.kind else {
        panic!("expected a field reference");
    };
    assert!(matches!(record.kind, ExprKind::VarRef(ref n) if n == "r"));
    assert_eq!(field.name, "x");
}

#[test]
fn test_missing_final_dot() {
    let err = parse_source("PROGRAM p; BEGIN END").unwrap_err();
    assert!(matches!(err.inner(), InnerParseError::UnexpectedEof));
}

#[test]
fn test_missing_then_is_located() {
    let err = parse_source("PROGRAM p;\nBEGIN IF 1 = 1 WRITE 1 END.").unwrap_err();
    assert!(matches!(err.inner(), InnerParseError::ExpectedButGot(..)));
    assert_eq!(err.loc().line, 2);
    assert_eq!(
        err.to_string(),
        "test.sp:2:16: Error: Expected token Then, but got Write"
    );
}

#[test]
fn test_condition_requires_relop() {
    let err = parse_source("PROGRAM p; BEGIN IF 1 THEN WRITE 1 END.").unwrap_err();
    assert!(matches!(err.inner(), InnerParseError::ExpectedRelop(_)));
}
