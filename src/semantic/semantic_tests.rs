use super::*;
use crate::lexer::lex;
use crate::parser::parse;
use crate::symtab::SymbolKind;

fn analyze(source: &str) -> Result<SemanticOutput> {
    let tokens = lex(source, "test.sp").expect("should lex");
    let program = parse(&tokens, "test.sp").expect("should parse");
    build_symtab(&program)
}

fn analyze_ok(source: &str) -> SemanticOutput {
    analyze(source).expect("should pass semantic analysis")
}

#[test]
fn test_variable_offsets_and_total_size() {
    let sem = analyze_ok("PROGRAM p; VAR x, y : INTEGER; a : ARRAY 3 OF INTEGER; BEGIN END.");
    let x = sem.arena.lookup(sem.global, "x").expect("x is declared");
    let y = sem.arena.lookup(sem.global, "y").expect("y is declared");
    let a = sem.arena.lookup(sem.global, "a").expect("a is declared");
    assert_eq!((x.offset, y.offset, a.offset), (0, 8, 16));
    assert_eq!(a.ty.size(), 24);
    assert_eq!(sem.arena.total_size(sem.global), 40);
}

#[test]
fn test_offsets_do_not_overlap() {
    let sem = analyze_ok("PROGRAM p; CONST n = 1; VAR x : INTEGER; b : ARRAY 2 OF INTEGER; BEGIN END.");
    let total = sem.arena.total_size(sem.global);
    let mut spans: Vec<(i64, i64)> = sem
        .arena
        .symbols(sem.global)
        .iter()
        .filter(|s| s.kind.is_storage())
        .map(|s| (s.offset, s.offset + s.ty.size()))
        .collect();
    spans.sort_unstable();
    for window in spans.windows(2) {
        assert!(window[0].1 <= window[1].0, "overlapping spans {window:?}");
    }
    assert!(spans.iter().all(|(_, end)| *end <= total));
}

#[test]
fn test_record_fields_are_record_relative() {
    let sem = analyze_ok(
        "PROGRAM p; VAR x : INTEGER; TYPE T = RECORD a : INTEGER; b : CHAR END; BEGIN END.",
    );
    let t = sem.arena.lookup(sem.global, "T").expect("T is declared");
    assert_eq!(t.kind, SymbolKind::Type);
    assert_eq!(t.offset, 0);
    assert_eq!(t.ty.size(), 16);

    let fields = t.ty.as_record().expect("T is a record");
    assert_eq!(sem.arena.depth(fields), 1);
    let a = sem.arena.lookup(fields, "a").expect("a is a field");
    let b = sem.arena.lookup(fields, "b").expect("b is a field");
    // record-relative, not continuing the outer cursor
    assert_eq!((a.offset, b.offset), (0, 8));

    // the record does not consume outer storage
    assert_eq!(sem.arena.total_size(sem.global), 8);
}

#[test]
fn test_symbol_table_csv() {
    let sem = analyze_ok(
        "PROGRAM p; VAR x, y : INTEGER; TYPE T = RECORD a : INTEGER; b : CHAR END; BEGIN END.",
    );
    let expected = "\
0,VAR,x,INTEGER
0,VAR,y,INTEGER
1,FIELD,a,INTEGER
1,FIELD,b,CHAR
0,TYPE,T,RECORD
";
    assert_eq!(sem.arena.to_csv(sem.global), expected);
}

#[test]
fn test_named_type_resolution() {
    let sem = analyze_ok("PROGRAM p; TYPE T = ARRAY 2 OF INTEGER; VAR v : T; BEGIN END.");
    let v = sem.arena.lookup(sem.global, "v").expect("v is declared");
    assert_eq!(v.ty.to_string(), "ARRAY 2 OF INTEGER");
    assert_eq!(v.ty.size(), 16);
}

#[test]
fn test_every_value_node_is_typed() {
    let tokens = lex(
        "PROGRAM p; VAR x : INTEGER; BEGIN x := 2 + 3; WRITE x END.",
        "test.sp",
    )
    .expect("should lex");
    let program = parse(&tokens, "test.sp").expect("should parse");
    let sem = build_symtab(&program).expect("should pass semantic analysis");

    // every expression in the body resolved to a type
    fn check(expr: &crate::ast::Expr, types: &TypeMap) {
        use crate::ast::ExprKind;
        match &expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                check(lhs, types);
                check(rhs, types);
            }
            ExprKind::IntLiteral(_) | ExprKind::VarRef(_) => (),
            _ => return,
        }
        assert!(types.contains_key(&expr.id), "untyped node {:?}", expr.kind);
    }
    for statement in &program.body {
        match statement {
            crate::ast::Statement::Assign { target, value } => {
                check(target, &sem.types);
                check(value, &sem.types);
            }
            crate::ast::Statement::Write(value) => check(value, &sem.types),
            _ => (),
        }
    }
}

#[test]
fn test_redeclaration_is_fatal() {
    let err = analyze("PROGRAM p; VAR x : INTEGER;\nVAR x : CHAR; BEGIN END.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test.sp:2:5: Error: Name 'x' is already defined"
    );
}

#[test]
fn test_field_may_not_shadow_outer_name() {
    let err = analyze(
        "PROGRAM p; VAR x : INTEGER; TYPE T = RECORD x : INTEGER END; BEGIN END.",
    )
    .unwrap_err();
    assert!(matches!(err, SemanticError::Redeclaration { ref name, .. } if name == "x"));
}

#[test]
fn test_unknown_type() {
    let err = analyze("PROGRAM p; VAR x : Widget; BEGIN END.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test.sp:1:20: Error: Unknown type 'Widget'"
    );
}

#[test]
fn test_field_designators_resolve_through_record_scopes() {
    let sem = analyze_ok(
        "PROGRAM p; TYPE T = RECORD a : INTEGER; b : CHAR END; VAR r : T; BEGIN r.a := 1 END.",
    );
    let r = sem.arena.lookup(sem.global, "r").expect("r is declared");
    let fields = r.ty.as_record().expect("r is a record");
    assert!(sem.arena.lookup_local(fields, "a").is_some());
    assert!(sem.arena.lookup_local(fields, "nope").is_none());
}

#[test]
fn test_unknown_field() {
    let err = analyze(
        "PROGRAM p; TYPE T = RECORD a : INTEGER END; VAR r : T;\nBEGIN r.nope := 1 END.",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "test.sp:2:9: Error: Unknown field 'nope'");
}

#[test]
fn test_field_access_on_non_record() {
    let err = analyze("PROGRAM p; VAR x : INTEGER;\nBEGIN x.a := 1 END.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test.sp:2:7: Error: Field access on a value that is not a record"
    );
}

#[test]
fn test_subscript_on_non_array() {
    let err = analyze("PROGRAM p; VAR x : INTEGER;\nBEGIN x[0] := 1 END.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test.sp:2:7: Error: Subscripted name is not an array"
    );
}

#[test]
fn test_undefined_variable() {
    let err = analyze("PROGRAM p; BEGIN WRITE nope END.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test.sp:1:24: Error: Undefined variable 'nope'"
    );
}
