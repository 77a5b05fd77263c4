use std::fmt;
use std::sync::Arc;

pub type Identifier = String;

/// Identity of an expression or type node, assigned by the parser.
///
/// Later passes attach their per-node outputs to side tables keyed by this
/// id instead of mutating the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Position of a construct in the original source file. Lines and columns
/// are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: Arc<str>,
    pub line: u32,
    pub col: u32,
}

impl SourceLoc {
    pub fn new(file: Arc<str>, line: u32, col: u32) -> Self {
        Self { file, line, col }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// An identifier occurrence together with where it was written.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: Identifier,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub name: Ident,
    pub declarations: Vec<Declaration>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Const(ConstDef),
    Type(TypeDef),
    Var(VarDef),
}

#[derive(Debug, Clone)]
pub struct ConstDef {
    pub name: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: Ident,
    pub ty: TypeExpr,
}

/// One `a, b, c : T` group. Also used for record field groups.
#[derive(Debug, Clone)]
pub struct VarDef {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub id: NodeId,
    pub loc: SourceLoc,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// `INTEGER`, `CHAR` or a name introduced by a TYPE definition.
    Named(Identifier),
    Array {
        length: Box<Expr>,
        element: Box<TypeExpr>,
    },
    Record {
        fields: Vec<VarDef>,
    },
}

#[derive(Debug, Clone)]
pub enum Statement {
    Assign {
        target: Expr,
        value: Expr,
    },
    If {
        cond: Condition,
        then: Box<Statement>,
        els: Option<Box<Statement>>,
    },
    While {
        cond: Condition,
        body: Box<Statement>,
    },
    Repeat {
        body: Vec<Statement>,
        cond: Condition,
    },
    Read(Expr),
    Write(Expr),
    Compound(Vec<Statement>),
}

/// `expr relop expr`. Conditions only occur in `IF`/`WHILE`/`UNTIL`
/// position, never as a value.
#[derive(Debug, Clone)]
pub struct Condition {
    pub op: CompareOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub loc: SourceLoc,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    VarRef(Identifier),
    ArrayElement {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    FieldRef {
        record: Box<Expr>,
        field: Ident,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// True for expressions that name storage and therefore evaluate to an
    /// address rather than a value.
    pub fn is_storage_ref(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::VarRef(_) | ExprKind::ArrayElement { .. } | ExprKind::FieldRef { .. }
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Mod => write!(f, "MOD"),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Neq => write!(f, "#"),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
        }
    }
}
