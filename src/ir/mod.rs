//! High-level intermediate code generation.
//!
//! Second pass over the AST: linearises structured control flow and
//! expressions into three-address instructions over virtual registers.
//! From this stage on any malformed input means a bug in an earlier pass
//! and raises [`panic!`] instead of producing a typed error.

pub mod instr;

use crate::ast::*;
use crate::semantic::SemanticOutput;
use crate::symtab::{ScopeArena, ScopeId};
use crate::types::Type;
use std::fmt;
use std::rc::Rc;

pub use instr::{Instruction, InstructionSequence, MachineReg, Operand};

/// Three-address opcodes. Arity is fixed per opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighLevelOp {
    /// `localaddr vrD, $offset` — address of frame slot
    LocalAddr,
    /// `ldci vrD, $n`
    LoadIConst,
    /// `ldi vrD, (vrS)`
    LoadInt,
    /// `sti (vrD), vrS`
    StoreInt,
    /// `readi vrD`
    ReadInt,
    /// `writei vrS`
    WriteInt,
    IntAdd,
    IntSub,
    IntMul,
    IntDiv,
    IntMod,
    /// `cmpi vrL, vrR` — sets the implicit flags the following jump reads
    IntCompare,
    Jump,
    Je,
    Jne,
    Jlt,
    Jlte,
    Jgt,
    Jgte,
    Nop,
}

impl fmt::Display for HighLevelOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mnemonic = match self {
            Self::LocalAddr => "localaddr",
            Self::LoadIConst => "ldci",
            Self::LoadInt => "ldi",
            Self::StoreInt => "sti",
            Self::ReadInt => "readi",
            Self::WriteInt => "writei",
            Self::IntAdd => "addi",
            Self::IntSub => "subi",
            Self::IntMul => "muli",
            Self::IntDiv => "divi",
            Self::IntMod => "modi",
            Self::IntCompare => "cmpi",
            Self::Jump => "jmp",
            Self::Je => "je",
            Self::Jne => "jne",
            Self::Jlt => "jlt",
            Self::Jlte => "jlte",
            Self::Jgt => "jgt",
            Self::Jgte => "jgte",
            Self::Nop => "nop",
        };
        write!(f, "{mnemonic}")
    }
}

/// Output of this pass, input to assembly lowering.
#[derive(Debug)]
pub struct IrProgram {
    pub code: InstructionSequence<HighLevelOp>,
    /// Bytes of declared storage in the global scope.
    pub storage_size: i64,
    /// Number of distinct virtual registers used (high-water mark + 1).
    pub vreg_count: i64,
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, instruction) in self.code.instructions().iter().enumerate() {
            for label in self.code.labels_at(index) {
                writeln!(f, "{label}:")?;
            }
            writeln!(f, "\t{instruction}")?;
        }
        for label in self.code.labels_at(self.code.len()) {
            writeln!(f, "{label}:")?;
        }
        Ok(())
    }
}

/// What evaluating an expression produced: either a plain value in a
/// virtual register (or literal), or a virtual register holding the
/// *address* of storage (variable, array element and field references).
/// Addresses carry the type of the storage they point at, so chained
/// designators (`m[1][2]`, `r.a`) resolve without re-deriving anything
/// from names.
enum ExprValue {
    Value(Operand),
    Address(Operand, Rc<Type>),
}

struct HighLevelCodeGen<'a> {
    arena: &'a ScopeArena,
    scope: ScopeId,
    code: InstructionSequence<HighLevelOp>,
    /// Index of the most recently allocated vreg; -1 means none yet.
    vreg: i64,
    vreg_max: i64,
    label_index: u64,
}

impl<'a> HighLevelCodeGen<'a> {
    fn new(arena: &'a ScopeArena, scope: ScopeId) -> Self {
        Self {
            arena,
            scope,
            code: InstructionSequence::new(),
            vreg: -1,
            vreg_max: -1,
            label_index: 0,
        }
    }

    fn next_vreg(&mut self) -> i64 {
        self.vreg += 1;
        if self.vreg_max < self.vreg {
            self.vreg_max = self.vreg;
        }
        self.vreg
    }

    /// Virtual registers live until the end of the statement that
    /// allocated them.
    fn reset_vreg(&mut self) {
        self.vreg = -1;
    }

    fn next_label(&mut self) -> String {
        let label = format!(".L{}", self.label_index);
        self.label_index += 1;
        label
    }

    fn emit(&mut self, opcode: HighLevelOp, operands: Vec<Operand>) {
        self.code.add_instruction(Instruction::new(opcode, operands));
    }

    /// Addresses are consumed through one level of indirection; values are
    /// used as they are.
    fn load_if_address(&mut self, value: ExprValue) -> Operand {
        match value {
            ExprValue::Value(operand) => operand,
            ExprValue::Address(operand, _) => {
                let source = operand
                    .vreg_id()
                    .unwrap_or_else(|| panic!("address operand {operand:?} is not a vreg"));
                let dest = self.next_vreg();
                self.emit(
                    HighLevelOp::LoadInt,
                    vec![Operand::VReg(dest), Operand::VRegMemref(source)],
                );
                Operand::VReg(dest)
            }
        }
    }

    fn gen_expr(&mut self, expr: &Expr) -> ExprValue {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                let dest = self.next_vreg();
                self.emit(
                    HighLevelOp::LoadIConst,
                    vec![Operand::VReg(dest), Operand::IntLiteral(*value)],
                );
                ExprValue::Value(Operand::VReg(dest))
            }
            ExprKind::VarRef(name) => {
                let symbol = self
                    .arena
                    .lookup(self.scope, name)
                    .unwrap_or_else(|| panic!("unresolved variable '{name}' survived semantic analysis"));
                let dest = self.next_vreg();
                self.emit(
                    HighLevelOp::LocalAddr,
                    vec![Operand::VReg(dest), Operand::IntLiteral(symbol.offset)],
                );
                ExprValue::Address(Operand::VReg(dest), Rc::clone(&symbol.ty))
            }
            ExprKind::ArrayElement { array, index } => self.gen_array_element(array, index),
            ExprKind::FieldRef { record, field } => self.gen_field_ref(record, field),
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.gen_expr(lhs);
                let rhs = self.gen_expr(rhs);
                let lhs = self.load_if_address(lhs);
                let rhs = self.load_if_address(rhs);
                let dest = self.next_vreg();
                let opcode = match op {
                    BinaryOp::Add => HighLevelOp::IntAdd,
                    BinaryOp::Sub => HighLevelOp::IntSub,
                    BinaryOp::Mul => HighLevelOp::IntMul,
                    BinaryOp::Div => HighLevelOp::IntDiv,
                    BinaryOp::Mod => HighLevelOp::IntMod,
                };
                self.emit(opcode, vec![Operand::VReg(dest), lhs, rhs]);
                ExprValue::Value(Operand::VReg(dest))
            }
        }
    }

    /// Element address: `offset = index * element_size`, then
    /// `address = base + offset`. An index coming from a variable
    /// reference is dereferenced in place (memref operand); the multiply
    /// tolerates that and the literal element size.
    fn gen_array_element(&mut self, array: &Expr, index: &Expr) -> ExprValue {
        let (base, base_ty) = match self.gen_expr(array) {
            ExprValue::Address(operand, ty) => (operand, ty),
            ExprValue::Value(_) => panic!("array base does not name storage"),
        };

        let index_op = match self.gen_expr(index) {
            ExprValue::Address(operand, _) => {
                let id = operand
                    .vreg_id()
                    .unwrap_or_else(|| panic!("address operand {operand:?} is not a vreg"));
                Operand::VRegMemref(id)
            }
            ExprValue::Value(operand) => operand,
        };

        let Some((_, element)) = base_ty.as_array() else {
            panic!("subscripted value is not an array")
        };
        let element = Rc::clone(element);
        let element_size = element.size();

        let offset_reg = self.next_vreg();
        self.emit(
            HighLevelOp::IntMul,
            vec![
                Operand::VReg(offset_reg),
                index_op,
                Operand::IntLiteral(element_size),
            ],
        );

        let addr_reg = self.next_vreg();
        self.emit(
            HighLevelOp::IntAdd,
            vec![Operand::VReg(addr_reg), base, Operand::VReg(offset_reg)],
        );
        ExprValue::Address(Operand::VReg(addr_reg), element)
    }

    /// Field address: `address = base + offset`, the field's
    /// record-relative offset added in as a constant.
    fn gen_field_ref(&mut self, record: &Expr, field: &Ident) -> ExprValue {
        let (base, base_ty) = match self.gen_expr(record) {
            ExprValue::Address(operand, ty) => (operand, ty),
            ExprValue::Value(_) => panic!("field access base does not name storage"),
        };

        let Some(fields) = base_ty.as_record() else {
            panic!("field access on a value that is not a record")
        };
        let symbol = self
            .arena
            .lookup_local(fields, &field.name)
            .unwrap_or_else(|| {
                panic!("unresolved field '{}' survived semantic analysis", field.name)
            });

        let offset_reg = self.next_vreg();
        self.emit(
            HighLevelOp::LoadIConst,
            vec![Operand::VReg(offset_reg), Operand::IntLiteral(symbol.offset)],
        );
        let addr_reg = self.next_vreg();
        self.emit(
            HighLevelOp::IntAdd,
            vec![Operand::VReg(addr_reg), base, Operand::VReg(offset_reg)],
        );
        ExprValue::Address(Operand::VReg(addr_reg), Rc::clone(&symbol.ty))
    }

    /// Emits the compare and the conditional jump to `target`. A
    /// non-inverted condition jumps when it holds; an inverted one jumps
    /// when it does not (forward jumps over THEN bodies).
    fn gen_condition(&mut self, condition: &Condition, target: &str, inverted: bool) {
        let lhs = self.gen_expr(&condition.lhs);
        let rhs = self.gen_expr(&condition.rhs);
        let lhs = self.load_if_address(lhs);
        let rhs = self.load_if_address(rhs);
        self.emit(HighLevelOp::IntCompare, vec![lhs, rhs]);

        let opcode = match (condition.op, inverted) {
            (CompareOp::Eq, false) => HighLevelOp::Je,
            (CompareOp::Eq, true) => HighLevelOp::Jne,
            (CompareOp::Neq, false) => HighLevelOp::Jne,
            (CompareOp::Neq, true) => HighLevelOp::Je,
            (CompareOp::Lt, false) => HighLevelOp::Jlt,
            (CompareOp::Lt, true) => HighLevelOp::Jgte,
            (CompareOp::Lte, false) => HighLevelOp::Jlte,
            (CompareOp::Lte, true) => HighLevelOp::Jgt,
            (CompareOp::Gt, false) => HighLevelOp::Jgt,
            (CompareOp::Gt, true) => HighLevelOp::Jlte,
            (CompareOp::Gte, false) => HighLevelOp::Jgte,
            (CompareOp::Gte, true) => HighLevelOp::Jlt,
        };
        self.emit(opcode, vec![Operand::Label(target.to_owned())]);
    }

    fn gen_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assign { target, value } => {
                let target = match self.gen_expr(target) {
                    ExprValue::Address(operand, _) => operand,
                    ExprValue::Value(_) => panic!("assignment target does not name storage"),
                };
                let value = self.gen_expr(value);
                let value = self.load_if_address(value);
                let dest = target
                    .vreg_id()
                    .unwrap_or_else(|| panic!("address operand {target:?} is not a vreg"));
                self.emit(
                    HighLevelOp::StoreInt,
                    vec![Operand::VRegMemref(dest), value],
                );
                self.reset_vreg();
            }
            Statement::Read(target) => {
                let target = match self.gen_expr(target) {
                    ExprValue::Address(operand, _) => operand,
                    ExprValue::Value(_) => panic!("READ target does not name storage"),
                };
                let read_reg = self.next_vreg();
                self.emit(HighLevelOp::ReadInt, vec![Operand::VReg(read_reg)]);
                let dest = target
                    .vreg_id()
                    .unwrap_or_else(|| panic!("address operand {target:?} is not a vreg"));
                self.emit(
                    HighLevelOp::StoreInt,
                    vec![Operand::VRegMemref(dest), Operand::VReg(read_reg)],
                );
                self.reset_vreg();
            }
            Statement::Write(value) => {
                let value = self.gen_expr(value);
                let value = self.load_if_address(value);
                self.emit(HighLevelOp::WriteInt, vec![value]);
                self.reset_vreg();
            }
            Statement::If { cond, then, els: None } => {
                let out_label = self.next_label();
                self.gen_condition(cond, &out_label, true);
                self.gen_statement(then);
                self.code.define_label(out_label);
            }
            Statement::If {
                cond,
                then,
                els: Some(els),
            } => {
                let else_label = self.next_label();
                let out_label = self.next_label();
                self.gen_condition(cond, &else_label, true);
                self.gen_statement(then);
                self.emit(HighLevelOp::Jump, vec![Operand::Label(out_label.clone())]);
                self.code.define_label(else_label);
                self.gen_statement(els);
                self.code.define_label(out_label);
                // keep the out label attached to a real instruction even at
                // the end of the sequence
                self.emit(HighLevelOp::Nop, vec![]);
            }
            Statement::While { cond, body } => {
                let body_label = self.next_label();
                let cond_label = self.next_label();
                self.emit(HighLevelOp::Jump, vec![Operand::Label(cond_label.clone())]);
                self.code.define_label(body_label.clone());
                self.gen_statement(body);
                self.code.define_label(cond_label);
                self.gen_condition(cond, &body_label, false);
            }
            Statement::Repeat { body, cond } => {
                let body_label = self.next_label();
                let cond_label = self.next_label();
                // first iteration flows straight into the body
                self.code.define_label(body_label.clone());
                for statement in body {
                    self.gen_statement(statement);
                }
                self.code.define_label(cond_label);
                // loop back while the UNTIL condition is still false
                self.gen_condition(cond, &body_label, true);
            }
            Statement::Compound(body) => {
                for statement in body {
                    self.gen_statement(statement);
                }
            }
        }
    }
}

/// Runs the pass. Declarations emit no code; only the program body is
/// walked.
pub fn emit_ir(program: &Program, sem: &SemanticOutput) -> IrProgram {
    let mut gen = HighLevelCodeGen::new(&sem.arena, sem.global);
    for statement in &program.body {
        gen.gen_statement(statement);
    }
    IrProgram {
        code: gen.code,
        storage_size: sem.arena.total_size(sem.global),
        vreg_count: gen.vreg_max + 1,
    }
}
