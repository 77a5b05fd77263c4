//! Lowering of the high-level IR to x86-64.
//!
//! Every virtual register is backed by one 8-byte stack slot; `%r10` and
//! `%r11` are the scratch registers, `%rax`/`%rdx` serve division,
//! `%rdi`/`%rsi` carry the `printf`/`scanf` arguments.

#[cfg(test)]
mod codegen_tests;

use crate::ir::instr::{Instruction, InstructionSequence, MachineReg, Operand};
use crate::ir::{HighLevelOp, IrProgram};
use crate::types::WORD_SIZE;

/// `.rodata` label of the `scanf` format string (`"%ld"`).
pub const READ_FMT_LABEL: &str = "s_readint_fmt";
/// `.rodata` label of the `printf` format string (`"%ld\n"`).
pub const WRITE_FMT_LABEL: &str = "s_writeint_fmt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineOp {
    Movq,
    Leaq,
    Addq,
    Subq,
    Imulq,
    Idivq,
    Cqto,
    Cmpq,
    Jmp,
    Je,
    Jne,
    Jl,
    Jle,
    Jg,
    Jge,
    Call,
    Nop,
}

/// A lowered program, ready for emission.
#[derive(Debug)]
pub struct AsmProgram {
    pub code: InstructionSequence<MachineOp>,
    /// Bytes subtracted from `%rsp` in the prologue. Sized so that the
    /// 8 bytes a `call` pushes bring `%rsp` back to 16-byte alignment.
    pub frame_size: i64,
    pub vreg_count: i64,
}

struct AsmCodeGen {
    storage_size: i64,
    code: InstructionSequence<MachineOp>,
}

impl AsmCodeGen {
    /// Spill slot of virtual register `N`: `(S + 8N)(%rsp)`.
    fn slot(&self, vreg: i64) -> Operand {
        Operand::MRegMemrefOffset(MachineReg::Rsp, self.storage_size + vreg * WORD_SIZE)
    }

    fn slot_of(&self, operand: &Operand) -> Operand {
        operand
            .vreg_id()
            .map(|id| self.slot(id))
            .unwrap_or_else(|| panic!("expected a vreg operand, got {operand:?}"))
    }

    /// Literals stay immediates, vregs become their spill slot.
    fn value_or_slot(&self, operand: &Operand) -> Operand {
        if operand.is_literal() {
            operand.clone()
        } else {
            self.slot_of(operand)
        }
    }

    fn emit(&mut self, opcode: MachineOp, operands: Vec<Operand>) {
        self.code.add_instruction(Instruction::new(opcode, operands));
    }

    /// Multiply operands may be literals (array element size) or memrefs
    /// (an index loaded straight through a variable's address).
    fn load_mul_arg(&mut self, arg: &Operand, reg: MachineReg) {
        match arg {
            Operand::IntLiteral(value) => {
                self.emit(
                    MachineOp::Movq,
                    vec![Operand::IntLiteral(*value), Operand::MReg(reg)],
                );
            }
            Operand::VReg(id) => {
                let slot = self.slot(*id);
                self.emit(MachineOp::Movq, vec![slot, Operand::MReg(reg)]);
            }
            Operand::VRegMemref(id) => {
                let slot = self.slot(*id);
                self.emit(MachineOp::Movq, vec![slot, Operand::MReg(reg)]);
                self.emit(
                    MachineOp::Movq,
                    vec![Operand::MRegMemref(reg), Operand::MReg(reg)],
                );
            }
            other => panic!("bad multiply operand {other:?}"),
        }
    }

    fn translate_divrem(&mut self, hin: &Instruction<HighLevelOp>, result: MachineReg) {
        use MachineOp as M;
        use MachineReg as R;

        let dividend = self.slot_of(hin.operand(1));
        self.emit(M::Movq, vec![dividend, Operand::MReg(R::Rax)]);
        self.emit(M::Cqto, vec![]);
        let divisor = self.slot_of(hin.operand(2));
        self.emit(M::Movq, vec![divisor, Operand::MReg(R::R10)]);
        self.emit(M::Idivq, vec![Operand::MReg(R::R10)]);
        let dest = self.slot_of(hin.operand(0));
        self.emit(M::Movq, vec![Operand::MReg(result), dest]);
    }

    fn translate(&mut self, hin: &Instruction<HighLevelOp>) {
        use HighLevelOp as H;
        use MachineOp as M;
        use MachineReg as R;

        match hin.opcode {
            H::LocalAddr => {
                let Operand::IntLiteral(offset) = hin.operand(1) else {
                    panic!("localaddr offset must be a literal")
                };
                self.emit(
                    M::Leaq,
                    vec![
                        Operand::MRegMemrefOffset(R::Rsp, *offset),
                        Operand::MReg(R::R10),
                    ],
                );
                let dest = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![Operand::MReg(R::R10), dest]);
            }
            H::LoadIConst => {
                let Operand::IntLiteral(value) = hin.operand(1) else {
                    panic!("ldci source must be a literal")
                };
                let dest = self.slot_of(hin.operand(0));
                if i32::try_from(*value).is_ok() {
                    self.emit(M::Movq, vec![Operand::IntLiteral(*value), dest]);
                } else {
                    // no imm64-to-memory encoding; stage through a scratch
                    self.emit(
                        M::Movq,
                        vec![Operand::IntLiteral(*value), Operand::MReg(R::R10)],
                    );
                    self.emit(M::Movq, vec![Operand::MReg(R::R10), dest]);
                }
            }
            H::LoadInt => {
                match hin.operand(1) {
                    Operand::IntLiteral(value) => {
                        self.emit(
                            M::Movq,
                            vec![Operand::IntLiteral(*value), Operand::MReg(R::R11)],
                        );
                    }
                    src => {
                        // the slot holds an address; follow it
                        let slot = self.slot_of(src);
                        self.emit(M::Movq, vec![slot, Operand::MReg(R::R11)]);
                        self.emit(
                            M::Movq,
                            vec![Operand::MRegMemref(R::R11), Operand::MReg(R::R11)],
                        );
                    }
                }
                let dest = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![Operand::MReg(R::R11), dest]);
            }
            H::StoreInt => {
                let value = self.slot_of(hin.operand(1));
                self.emit(M::Movq, vec![value, Operand::MReg(R::R11)]);
                let addr = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![addr, Operand::MReg(R::R10)]);
                self.emit(
                    M::Movq,
                    vec![Operand::MReg(R::R11), Operand::MRegMemref(R::R10)],
                );
            }
            H::IntAdd => {
                let lhs = self.slot_of(hin.operand(1));
                self.emit(M::Movq, vec![lhs, Operand::MReg(R::R11)]);
                let rhs = self.slot_of(hin.operand(2));
                self.emit(M::Movq, vec![rhs, Operand::MReg(R::R10)]);
                self.emit(
                    M::Addq,
                    vec![Operand::MReg(R::R11), Operand::MReg(R::R10)],
                );
                let dest = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![Operand::MReg(R::R10), dest]);
            }
            H::IntSub => {
                // subq leaves the difference in its second operand, so the
                // minuend sits in %r10
                let lhs = self.slot_of(hin.operand(1));
                self.emit(M::Movq, vec![lhs, Operand::MReg(R::R10)]);
                let rhs = self.slot_of(hin.operand(2));
                self.emit(M::Movq, vec![rhs, Operand::MReg(R::R11)]);
                self.emit(
                    M::Subq,
                    vec![Operand::MReg(R::R11), Operand::MReg(R::R10)],
                );
                let dest = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![Operand::MReg(R::R10), dest]);
            }
            H::IntMul => {
                self.load_mul_arg(hin.operand(1), R::R11);
                self.load_mul_arg(hin.operand(2), R::R10);
                self.emit(
                    M::Imulq,
                    vec![Operand::MReg(R::R11), Operand::MReg(R::R10)],
                );
                let dest = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![Operand::MReg(R::R10), dest]);
            }
            H::IntDiv => self.translate_divrem(hin, R::Rax),
            // the remainder comes back in %rdx
            H::IntMod => self.translate_divrem(hin, R::Rdx),
            H::IntCompare => {
                let lhs = self.value_or_slot(hin.operand(0));
                self.emit(M::Movq, vec![lhs, Operand::MReg(R::R10)]);
                let rhs = self.value_or_slot(hin.operand(1));
                self.emit(M::Movq, vec![rhs, Operand::MReg(R::R11)]);
                self.emit(
                    M::Cmpq,
                    vec![Operand::MReg(R::R11), Operand::MReg(R::R10)],
                );
            }
            H::Jump | H::Je | H::Jne | H::Jlt | H::Jlte | H::Jgt | H::Jgte => {
                let opcode = match hin.opcode {
                    H::Jump => M::Jmp,
                    H::Je => M::Je,
                    H::Jne => M::Jne,
                    H::Jlt => M::Jl,
                    H::Jlte => M::Jle,
                    H::Jgt => M::Jg,
                    H::Jgte => M::Jge,
                    _ => unreachable!(),
                };
                self.emit(opcode, vec![hin.operand(0).clone()]);
            }
            H::ReadInt => {
                self.emit(
                    M::Movq,
                    vec![
                        Operand::Data(READ_FMT_LABEL.to_owned()),
                        Operand::MReg(R::Rdi),
                    ],
                );
                // scanf wants the slot's address
                let slot = self.slot_of(hin.operand(0));
                self.emit(M::Leaq, vec![slot, Operand::MReg(R::Rsi)]);
                self.emit(M::Call, vec![Operand::Label("scanf".to_owned())]);
            }
            H::WriteInt => {
                self.emit(
                    M::Movq,
                    vec![
                        Operand::Data(WRITE_FMT_LABEL.to_owned()),
                        Operand::MReg(R::Rdi),
                    ],
                );
                let slot = self.slot_of(hin.operand(0));
                self.emit(M::Movq, vec![slot, Operand::MReg(R::Rsi)]);
                self.emit(M::Call, vec![Operand::Label("printf".to_owned())]);
            }
            H::Nop => self.emit(M::Nop, vec![]),
        }
    }
}

/// Lowers the IR. Labels defined at a high-level index come out in front of
/// the first machine instruction lowered from it; the high-level text of
/// each instruction rides along as a comment on that same instruction.
pub fn codegen(ir: &IrProgram) -> AsmProgram {
    let mut frame_size = ir.storage_size + ir.vreg_count * WORD_SIZE;
    if frame_size % 16 == 0 {
        // the call instruction pushes the return address; frame % 16 == 8
        // keeps callees 16-aligned
        frame_size += 8;
    }

    let mut gen = AsmCodeGen {
        storage_size: ir.storage_size,
        code: InstructionSequence::new(),
    };

    for index in 0..ir.code.len() {
        for label in ir.code.labels_at(index) {
            gen.code.define_label(label.clone());
        }
        let hin = ir.code.get(index);
        let mark = gen.code.len();
        gen.translate(hin);
        gen.code.set_comment(mark, hin.to_string());
    }
    for label in ir.code.labels_at(ir.code.len()) {
        gen.code.define_label(label.clone());
    }

    AsmProgram {
        code: gen.code,
        frame_size,
        vreg_count: ir.vreg_count,
    }
}
