use super::*;
use crate::ir::instr::{Instruction, InstructionSequence, MachineReg, Operand};
use crate::ir::{HighLevelOp, IrProgram};

use HighLevelOp as H;
use MachineOp as M;
use MachineReg as R;
use Operand::*;

fn ir_program(
    instructions: Vec<Instruction<HighLevelOp>>,
    storage_size: i64,
    vreg_count: i64,
) -> IrProgram {
    let mut code = InstructionSequence::new();
    for instruction in instructions {
        code.add_instruction(instruction);
    }
    IrProgram {
        code,
        storage_size,
        vreg_count,
    }
}

fn lowered(asm: &AsmProgram) -> Vec<(MachineOp, Vec<Operand>)> {
    asm.code
        .instructions()
        .iter()
        .map(|i| (i.opcode, i.operands.clone()))
        .collect()
}

#[test]
fn test_empty_program_frame() {
    let asm = codegen(&ir_program(vec![], 0, 0));
    // zero storage plus the alignment pad
    assert_eq!(asm.frame_size, 8);
    assert!(asm.code.is_empty());
}

#[test]
fn test_frame_alignment_invariant() {
    for (storage, vregs) in [(0, 0), (0, 1), (0, 2), (8, 4), (24, 5), (40, 0), (16, 2)] {
        let asm = codegen(&ir_program(vec![], storage, vregs));
        let raw = storage + vregs * 8;
        assert!((asm.frame_size + 8) % 16 == 0, "frame {} misaligned", asm.frame_size);
        assert!(asm.frame_size >= raw);
        assert!(asm.frame_size - raw <= 8);
    }
}

#[test]
fn test_localaddr_lowering() {
    let ir = ir_program(
        vec![Instruction::new(H::LocalAddr, vec![VReg(0), IntLiteral(8)])],
        16,
        1,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Leaq, vec![MRegMemrefOffset(R::Rsp, 8), MReg(R::R10)]),
            (M::Movq, vec![MReg(R::R10), MRegMemrefOffset(R::Rsp, 16)]),
        ]
    );
}

#[test]
fn test_store_goes_through_both_scratch_registers() {
    let ir = ir_program(
        vec![Instruction::new(H::StoreInt, vec![VRegMemref(0), VReg(1)])],
        0,
        2,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 8), MReg(R::R11)]),
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 0), MReg(R::R10)]),
            (M::Movq, vec![MReg(R::R11), MRegMemref(R::R10)]),
        ]
    );
}

#[test]
fn test_load_follows_the_address() {
    let ir = ir_program(
        vec![Instruction::new(H::LoadInt, vec![VReg(1), VRegMemref(0)])],
        0,
        2,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 0), MReg(R::R11)]),
            (M::Movq, vec![MRegMemref(R::R11), MReg(R::R11)]),
            (M::Movq, vec![MReg(R::R11), MRegMemrefOffset(R::Rsp, 8)]),
        ]
    );
}

#[test]
fn test_div_and_mod_results() {
    let div = ir_program(
        vec![Instruction::new(H::IntDiv, vec![VReg(2), VReg(0), VReg(1)])],
        0,
        3,
    );
    let asm = codegen(&div);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 0), MReg(R::Rax)]),
            (M::Cqto, vec![]),
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 8), MReg(R::R10)]),
            (M::Idivq, vec![MReg(R::R10)]),
            (M::Movq, vec![MReg(R::Rax), MRegMemrefOffset(R::Rsp, 16)]),
        ]
    );

    let modulo = ir_program(
        vec![Instruction::new(H::IntMod, vec![VReg(2), VReg(0), VReg(1)])],
        0,
        3,
    );
    let asm = codegen(&modulo);
    let last = lowered(&asm).pop().expect("non-empty");
    assert_eq!(
        last,
        (M::Movq, vec![MReg(R::Rdx), MRegMemrefOffset(R::Rsp, 16)])
    );
}

#[test]
fn test_multiply_tolerates_memref_and_literal() {
    let ir = ir_program(
        vec![Instruction::new(
            H::IntMul,
            vec![VReg(2), VRegMemref(1), IntLiteral(8)],
        )],
        16,
        3,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 24), MReg(R::R11)]),
            (M::Movq, vec![MRegMemref(R::R11), MReg(R::R11)]),
            (M::Movq, vec![IntLiteral(8), MReg(R::R10)]),
            (M::Imulq, vec![MReg(R::R11), MReg(R::R10)]),
            (M::Movq, vec![MReg(R::R10), MRegMemrefOffset(R::Rsp, 32)]),
        ]
    );
}

#[test]
fn test_conditional_jump_mapping() {
    let table = [
        (H::Jump, M::Jmp),
        (H::Je, M::Je),
        (H::Jne, M::Jne),
        (H::Jlt, M::Jl),
        (H::Jlte, M::Jle),
        (H::Jgt, M::Jg),
        (H::Jgte, M::Jge),
    ];
    for (hop, mop) in table {
        let ir = ir_program(
            vec![Instruction::new(hop, vec![Label(".L0".to_owned())])],
            0,
            0,
        );
        let asm = codegen(&ir);
        assert_eq!(lowered(&asm), vec![(mop, vec![Label(".L0".to_owned())])]);
    }
}

#[test]
fn test_large_immediate_is_staged() {
    let big = i64::from(i32::MAX) + 1;
    let ir = ir_program(
        vec![Instruction::new(H::LoadIConst, vec![VReg(0), IntLiteral(big)])],
        0,
        1,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![IntLiteral(big), MReg(R::R10)]),
            (M::Movq, vec![MReg(R::R10), MRegMemrefOffset(R::Rsp, 0)]),
        ]
    );
}

#[test]
fn test_read_and_write_calling_sequence() {
    let ir = ir_program(
        vec![
            Instruction::new(H::ReadInt, vec![VReg(0)]),
            Instruction::new(H::WriteInt, vec![VReg(0)]),
        ],
        0,
        1,
    );
    let asm = codegen(&ir);
    assert_eq!(
        lowered(&asm),
        vec![
            (M::Movq, vec![Data(READ_FMT_LABEL.to_owned()), MReg(R::Rdi)]),
            (M::Leaq, vec![MRegMemrefOffset(R::Rsp, 0), MReg(R::Rsi)]),
            (M::Call, vec![Label("scanf".to_owned())]),
            (M::Movq, vec![Data(WRITE_FMT_LABEL.to_owned()), MReg(R::Rdi)]),
            (M::Movq, vec![MRegMemrefOffset(R::Rsp, 0), MReg(R::Rsi)]),
            (M::Call, vec![Label("printf".to_owned())]),
        ]
    );
}

#[test]
fn test_labels_and_comments_carry_over() {
    let mut code = InstructionSequence::new();
    code.define_label(".L0".to_owned());
    code.add_instruction(Instruction::new(H::Nop, vec![]));
    code.define_label(".L1".to_owned());
    let ir = IrProgram {
        code,
        storage_size: 0,
        vreg_count: 0,
    };
    let asm = codegen(&ir);
    assert_eq!(asm.code.labels_at(0), [".L0".to_owned()]);
    assert_eq!(asm.code.labels_at(asm.code.len()), [".L1".to_owned()]);
    assert_eq!(asm.code.get(0).comment.as_deref(), Some("nop"));
}
