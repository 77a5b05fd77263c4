//! Textual emission of the lowered program.
//!
//! The whole output surface is [`fmt::Display`]: rendering an
//! [`AsmProgram`] yields the complete AT&T-syntax assembly file, ready for
//! the platform assembler and a C library providing `printf`/`scanf`.


use crate::codegen::{AsmProgram, MachineOp, READ_FMT_LABEL, WRITE_FMT_LABEL};
use std::fmt;

impl fmt::Display for MachineOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mnemonic = match self {
            Self::Movq => "movq",
            Self::Leaq => "leaq",
            Self::Addq => "addq",
            Self::Subq => "subq",
            Self::Imulq => "imulq",
            Self::Idivq => "idivq",
            Self::Cqto => "cqto",
            Self::Cmpq => "cmpq",
            Self::Jmp => "jmp",
            Self::Je => "je",
            Self::Jne => "jne",
            Self::Jl => "jl",
            Self::Jle => "jle",
            Self::Jg => "jg",
            Self::Jge => "jge",
            Self::Call => "call",
            Self::Nop => "nop",
        };
        write!(f, "{mnemonic}")
    }
}

impl fmt::Display for AsmProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "/* {} vregs used */", self.vreg_count)?;
        writeln!(f, "\t.section .rodata")?;
        writeln!(f, "{READ_FMT_LABEL}: .string \"%ld\"")?;
        writeln!(f, "{WRITE_FMT_LABEL}: .string \"%ld\\n\"")?;
        writeln!(f, "\t.section .text")?;
        writeln!(f, "\t.globl main")?;
        writeln!(f, "main:")?;
        writeln!(f, "\tsubq ${}, %rsp", self.frame_size)?;

        for (index, instruction) in self.code.instructions().iter().enumerate() {
            for label in self.code.labels_at(index) {
                writeln!(f, "{label}:")?;
            }
            match &instruction.comment {
                Some(comment) => writeln!(f, "\t{instruction} /* {comment} */")?,
                None => writeln!(f, "\t{instruction}")?,
            }
        }
        for label in self.code.labels_at(self.code.len()) {
            writeln!(f, "{label}:")?;
        }

        writeln!(f, "\taddq ${}, %rsp", self.frame_size)?;
        writeln!(f, "\tmovl $0, %eax")?;
        writeln!(f, "\tret")
    }
}
