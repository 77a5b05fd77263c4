use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineReg {
    Rsp,
    Rax,
    Rdx,
    Rdi,
    Rsi,
    R10,
    R11,
}

impl fmt::Display for MachineReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rsp => write!(f, "%rsp"),
            Self::Rax => write!(f, "%rax"),
            Self::Rdx => write!(f, "%rdx"),
            Self::Rdi => write!(f, "%rdi"),
            Self::Rsi => write!(f, "%rsi"),
            Self::R10 => write!(f, "%r10"),
            Self::R11 => write!(f, "%r11"),
        }
    }
}

/// A value an instruction operates on, shared between the high-level IR
/// (literals, virtual registers, labels) and the machine level (registers,
/// memory references).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    IntLiteral(i64),
    /// Virtual register `vrN`.
    VReg(i64),
    /// Indirection through the address held in `vrN`.
    VRegMemref(i64),
    MReg(MachineReg),
    /// `(reg)`
    MRegMemref(MachineReg),
    /// `disp(reg)`
    MRegMemrefOffset(MachineReg, i64),
    /// Code label, printed bare (jump and call targets).
    Label(String),
    /// Data label, printed as an immediate (`$name`).
    Data(String),
}

impl Operand {
    pub fn vreg_id(&self) -> Option<i64> {
        match self {
            Self::VReg(id) | Self::VRegMemref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::IntLiteral(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IntLiteral(value) => write!(f, "${value}"),
            Self::VReg(id) => write!(f, "vr{id}"),
            Self::VRegMemref(id) => write!(f, "(vr{id})"),
            Self::MReg(reg) => write!(f, "{reg}"),
            Self::MRegMemref(reg) => write!(f, "({reg})"),
            Self::MRegMemrefOffset(reg, disp) => write!(f, "{disp}({reg})"),
            Self::Label(name) => write!(f, "{name}"),
            Self::Data(name) => write!(f, "${name}"),
        }
    }
}

/// One instruction: an opcode (high-level or machine), up to three
/// operands, and an optional comment carried through to emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction<Op> {
    pub opcode: Op,
    pub operands: Vec<Operand>,
    pub comment: Option<String>,
}

impl<Op> Instruction<Op> {
    pub fn new(opcode: Op, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            operands,
            comment: None,
        }
    }

    /// Panics when the operand is missing; arity is fixed per opcode and a
    /// violation is a compiler bug.
    pub fn operand(&self, n: usize) -> &Operand {
        &self.operands[n]
    }
}

impl<Op: fmt::Display> fmt::Display for Instruction<Op> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let mut separator = " ";
        for operand in &self.operands {
            write!(f, "{separator}{operand}")?;
            separator = ", ";
        }
        Ok(())
    }
}

/// Append-only instruction list plus the labels defined in front of each
/// instruction index. A label may also fall past the last instruction
/// ("label at end"); [`labels_at`](Self::labels_at) with `index == len()`
/// returns those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSequence<Op> {
    instructions: Vec<Instruction<Op>>,
    labels: HashMap<usize, Vec<String>>,
}

impl<Op> InstructionSequence<Op> {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            labels: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn add_instruction(&mut self, instruction: Instruction<Op>) {
        self.instructions.push(instruction);
    }

    /// Defines `label` immediately before the next instruction added.
    /// Several labels may land on one index (e.g. nested IF ends).
    pub fn define_label(&mut self, label: String) {
        self.labels
            .entry(self.instructions.len())
            .or_default()
            .push(label);
    }

    pub fn labels_at(&self, index: usize) -> &[String] {
        self.labels.get(&index).map_or(&[], Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> &Instruction<Op> {
        &self.instructions[index]
    }

    pub fn instructions(&self) -> &[Instruction<Op>] {
        &self.instructions
    }

    pub fn set_comment(&mut self, index: usize, comment: String) {
        if let Some(instruction) = self.instructions.get_mut(index) {
            instruction.comment = Some(comment);
        }
    }

    pub fn defined_labels(&self) -> impl Iterator<Item = &str> {
        self.labels.values().flatten().map(String::as_str)
    }
}

impl<Op> Default for InstructionSequence<Op> {
    fn default() -> Self {
        Self::new()
    }
}
