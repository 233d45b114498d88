//! Ordered instruction lists.
//!
//! [`InstructionSequence`] is the unit the host hands to a rewrite patch: the complete body
//! of one operation, in execution order. [`SequenceBuilder`] offers a fluent way to put one
//! together, which is mostly useful for building synthetic bodies in tests and benchmarks.

use std::ops::Index;

use crate::{
    assembly::instruction::{Instruction, Operand},
    metadata::token::Token,
};

/// The compiled body of one operation as an ordered list of instructions.
///
/// # Examples
///
/// ```rust
/// use cilpatch::assembly::{Instruction, InstructionSequence};
/// use cilpatch::metadata::token::Token;
///
/// let seq: InstructionSequence = vec![
///     Instruction::ldarg(0),
///     Instruction::callvirt(Token::member_ref(1)),
///     Instruction::ret(),
/// ]
/// .into();
///
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.call_sites(Token::member_ref(1)).collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
}

impl InstructionSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sequence with room for `capacity` instructions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        InstructionSequence {
            instructions: Vec::with_capacity(capacity),
        }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the body has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Iterates the instructions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Appends an instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Borrows the instructions as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consumes the sequence, returning the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Indices of every `call`/`callvirt` whose operand is `method`.
    pub fn call_sites(&self, method: Token) -> impl Iterator<Item = usize> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .filter_map(move |(index, instr)| (instr.call_target() == Some(method)).then_some(index))
    }
}

impl From<Vec<Instruction>> for InstructionSequence {
    fn from(instructions: Vec<Instruction>) -> Self {
        InstructionSequence { instructions }
    }
}

impl FromIterator<Instruction> for InstructionSequence {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        InstructionSequence {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for InstructionSequence {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl Index<usize> for InstructionSequence {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

/// Fluent construction of an [`InstructionSequence`].
///
/// ```rust
/// use cilpatch::assembly::SequenceBuilder;
/// use cilpatch::metadata::token::Token;
///
/// let seq = SequenceBuilder::new()
///     .ldarg(0)
///     .ldstr(Token::new(0x7000_0010))
///     .callvirt(Token::member_ref(4))
///     .ret()
///     .build();
/// assert_eq!(seq.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    sequence: InstructionSequence,
}

impl SequenceBuilder {
    /// Starts an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary instruction.
    #[must_use]
    pub fn emit(mut self, instruction: Instruction) -> Self {
        self.sequence.push(instruction);
        self
    }

    /// Appends an opcode with an operand.
    #[must_use]
    pub fn op(self, opcode: u8, operand: Operand) -> Self {
        self.emit(Instruction::new(opcode, operand))
    }

    /// Appends `ldarg`.
    #[must_use]
    pub fn ldarg(self, index: u16) -> Self {
        self.emit(Instruction::ldarg(index))
    }

    /// Appends `ldstr`.
    #[must_use]
    pub fn ldstr(self, string: Token) -> Self {
        self.emit(Instruction::ldstr(string))
    }

    /// Appends an integer constant push.
    #[must_use]
    pub fn ldc_i4(self, value: i32) -> Self {
        self.emit(Instruction::ldc_i4(value))
    }

    /// Appends `call`.
    #[must_use]
    pub fn call(self, method: Token) -> Self {
        self.emit(Instruction::call(method))
    }

    /// Appends `callvirt`.
    #[must_use]
    pub fn callvirt(self, method: Token) -> Self {
        self.emit(Instruction::callvirt(method))
    }

    /// Appends `ret`.
    #[must_use]
    pub fn ret(self) -> Self {
        self.emit(Instruction::ret())
    }

    /// Finishes the body.
    #[must_use]
    pub fn build(self) -> InstructionSequence {
        self.sequence
    }
}
