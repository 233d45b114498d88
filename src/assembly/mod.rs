//! Instruction model for operation bodies.
//!
//! - [`opcodes`] - CIL opcode byte constants and their descriptions
//! - [`instruction`] - A single instruction and its operand
//! - [`sequence`] - Ordered instruction lists and a fluent builder

pub mod instruction;
pub mod opcodes;
pub mod sequence;

pub use instruction::{FlowType, Immediate, Instruction, Operand};
pub use sequence::{InstructionSequence, SequenceBuilder};
