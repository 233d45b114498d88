//! CIL instruction representation used by the peephole rewriter.
//!
//! The model is deliberately minimal: an instruction is an opcode (with optional `0xFE`
//! prefix) and a typed operand. Offsets, sizes and branch targets are the host's business;
//! the host hands over an ordered list of these records and takes back a list of the same
//! shape, so nothing here needs byte-level layout.
//!
//! # Key Components
//!
//! - [`crate::assembly::instruction::Instruction`] - One instruction record
//! - [`crate::assembly::instruction::Operand`] - Type-safe operand representation
//! - [`crate::assembly::instruction::Immediate`] - Immediate value types
//! - [`crate::assembly::instruction::FlowType`] - Control flow behavior classification
//!
//! # Usage Examples
//!
//! ```rust
//! use cilpatch::assembly::{Instruction, FlowType};
//! use cilpatch::metadata::token::Token;
//!
//! let call = Instruction::callvirt(Token::member_ref(7));
//! assert!(call.is_virtual_call());
//! assert_eq!(call.flow_type, FlowType::Call);
//! assert_eq!(call.call_target(), Some(Token::member_ref(7)));
//!
//! // Constants use the most compact encoding
//! assert_eq!(Instruction::ldc_i4(4).mnemonic, "ldc.i4.4");
//! assert_eq!(Instruction::ldc_i4(100).mnemonic, "ldc.i4.s");
//! ```

use std::fmt;

use crate::{assembly::opcodes, metadata::token::Token};

/// Represents an immediate value type embedded in CIL instructions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// Signed 8-bit immediate value
    Int8(i8),
    /// Signed 32-bit immediate value
    Int32(i32),
    /// Signed 64-bit immediate value
    Int64(i64),
    /// 32-bit floating point immediate value
    Float32(f32),
    /// 64-bit floating point immediate value
    Float64(f64),
}

impl Immediate {
    /// Integer value of this immediate, if it is an integer that fits in `i32`.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Immediate::Int8(value) => Some(i32::from(*value)),
            Immediate::Int32(value) => Some(*value),
            Immediate::Int64(value) => i32::try_from(*value).ok(),
            Immediate::Float32(_) | Immediate::Float64(_) => None,
        }
    }
}

/// Represents an operand in a structured way.
///
/// # Examples
///
/// ```rust
/// use cilpatch::assembly::{Operand, Immediate};
/// use cilpatch::metadata::token::Token;
///
/// let immediate = Operand::Immediate(Immediate::Int32(42));
/// let method_ref = Operand::Token(Token::member_ref(1));
/// assert_eq!(method_ref.as_token(), Some(Token::member_ref(1)));
/// assert_eq!(immediate.as_token(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// Immediate value (constant embedded in instruction)
    Immediate(Immediate),
    /// Metadata token reference (method, field, type or user string)
    Token(Token),
    /// Local variable index
    Local(u16),
    /// Method argument index
    Argument(u16),
    /// Branch target, as an index into the host's label space
    Label(u32),
}

impl Operand {
    /// Returns the token if this operand references metadata.
    #[must_use]
    pub fn as_token(&self) -> Option<Token> {
        match self {
            Operand::Token(token) => Some(*token),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Immediate(Immediate::Int8(value)) => write!(f, "{value}"),
            Operand::Immediate(Immediate::Int32(value)) => write!(f, "{value}"),
            Operand::Immediate(Immediate::Int64(value)) => write!(f, "{value}"),
            Operand::Immediate(Immediate::Float32(value)) => write!(f, "{value}"),
            Operand::Immediate(Immediate::Float64(value)) => write!(f, "{value}"),
            Operand::Token(token) => write!(f, "{token}"),
            Operand::Local(index) => write!(f, "V_{index}"),
            Operand::Argument(index) => write!(f, "A_{index}"),
            Operand::Label(label) => write!(f, "IL_{label:04X}"),
        }
    }
}

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Normal execution continues to next instruction
    Sequential,
    /// Conditional branch to another location
    ConditionalBranch,
    /// Always branches to another location (unconditional jump)
    UnconditionalBranch,
    /// Call to another method
    Call,
    /// Returns from current method
    Return,
}

/// A single CIL instruction record.
///
/// Fields are public so host adapters can build records straight from their own
/// instruction objects; the associated constructors fill `mnemonic` and `flow_type`
/// from [`crate::assembly::opcodes::describe`].
#[derive(Clone, PartialEq)]
pub struct Instruction {
    /// Primary opcode byte
    pub opcode: u8,
    /// Prefix byte (0 if no prefix)
    pub prefix: u8,
    /// Human-readable instruction mnemonic (e.g. "callvirt", "ldc.i4.4")
    pub mnemonic: &'static str,
    /// How this instruction affects control flow
    pub flow_type: FlowType,
    /// The operand data for this instruction
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction for a single-byte opcode.
    ///
    /// Opcodes missing from the opcode table get the mnemonic `"unknown"` and sequential
    /// flow; they are carried through the rewriter untouched.
    #[must_use]
    pub fn new(opcode: u8, operand: Operand) -> Self {
        Self::with_prefix(0, opcode, operand)
    }

    /// Creates an instruction with an explicit prefix byte.
    #[must_use]
    pub fn with_prefix(prefix: u8, opcode: u8, operand: Operand) -> Self {
        let (mnemonic, flow_type) =
            opcodes::describe(prefix, opcode).unwrap_or(("unknown", FlowType::Sequential));
        Instruction {
            opcode,
            prefix,
            mnemonic,
            flow_type,
            operand,
        }
    }

    /// `callvirt <method>`
    #[must_use]
    pub fn callvirt(method: Token) -> Self {
        Self::new(opcodes::CALLVIRT, Operand::Token(method))
    }

    /// `call <method>`
    #[must_use]
    pub fn call(method: Token) -> Self {
        Self::new(opcodes::CALL, Operand::Token(method))
    }

    /// `ldstr <user string>`
    #[must_use]
    pub fn ldstr(string: Token) -> Self {
        Self::new(opcodes::LDSTR, Operand::Token(string))
    }

    /// `ldarg` using the shortest encoding for `index`.
    #[must_use]
    pub fn ldarg(index: u16) -> Self {
        match index {
            0 => Self::new(opcodes::LDARG_0, Operand::None),
            1 => Self::new(opcodes::LDARG_1, Operand::None),
            2 => Self::new(opcodes::LDARG_2, Operand::None),
            3 => Self::new(opcodes::LDARG_3, Operand::None),
            _ => Self::new(opcodes::LDARG_S, Operand::Argument(index)),
        }
    }

    /// `ret`
    #[must_use]
    pub fn ret() -> Self {
        Self::new(opcodes::RET, Operand::None)
    }

    /// `nop`
    #[must_use]
    pub fn nop() -> Self {
        Self::new(opcodes::NOP, Operand::None)
    }

    /// Push a 32-bit integer constant using the most compact form.
    ///
    /// - `ldc.i4.m1` and `ldc.i4.0` through `ldc.i4.8` for -1..=8 (no operand)
    /// - `ldc.i4.s` for values -128 to 127
    /// - `ldc.i4` for all other values
    #[must_use]
    pub fn ldc_i4(value: i32) -> Self {
        match value {
            -1 => Self::new(opcodes::LDC_I4_M1, Operand::None),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            0..=8 => Self::new(opcodes::LDC_I4_0 + value as u8, Operand::None),
            x if (-128..=127).contains(&x) =>
            {
                #[allow(clippy::cast_possible_truncation)]
                Self::new(
                    opcodes::LDC_I4_S,
                    Operand::Immediate(Immediate::Int8(x as i8)),
                )
            }
            x => Self::new(opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(x))),
        }
    }

    /// Returns `true` for `callvirt`.
    #[must_use]
    pub fn is_virtual_call(&self) -> bool {
        self.prefix == 0 && self.opcode == opcodes::CALLVIRT
    }

    /// Returns `true` for `call` and `callvirt`.
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.prefix == 0 && matches!(self.opcode, opcodes::CALL | opcodes::CALLVIRT)
    }

    /// The method a call instruction invokes, if this is a call with a token operand.
    #[must_use]
    pub fn call_target(&self) -> Option<Token> {
        if self.is_call() {
            self.operand.as_token()
        } else {
            None
        }
    }

    /// The constant an `ldc.i4*` instruction pushes.
    #[must_use]
    pub fn ldc_i4_value(&self) -> Option<i32> {
        if self.prefix != 0 {
            return None;
        }
        match self.opcode {
            opcodes::LDC_I4_M1 => Some(-1),
            op @ opcodes::LDC_I4_0..=opcodes::LDC_I4_8 => Some(i32::from(op - opcodes::LDC_I4_0)),
            opcodes::LDC_I4_S | opcodes::LDC_I4 => match &self.operand {
                Operand::Immediate(imm) => imm.as_i32(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if self.operand != Operand::None {
            write!(f, " {}", self.operand)?;
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
