//! CIL opcode byte constants (ECMA-335) used by the patch engine.
//!
//! Single-byte opcodes are named after their mnemonic (e.g. [`CALLVIRT`] = `0x6F`).
//! Two-byte opcodes share the [`FE_PREFIX`] first byte and store their second byte with
//! an `FE_` prefix. Only the opcodes the engine emits or inspects are listed; anything else
//! passes through the rewriter as an opaque byte.
#![allow(missing_docs)]

use crate::assembly::instruction::FlowType;

// Misc
pub const NOP: u8 = 0x00;

// Load argument / local shorthand
pub const LDARG_0: u8 = 0x02;
pub const LDARG_1: u8 = 0x03;
pub const LDARG_2: u8 = 0x04;
pub const LDARG_3: u8 = 0x05;
pub const LDLOC_0: u8 = 0x06;
pub const LDLOC_1: u8 = 0x07;
pub const STLOC_0: u8 = 0x0A;
pub const STLOC_1: u8 = 0x0B;
pub const LDARG_S: u8 = 0x0E;

// Null / constant loaders
pub const LDNULL: u8 = 0x14;
pub const LDC_I4_M1: u8 = 0x15;
pub const LDC_I4_0: u8 = 0x16;
pub const LDC_I4_1: u8 = 0x17;
pub const LDC_I4_2: u8 = 0x18;
pub const LDC_I4_3: u8 = 0x19;
pub const LDC_I4_4: u8 = 0x1A;
pub const LDC_I4_5: u8 = 0x1B;
pub const LDC_I4_6: u8 = 0x1C;
pub const LDC_I4_7: u8 = 0x1D;
pub const LDC_I4_8: u8 = 0x1E;
pub const LDC_I4_S: u8 = 0x1F;
pub const LDC_I4: u8 = 0x20;

// Stack manipulation
pub const DUP: u8 = 0x25;
pub const POP: u8 = 0x26;

// Call / return
pub const CALL: u8 = 0x28;
pub const RET: u8 = 0x2A;

// Branches
pub const BR_S: u8 = 0x2B;
pub const BRFALSE_S: u8 = 0x2C;
pub const BRTRUE_S: u8 = 0x2D;
pub const BR: u8 = 0x38;
pub const BRFALSE: u8 = 0x39;
pub const BRTRUE: u8 = 0x3A;

// Object model
pub const CALLVIRT: u8 = 0x6F;
pub const LDSTR: u8 = 0x72;
pub const NEWOBJ: u8 = 0x73;
pub const LDFLD: u8 = 0x7B;

// Two-byte opcodes
pub const FE_PREFIX: u8 = 0xFE;
pub const FE_CEQ: u8 = 0x01;
pub const FE_LDFTN: u8 = 0x06;

/// Mnemonic and control-flow class of a known opcode.
///
/// Returns `None` for opcodes outside the table above.
#[must_use]
pub fn describe(prefix: u8, opcode: u8) -> Option<(&'static str, FlowType)> {
    if prefix == FE_PREFIX {
        return match opcode {
            FE_CEQ => Some(("ceq", FlowType::Sequential)),
            FE_LDFTN => Some(("ldftn", FlowType::Sequential)),
            _ => None,
        };
    }
    if prefix != 0 {
        return None;
    }

    let described = match opcode {
        NOP => ("nop", FlowType::Sequential),
        LDARG_0 => ("ldarg.0", FlowType::Sequential),
        LDARG_1 => ("ldarg.1", FlowType::Sequential),
        LDARG_2 => ("ldarg.2", FlowType::Sequential),
        LDARG_3 => ("ldarg.3", FlowType::Sequential),
        LDLOC_0 => ("ldloc.0", FlowType::Sequential),
        LDLOC_1 => ("ldloc.1", FlowType::Sequential),
        STLOC_0 => ("stloc.0", FlowType::Sequential),
        STLOC_1 => ("stloc.1", FlowType::Sequential),
        LDARG_S => ("ldarg.s", FlowType::Sequential),
        LDNULL => ("ldnull", FlowType::Sequential),
        LDC_I4_M1 => ("ldc.i4.m1", FlowType::Sequential),
        LDC_I4_0 => ("ldc.i4.0", FlowType::Sequential),
        LDC_I4_1 => ("ldc.i4.1", FlowType::Sequential),
        LDC_I4_2 => ("ldc.i4.2", FlowType::Sequential),
        LDC_I4_3 => ("ldc.i4.3", FlowType::Sequential),
        LDC_I4_4 => ("ldc.i4.4", FlowType::Sequential),
        LDC_I4_5 => ("ldc.i4.5", FlowType::Sequential),
        LDC_I4_6 => ("ldc.i4.6", FlowType::Sequential),
        LDC_I4_7 => ("ldc.i4.7", FlowType::Sequential),
        LDC_I4_8 => ("ldc.i4.8", FlowType::Sequential),
        LDC_I4_S => ("ldc.i4.s", FlowType::Sequential),
        LDC_I4 => ("ldc.i4", FlowType::Sequential),
        DUP => ("dup", FlowType::Sequential),
        POP => ("pop", FlowType::Sequential),
        CALL => ("call", FlowType::Call),
        RET => ("ret", FlowType::Return),
        BR_S => ("br.s", FlowType::UnconditionalBranch),
        BRFALSE_S => ("brfalse.s", FlowType::ConditionalBranch),
        BRTRUE_S => ("brtrue.s", FlowType::ConditionalBranch),
        BR => ("br", FlowType::UnconditionalBranch),
        BRFALSE => ("brfalse", FlowType::ConditionalBranch),
        BRTRUE => ("brtrue", FlowType::ConditionalBranch),
        CALLVIRT => ("callvirt", FlowType::Call),
        LDSTR => ("ldstr", FlowType::Sequential),
        NEWOBJ => ("newobj", FlowType::Call),
        LDFLD => ("ldfld", FlowType::Sequential),
        _ => return None,
    };
    Some(described)
}
