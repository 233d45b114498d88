//! # cilpatch Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilpatch library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilpatch operations
pub use crate::Error;

/// The result type used throughout cilpatch
pub use crate::Result;

// ================================================================================================
// Instruction Model
// ================================================================================================

/// Metadata token type for referencing operations
pub use crate::metadata::token::Token;

/// Host operation identities
pub use crate::metadata::signature::{ParamSignature, TargetOperation};

/// Instructions and operation bodies
pub use crate::assembly::{
    FlowType, Immediate, Instruction, InstructionSequence, Operand, SequenceBuilder,
};

// ================================================================================================
// Patch Engine
// ================================================================================================

/// Controller and configuration
pub use crate::patch::{AppliedPatch, PatchConfig, PatchController};

/// Descriptors and the prefix contract
pub use crate::patch::{PatchCallback, PatchDescriptor, PatchKind, PrefixOutcome};

/// Host capability traits
pub use crate::patch::{
    Classify, EntityTraits, HookRegistry, HostIntrospection, OperationHandle, Session,
};

/// Runtime entry points and fault containment
pub use crate::patch::{FaultGuard, FaultLog, Interceptors};

/// Peephole rewriting
pub use crate::patch::{CallSiteRewrite, PeepholeRule, Rewritten};
