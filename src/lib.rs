// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cilpatch
//!
//! A runtime patch engine for programs built on CIL. `cilpatch` changes the behavior of a
//! handful of operations inside a running host without touching the host's binaries: it
//! installs hooks that short-circuit redundant work, and it rewrites one operation's
//! instruction sequence to call a faster overload.
//!
//! ## Features
//!
//! - **Idempotent patch control** - Apply and remove the declared patch set as a unit; the
//!   host only ever sees none or all of it
//! - **Prefix interceptors** - Skip the original operation and supply the result directly
//! - **Peephole rewriting** - Single-pass call-site substitution over instruction sequences
//! - **Fail-open by construction** - Errors and panics inside patch logic fall back to the
//!   host's own behavior and are logged once per callback
//! - **Host-agnostic** - Every host facility is a trait, so the engine can be driven by a
//!   real runtime bridge or by a mock in tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cilpatch::prelude::*;
//!
//! // `bridge` implements HostIntrospection + HookRegistry for the running host
//! let mut controller = PatchController::new(bridge, PatchConfig::default())?;
//! controller.apply_all()?;
//!
//! // Inside the bridge, when the hooked collision check runs:
//! let outcome = interceptors.collision(glider, &character, &mut result);
//! if !outcome.run_original() {
//!     return result;
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Tokens and operation identities
//! - [`assembly`] - Instruction model and sequences
//! - [`patch`] - Controller, interceptors, rewriter and fault containment
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Setup failures (a missing host operation, a rejected hook) are returned as [`Error`] from
//! [`patch::PatchController::apply_all`] and mean the host version is not supported. Failures
//! inside interceptors never surface; see [`patch::FaultGuard`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: apply/remove steps at `trace`, no-op
//! transitions and rewrite statistics at `debug`, contained faults at `error`.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench rewrite
//! cargo +nightly fuzz run rewrite --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilpatch::prelude::*;
///
/// let config = PatchConfig::default().with_ordinal_comparison(4);
/// assert!(config.validate().is_ok());
/// ```
pub mod prelude;

/// Instruction model: opcodes, instructions and instruction sequences.
///
/// # Key Types
///
/// - [`assembly::Instruction`] - One instruction record
/// - [`assembly::Operand`] - Instruction operands (immediates, tokens, labels)
/// - [`assembly::InstructionSequence`] - An operation body
/// - [`assembly::SequenceBuilder`] - Fluent body construction
pub mod assembly;

/// Metadata tokens and host operation identities.
pub mod metadata;

/// The patch engine.
///
/// See [`patch::PatchController`] for installation and [`patch::Interceptors`] for the
/// callbacks a host adapter dispatches to.
pub mod patch;

/// `cilpatch` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilpatch` Error type
///
/// Errors come in two tiers: setup failures returned to the caller, and runtime faults that
/// are contained and logged.
pub use error::Error;
