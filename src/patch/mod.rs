//! The patch engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  PatchController            owns the applied-patch set           │
//! │    ├─ catalog               declared targets + callbacks         │
//! │    ├─ HostIntrospection     resolve targets (fail fast)          │
//! │    └─ HookRegistry          install / uninstall hooks            │
//! │                                                                  │
//! │  Interceptors               what the host calls at runtime       │
//! │    ├─ collision             prefix, flying hostile short-circuit │
//! │    ├─ local_actor           prefix, single-participant shortcut  │
//! │    └─ ordinal_starts_with   rewrite, StartsWith call-sites       │
//! │         └─ FaultGuard       fail-open, logs once per callback    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`host`] - Traits the embedding host implements
//! - [`descriptor`] - Patch kinds, callbacks and descriptors
//! - [`catalog`] - The declared patch set
//! - [`config`] - Engine configuration
//! - [`prefix`] - Prefix interceptor logic
//! - [`rewrite`] - Peephole rewriting
//! - [`guard`] - Fault containment
//! - [`interceptors`] - Guarded callback entry points
//! - [`controller`] - Apply/remove of the declared set

pub mod catalog;
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod guard;
pub mod host;
pub mod interceptors;
pub mod prefix;
pub mod rewrite;

pub use config::PatchConfig;
pub use controller::{AppliedPatch, PatchController};
pub use descriptor::{PatchCallback, PatchDescriptor, PatchKind, PrefixOutcome};
pub use guard::{FaultEvent, FaultGuard, FaultLog};
pub use host::{Classify, EntityTraits, HookRegistry, HostIntrospection, OperationHandle, Session};
pub use interceptors::Interceptors;
pub use rewrite::{CallSiteRewrite, PeepholeRule, Rewritten};
