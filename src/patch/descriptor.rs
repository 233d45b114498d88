//! Patch descriptors: what gets installed where.

use std::fmt;

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::metadata::signature::TargetOperation;

/// How a patch attaches to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
pub enum PatchKind {
    /// Runs ahead of the original operation and may suppress it
    Prefix,
    /// Transforms the original operation's instruction sequence once, when the hook is installed
    Rewrite,
}

/// The callback a descriptor installs.
///
/// Each variant names one interceptor in [`crate::patch::Interceptors`]; the host adapter
/// dispatches on it when the hooked operation runs (prefixes) or is compiled (rewrites).
/// The snake-case name doubles as the callback identity for fault deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PatchCallback {
    /// [`crate::patch::Interceptors::collision`]
    CollisionShortCircuit,
    /// [`crate::patch::Interceptors::local_actor`]
    LocalActorShortcut,
    /// [`crate::patch::Interceptors::ordinal_starts_with`]
    OrdinalStartsWith,
}

impl PatchCallback {
    /// The patch kind this callback's contract belongs to.
    #[must_use]
    pub fn kind(&self) -> PatchKind {
        match self {
            PatchCallback::CollisionShortCircuit | PatchCallback::LocalActorShortcut => {
                PatchKind::Prefix
            }
            PatchCallback::OrdinalStartsWith => PatchKind::Rewrite,
        }
    }

    /// Stable identity used in logs and for once-per-callback fault reporting.
    #[must_use]
    pub fn identity(&self) -> &'static str {
        self.into()
    }
}

/// Pairs a host operation with the callback installed on it.
///
/// Descriptors are plain data, built once from the patch catalog and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchDescriptor {
    /// Operation the hook attaches to
    pub target: TargetOperation,
    /// Callback installed on it
    pub callback: PatchCallback,
}

impl PatchDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(target: TargetOperation, callback: PatchCallback) -> Self {
        PatchDescriptor { target, callback }
    }

    /// Patch kind, derived from the callback.
    #[must_use]
    pub fn kind(&self) -> PatchKind {
        self.callback.kind()
    }

    /// Callback identity.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.callback.identity()
    }
}

impl fmt::Display for PatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.name(), self.kind(), self.target)
    }
}

/// Result of a prefix interceptor.
///
/// Hosts typically model this as a boolean "continue with original" flag; see
/// [`PrefixOutcome::run_original`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOutcome {
    /// Let the original operation run; outputs were not touched
    RunOriginal,
    /// Skip the original operation; the prefix wrote the result
    SkipOriginal,
}

impl PrefixOutcome {
    /// The host-level boolean: `true` means "continue with the original operation".
    #[must_use]
    pub fn run_original(&self) -> bool {
        matches!(self, PrefixOutcome::RunOriginal)
    }

    /// Returns `true` for [`PrefixOutcome::SkipOriginal`].
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, PrefixOutcome::SkipOriginal)
    }
}
