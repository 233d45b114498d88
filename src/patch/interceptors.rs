//! Guarded entry points the host adapter calls when a hooked operation runs.
//!
//! Each method wraps one callback from [`crate::patch::prefix`] or [`crate::patch::rewrite`]
//! in the shared [`FaultGuard`], keyed by the callback's identity. These are the only
//! functions a host adapter should invoke; the unguarded functions exist for composition
//! and testing.

use crate::{
    assembly::InstructionSequence,
    patch::{
        config::PatchConfig,
        descriptor::{PatchCallback, PrefixOutcome},
        guard::{FaultGuard, FaultLog},
        host::{Classify, HostIntrospection, Session},
        prefix,
        rewrite::{self, CallSiteRewrite},
    },
};

/// Fault-contained interceptor callbacks.
///
/// Shared between the [`crate::patch::PatchController`] and the host adapter, typically
/// behind an `Arc`.
#[derive(Debug)]
pub struct Interceptors {
    guard: FaultGuard,
    ordinal_comparison: i32,
}

impl Default for Interceptors {
    fn default() -> Self {
        Self::new(&PatchConfig::default())
    }
}

impl Interceptors {
    /// Creates the interceptors for `config`.
    #[must_use]
    pub fn new(config: &PatchConfig) -> Self {
        Interceptors {
            guard: FaultGuard::new(),
            ordinal_comparison: config.ordinal_comparison,
        }
    }

    /// Contained failures so far.
    #[must_use]
    pub fn faults(&self) -> &FaultLog {
        self.guard.faults()
    }

    /// Prefix for `GameLocation.isCollidingPosition`.
    ///
    /// `flight` is the operation's glider argument and `entity` the moving character;
    /// `result` is the operation's return slot.
    pub fn collision<E>(&self, flight: bool, entity: &E, result: &mut bool) -> PrefixOutcome
    where
        E: Classify + ?Sized,
    {
        self.guard.run_prefix(
            PatchCallback::CollisionShortCircuit.identity(),
            result,
            |slot| prefix::collision_short_circuit(flight, entity, slot),
        )
    }

    /// Prefix for `Monster.findPlayer`.
    pub fn local_actor<S>(&self, session: &S, result: &mut Option<S::Actor>) -> PrefixOutcome
    where
        S: Session + ?Sized,
    {
        self.guard.run_prefix(
            PatchCallback::LocalActorShortcut.identity(),
            result,
            |slot| prefix::local_actor_shortcut(session, slot),
        )
    }

    /// Rewrite for `GameLocation.isTemp`.
    ///
    /// Resolves both `StartsWith` overloads through `host` and retargets every culture-sensitive
    /// call-site. Returns `body` unchanged if anything goes wrong.
    pub fn ordinal_starts_with<H>(&self, host: &H, body: &InstructionSequence) -> InstructionSequence
    where
        H: HostIntrospection + ?Sized,
    {
        self.guard
            .run_rewrite(PatchCallback::OrdinalStartsWith.identity(), body, |input| {
                let rule = CallSiteRewrite::ordinal_starts_with(host, self.ordinal_comparison)?;
                Ok(rewrite::rewrite(&rule, input)?.sequence)
            })
    }
}
