//! Prefix interceptor logic.
//!
//! Both functions follow the prefix contract: they either write the operation's result
//! through the output slot and return [`PrefixOutcome::SkipOriginal`], or leave the slot
//! alone and return [`PrefixOutcome::RunOriginal`]. They are plain functions over the host
//! capability traits; fault containment is applied by [`crate::patch::Interceptors`].

use crate::{
    patch::{
        descriptor::PrefixOutcome,
        host::{Classify, Session},
    },
    Result,
};

/// Collision check short-circuit for flying hostile creatures.
///
/// The host never resolves collision geometry for airborne hostile creatures, so when the
/// mover is flying (`flight`) and `entity` is hostile the answer is always "no collision".
///
/// # Errors
///
/// Propagates classification failures from the host.
pub fn collision_short_circuit<E>(flight: bool, entity: &E, result: &mut bool) -> Result<PrefixOutcome>
where
    E: Classify + ?Sized,
{
    if flight && entity.traits()?.is_hostile() {
        *result = false;
        return Ok(PrefixOutcome::SkipOriginal);
    }
    Ok(PrefixOutcome::RunOriginal)
}

/// Controlling-actor search shortcut.
///
/// With a single participant there is exactly one actor a creature can be looking for, so
/// the per-entity search is replaced by the session's local actor.
///
/// # Errors
///
/// Propagates session query failures from the host.
pub fn local_actor_shortcut<S>(session: &S, result: &mut Option<S::Actor>) -> Result<PrefixOutcome>
where
    S: Session + ?Sized,
{
    if session.is_multiplayer()? {
        return Ok(PrefixOutcome::RunOriginal);
    }
    *result = Some(session.local_actor()?);
    Ok(PrefixOutcome::SkipOriginal)
}
