//! Capabilities the host program provides to the patch engine.
//!
//! The engine never reaches into the host directly. Everything it needs is expressed as one
//! of the traits below and injected by the embedding adapter:
//!
//! - [`HostIntrospection`] - operation lookup by declaring type, name and signature
//! - [`HookRegistry`] - hook installation and removal
//! - [`Session`] - ambient session mode and local actor queries
//! - [`Classify`] - per-entity classification

use bitflags::bitflags;

use crate::{
    metadata::{signature::TargetOperation, token::Token},
    patch::descriptor::{PatchDescriptor, PatchKind},
    Result,
};

/// A resolved host operation.
///
/// Obtained from [`HostIntrospection::resolve`]; only meaningful to the host that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationHandle(pub Token);

impl OperationHandle {
    /// The token the host uses for this operation, which is also what call instructions
    /// reference as their operand.
    #[must_use]
    pub fn token(&self) -> Token {
        self.0
    }
}

/// Operation lookup.
pub trait HostIntrospection {
    /// Resolves `target` to a handle, or `None` if the host has no such operation.
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle>;
}

/// Hook installation and removal.
///
/// `owner` identifies the patch set to the host, so that removal only touches hooks this
/// engine installed even if other parties patched the same operation.
pub trait HookRegistry {
    /// Installs `patch` on the operation behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the hook.
    fn install(&mut self, handle: OperationHandle, patch: &PatchDescriptor, owner: &str)
        -> Result<()>;

    /// Removes the hook of `kind` previously installed by `owner` on `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to remove the hook.
    fn uninstall(&mut self, handle: OperationHandle, kind: PatchKind, owner: &str) -> Result<()>;
}

impl<T: HostIntrospection + ?Sized> HostIntrospection for &T {
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle> {
        (**self).resolve(target)
    }
}

impl<T: HostIntrospection + ?Sized> HostIntrospection for &mut T {
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle> {
        (**self).resolve(target)
    }
}

impl<T: HookRegistry + ?Sized> HookRegistry for &mut T {
    fn install(
        &mut self,
        handle: OperationHandle,
        patch: &PatchDescriptor,
        owner: &str,
    ) -> Result<()> {
        (**self).install(handle, patch, owner)
    }

    fn uninstall(&mut self, handle: OperationHandle, kind: PatchKind, owner: &str) -> Result<()> {
        (**self).uninstall(handle, kind, owner)
    }
}

/// Ambient session state.
pub trait Session {
    /// Handle to a participant controlled by a player.
    type Actor: Clone;

    /// Returns `true` when more than one participant is connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot answer right now.
    fn is_multiplayer(&self) -> Result<bool>;

    /// The participant controlled on this machine.
    ///
    /// # Errors
    ///
    /// Returns an error if no local actor is available.
    fn local_actor(&self) -> Result<Self::Actor>;
}

bitflags! {
    /// Classification traits of a host entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityTraits: u32 {
        /// Entity belongs to the hostile creature category
        const HOSTILE = 0x0001;
        /// Entity moves through the air
        const FLYING = 0x0002;
    }
}

impl EntityTraits {
    /// Hostile creature category.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.contains(EntityTraits::HOSTILE)
    }

    /// Flight capability.
    #[must_use]
    pub fn can_fly(&self) -> bool {
        self.contains(EntityTraits::FLYING)
    }
}

/// Per-entity classification.
pub trait Classify {
    /// Classification traits of this entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity can no longer be inspected.
    fn traits(&self) -> Result<EntityTraits>;
}
