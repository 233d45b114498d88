//! Installation and removal of the declared patch set.
//!
//! [`PatchController`] owns the applied-patch state. The set of installed patches is either
//! empty or exactly the declared set: [`PatchController::apply_all`] resolves every target
//! before installing anything and rolls back its own installs if the host rejects one, and
//! [`PatchController::remove_all`] always leaves the set empty.
//!
//! A hook the host refuses to remove is still live in the host. The controller keeps it as
//! stranded, and the next [`PatchController::apply_all`] adopts it instead of installing the
//! same patch a second time.
//!
//! Apply and remove are meant for the host's control thread at load and unload; the
//! controller takes `&mut self` and does no locking of its own.
//!
//! # Example
//!
//! ```rust,ignore
//! use cilpatch::patch::{PatchConfig, PatchController};
//!
//! let mut controller = PatchController::new(host, PatchConfig::default())?;
//! controller.apply_all()?;   // fatal error here means an incompatible host version
//! controller.apply_all()?;   // no-op
//! // ... host runs, adapter dispatches to controller.interceptors() ...
//! controller.remove_all()?;
//! ```

use std::sync::Arc;

use crate::{
    assembly::InstructionSequence,
    patch::{
        catalog,
        config::PatchConfig,
        descriptor::{PatchCallback, PatchDescriptor, PatchKind},
        host::{HookRegistry, HostIntrospection, OperationHandle},
        interceptors::Interceptors,
    },
    Error, Result,
};

/// A declared patch together with the handle it was installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedPatch {
    /// What was installed
    pub descriptor: PatchDescriptor,
    /// Where it was installed
    pub handle: OperationHandle,
}

/// Owns the applied-patch set and talks to the host's hook facilities.
pub struct PatchController<H> {
    host: H,
    config: PatchConfig,
    declared: Vec<PatchDescriptor>,
    applied: Vec<AppliedPatch>,
    stranded: Vec<AppliedPatch>,
    interceptors: Arc<Interceptors>,
}

impl<H> PatchController<H>
where
    H: HostIntrospection + HookRegistry,
{
    /// Creates a controller with nothing applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(host: H, config: PatchConfig) -> Result<Self> {
        let interceptors = Arc::new(Interceptors::new(&config));
        Self::with_interceptors(host, config, interceptors)
    }

    /// Creates a controller sharing an existing set of interceptors, for host adapters that
    /// need the interceptors before the controller exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn with_interceptors(
        host: H,
        config: PatchConfig,
        interceptors: Arc<Interceptors>,
    ) -> Result<Self> {
        config.validate()?;
        let declared = catalog::declared(&config);

        Ok(PatchController {
            host,
            config,
            declared,
            applied: Vec::new(),
            stranded: Vec::new(),
            interceptors,
        })
    }

    /// Installs every declared patch. Does nothing if they are already installed.
    ///
    /// All targets are resolved before the first hook is installed. Stranded hooks from an
    /// earlier failed removal are adopted rather than installed again. If the host rejects a
    /// hook, the hooks held by this call are removed again and the set stays empty.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetNotFound`] if the host lacks a declared target
    /// - [`Error::HookInstall`] if the host rejects a hook
    pub fn apply_all(&mut self) -> Result<()> {
        if self.is_applied() {
            log::debug!("Patches already applied for \"{}\"", self.config.owner_id);
            return Ok(());
        }

        let resolved = self
            .declared
            .iter()
            .map(|descriptor| {
                self.host
                    .resolve(&descriptor.target)
                    .map(|handle| AppliedPatch {
                        descriptor: *descriptor,
                        handle,
                    })
                    .ok_or(Error::TargetNotFound(descriptor.target))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut installed = Vec::with_capacity(resolved.len());
        for patch in resolved {
            if let Some(index) = self.stranded.iter().position(|s| *s == patch) {
                log::trace!(
                    "Adopting stranded patch \"{}\" on \"{}\"",
                    patch.descriptor.name(),
                    patch.descriptor.target
                );
                installed.push(self.stranded.swap_remove(index));
                continue;
            }

            log::trace!(
                "Applying patch \"{}\": {} on \"{}\"",
                patch.descriptor.name(),
                verb(patch.descriptor.kind()),
                patch.descriptor.target
            );

            if let Err(error) =
                self.host
                    .install(patch.handle, &patch.descriptor, &self.config.owner_id)
            {
                self.rollback(&installed);
                return Err(Error::HookInstall {
                    target: patch.descriptor.target,
                    reason: error.to_string(),
                });
            }
            installed.push(patch);
        }

        self.applied = installed;
        Ok(())
    }

    /// Removes every installed patch. Does nothing if none are installed.
    ///
    /// Removal continues past failures so that as many hooks as possible are taken down;
    /// the set is empty afterwards either way. Hooks the host refused to remove are kept in
    /// [`PatchController::stranded`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::HookRemove`] for the first hook the host failed to remove.
    pub fn remove_all(&mut self) -> Result<()> {
        if !self.is_applied() {
            log::debug!("No patches applied for \"{}\"", self.config.owner_id);
            return Ok(());
        }

        let mut first_error = None;
        for patch in std::mem::take(&mut self.applied) {
            log::trace!(
                "Removing patch \"{}\": {} on \"{}\"",
                patch.descriptor.name(),
                patch.descriptor.kind(),
                patch.descriptor.target
            );

            if let Err(error) =
                self.host
                    .uninstall(patch.handle, patch.descriptor.kind(), &self.config.owner_id)
            {
                log::warn!(
                    "Failed to remove patch \"{}\": {}",
                    patch.descriptor.name(),
                    error
                );
                first_error.get_or_insert(Error::HookRemove {
                    target: patch.descriptor.target,
                    reason: error.to_string(),
                });
                self.stranded.push(patch);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Runs the rewrite callback `callback` on `body`, resolving operands through this
    /// controller's host.
    ///
    /// Prefix callbacks have no rewrite contract; for them `body` is returned unchanged.
    #[must_use]
    pub fn rewrite(&self, callback: PatchCallback, body: &InstructionSequence) -> InstructionSequence {
        match callback {
            PatchCallback::OrdinalStartsWith => {
                self.interceptors.ordinal_starts_with(&self.host, body)
            }
            PatchCallback::CollisionShortCircuit | PatchCallback::LocalActorShortcut => {
                body.clone()
            }
        }
    }

    fn rollback(&mut self, installed: &[AppliedPatch]) {
        for patch in installed.iter().rev() {
            if let Err(error) =
                self.host
                    .uninstall(patch.handle, patch.descriptor.kind(), &self.config.owner_id)
            {
                log::warn!(
                    "Rollback of patch \"{}\" failed: {}",
                    patch.descriptor.name(),
                    error
                );
                self.stranded.push(*patch);
            }
        }
    }
}

impl<H> PatchController<H> {
    /// Returns `true` if the declared set is installed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !self.applied.is_empty()
    }

    /// The patches currently installed, in install order.
    #[must_use]
    pub fn applied(&self) -> &[AppliedPatch] {
        &self.applied
    }

    /// Hooks the host refused to remove. They are still live in the host.
    #[must_use]
    pub fn stranded(&self) -> &[AppliedPatch] {
        &self.stranded
    }

    /// The patches this controller installs on [`PatchController::apply_all`].
    #[must_use]
    pub fn declared(&self) -> &[PatchDescriptor] {
        &self.declared
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// The interceptors the host adapter dispatches to.
    #[must_use]
    pub fn interceptors(&self) -> &Arc<Interceptors> {
        &self.interceptors
    }

    /// The host capabilities.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Consumes the controller, returning the host. Installed hooks stay installed.
    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }
}

fn verb(kind: PatchKind) -> &'static str {
    match kind {
        PatchKind::Prefix => "prefixing",
        PatchKind::Rewrite => "rewriting",
    }
}
