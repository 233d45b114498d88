//! Configuration for the patch engine.

use crate::{patch::descriptor::PatchCallback, Error, Result};

/// `System.StringComparison.Ordinal` in current hosts.
pub const DEFAULT_ORDINAL_COMPARISON: i32 = 4;

/// Configuration for the patch engine.
///
/// Controls which patches are declared, the owner id used when talking to the host's hook
/// registry, and the host-specific constant pushed by the ordinal rewrite.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Identifies this patch set to the host's hook registry (default: `"cilpatch"`).
    pub owner_id: String,

    /// Install the flying-hostile collision short-circuit (default: true).
    pub enable_collision_prefix: bool,

    /// Install the single-participant local-actor shortcut (default: true).
    pub enable_local_actor_prefix: bool,

    /// Install the ordinal starts-with rewrite (default: true).
    pub enable_ordinal_rewrite: bool,

    /// Value of the host's "ordinal" string comparison mode (default: 4).
    ///
    /// This is the raw enumeration value of the host's comparison-mode type and must
    /// be re-derived if a host version renumbers it.
    pub ordinal_comparison: i32,
}

impl Default for PatchConfig {
    fn default() -> Self {
        PatchConfig {
            owner_id: "cilpatch".to_string(),
            enable_collision_prefix: true,
            enable_local_actor_prefix: true,
            enable_ordinal_rewrite: true,
            ordinal_comparison: DEFAULT_ORDINAL_COMPARISON,
        }
    }
}

impl PatchConfig {
    /// Sets the owner id.
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Enables or disables the collision prefix.
    #[must_use]
    pub fn with_collision_prefix(mut self, enabled: bool) -> Self {
        self.enable_collision_prefix = enabled;
        self
    }

    /// Enables or disables the local-actor prefix.
    #[must_use]
    pub fn with_local_actor_prefix(mut self, enabled: bool) -> Self {
        self.enable_local_actor_prefix = enabled;
        self
    }

    /// Enables or disables the ordinal rewrite.
    #[must_use]
    pub fn with_ordinal_rewrite(mut self, enabled: bool) -> Self {
        self.enable_ordinal_rewrite = enabled;
        self
    }

    /// Overrides the ordinal comparison constant.
    #[must_use]
    pub fn with_ordinal_comparison(mut self, value: i32) -> Self {
        self.ordinal_comparison = value;
        self
    }

    /// Whether the patch using `callback` is part of the declared set.
    #[must_use]
    pub fn is_enabled(&self, callback: PatchCallback) -> bool {
        match callback {
            PatchCallback::CollisionShortCircuit => self.enable_collision_prefix,
            PatchCallback::LocalActorShortcut => self.enable_local_actor_prefix,
            PatchCallback::OrdinalStartsWith => self.enable_ordinal_rewrite,
        }
    }

    /// Checks the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the owner id is blank or every patch is disabled.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::InvalidConfig("owner id must not be empty".into()));
        }
        if !(self.enable_collision_prefix
            || self.enable_local_actor_prefix
            || self.enable_ordinal_rewrite)
        {
            return Err(Error::InvalidConfig("no patches enabled".into()));
        }
        Ok(())
    }
}
