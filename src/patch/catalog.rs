//! The declared patch set and the host operations it depends on.
//!
//! Every host operation the engine touches is listed here as a constant
//! [`TargetOperation`]. Resolution happens eagerly, at apply time, so a host version that
//! lacks any of them is rejected before a single hook is installed.

use crate::{
    metadata::signature::{ParamSignature, TargetOperation},
    patch::{
        config::PatchConfig,
        descriptor::{PatchCallback, PatchDescriptor},
    },
};

/// `GameLocation.isCollidingPosition`, the nine-argument overload used for character movement.
///
/// Argument 2 is the `glider` flag, argument 5 the moving `Character`.
pub const IS_COLLIDING_POSITION: TargetOperation = TargetOperation::new(
    "StardewValley.GameLocation",
    "isCollidingPosition",
    ParamSignature::new(&[
        "Microsoft.Xna.Framework.Rectangle",
        "xTile.Dimensions.Rectangle",
        "System.Boolean",
        "System.Int32",
        "System.Boolean",
        "StardewValley.Character",
        "System.Boolean",
        "System.Boolean",
        "System.Boolean",
    ]),
);

/// `GameLocation.isTemp()`, whose body is rewritten to use ordinal prefix checks.
pub const IS_TEMP: TargetOperation =
    TargetOperation::new("StardewValley.GameLocation", "isTemp", ParamSignature::empty());

/// `Monster.findPlayer()`.
pub const FIND_PLAYER: TargetOperation = TargetOperation::new(
    "StardewValley.Monsters.Monster",
    "findPlayer",
    ParamSignature::empty(),
);

/// `String.StartsWith(String)`: culture-sensitive, the call-site being replaced.
pub const STARTS_WITH: TargetOperation = TargetOperation::new(
    "System.String",
    "StartsWith",
    ParamSignature::new(&["System.String"]),
);

/// `String.StartsWith(String, StringComparison)`: the replacement overload.
pub const STARTS_WITH_COMPARISON: TargetOperation = TargetOperation::new(
    "System.String",
    "StartsWith",
    ParamSignature::new(&["System.String", "System.StringComparison"]),
);

/// All patches this crate knows how to install, in apply order.
pub const CATALOG: [PatchDescriptor; 3] = [
    PatchDescriptor::new(IS_COLLIDING_POSITION, PatchCallback::CollisionShortCircuit),
    PatchDescriptor::new(IS_TEMP, PatchCallback::OrdinalStartsWith),
    PatchDescriptor::new(FIND_PLAYER, PatchCallback::LocalActorShortcut),
];

/// The subset of [`CATALOG`] enabled by `config`, in catalog order.
#[must_use]
pub fn declared(config: &PatchConfig) -> Vec<PatchDescriptor> {
    CATALOG
        .iter()
        .filter(|desc| config.is_enabled(desc.callback))
        .copied()
        .collect()
}
