//! Host operation identities.
//!
//! A [`TargetOperation`] names one host operation the way the host's own introspection
//! does: by declaring type, operation name and the ordered parameter types. Identities are
//! plain `'static` data so that the full patch catalog can be written as a constant table
//! and resolved eagerly against the host.

use std::fmt;

/// Ordered parameter type names of an operation.
///
/// Overloads differ only in their parameter list, so the signature is part of an
/// operation's identity. An empty signature selects the parameterless overload; it does not
/// mean "any overload".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamSignature(&'static [&'static str]);

impl ParamSignature {
    /// Creates a signature from fully-qualified parameter type names.
    #[must_use]
    pub const fn new(params: &'static [&'static str]) -> Self {
        ParamSignature(params)
    }

    /// The parameterless signature.
    #[must_use]
    pub const fn empty() -> Self {
        ParamSignature(&[])
    }

    /// Parameter type names, in declaration order.
    #[must_use]
    pub const fn params(&self) -> &'static [&'static str] {
        self.0
    }

    /// Number of declared parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the parameterless signature.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParamSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, param) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        f.write_str(")")
    }
}

/// Identifies one host-exposed operation.
///
/// # Examples
///
/// ```rust
/// use cilpatch::metadata::signature::{ParamSignature, TargetOperation};
///
/// const FIND_PLAYER: TargetOperation =
///     TargetOperation::new("StardewValley.Monsters.Monster", "findPlayer", ParamSignature::empty());
///
/// assert_eq!(FIND_PLAYER.to_string(), "StardewValley.Monsters.Monster::findPlayer()");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetOperation {
    /// Fully-qualified name of the declaring type
    pub declaring_type: &'static str,
    /// Operation name as the host spells it
    pub name: &'static str,
    /// Parameter types selecting the overload
    pub signature: ParamSignature,
}

impl TargetOperation {
    /// Creates a new operation identity.
    #[must_use]
    pub const fn new(
        declaring_type: &'static str,
        name: &'static str,
        signature: ParamSignature,
    ) -> Self {
        TargetOperation {
            declaring_type,
            name,
            signature,
        }
    }

    /// Short declaring type name, without namespace.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.declaring_type
            .rsplit('.')
            .next()
            .unwrap_or(self.declaring_type)
    }
}

impl fmt::Display for TargetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.declaring_type, self.name, self.signature)
    }
}
