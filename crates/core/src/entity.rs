//! Entity trait: identity + continuity across state changes.

use crate::id::RecordId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: RecordId;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
