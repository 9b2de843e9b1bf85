//! Typed pick-target resolution from raw decoded IDs.

use super::id::ObjectId;

/// A typed pick target resolved from a raw hidden-target pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PickTarget {
    /// Background or nothing drawn at that point.
    #[default]
    None,
    /// A caller-identified object.
    Object(ObjectId),
}

impl PickTarget {
    /// Resolve a raw decoded ID. `0` (black) means no hit; every other
    /// 24-bit value is the ID of whatever was drawn there.
    #[must_use]
    pub fn resolve(raw_id: u32) -> Self {
        ObjectId::new(raw_id).map_or(Self::None, Self::Object)
    }

    /// The raw integer, `0` for [`PickTarget::None`].
    #[must_use]
    pub fn raw(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Object(id) => id.get(),
        }
    }

    /// The object, if any.
    #[must_use]
    pub fn object(self) -> Option<ObjectId> {
        match self {
            Self::None => None,
            Self::Object(id) => Some(id),
        }
    }

    /// Returns `true` if this target is `None`.
    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if this target is the given object.
    #[must_use]
    pub fn is(self, id: ObjectId) -> bool {
        self == Self::Object(id)
    }
}

impl From<ObjectId> for PickTarget {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_resolves_to_none() {
        assert!(PickTarget::resolve(0).is_none());
        assert_eq!(PickTarget::resolve(0).raw(), 0);
    }

    #[test]
    fn nonzero_resolves_to_object() {
        let target = PickTarget::resolve(104);
        let sphere = ObjectId::new(104).unwrap();
        assert!(target.is(sphere));
        assert_eq!(target.object(), Some(sphere));
        assert_eq!(target.raw(), 104);
    }
}
