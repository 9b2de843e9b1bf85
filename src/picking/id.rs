//! Object IDs and their 24-bit RGB encoding.
//!
//! An ID is split across the red, green and blue channels of the flat fill
//! used on the hidden target (`r = bits 16..24`, `g = bits 8..16`,
//! `b = bits 0..8`). Alpha is always opaque and ignored on decode.

use std::fmt;

use crate::canvas::Color;
use crate::error::PickError;

/// Largest ID representable in a 24-bit RGB color.
pub const MAX_OBJECT_ID: u32 = 0x00FF_FFFF;

/// Caller-assigned identifier for one logical object.
///
/// Several primitives may share an ID; picking any of them reports the
/// same value. Always in `1..=MAX_OBJECT_ID`; zero means "no object" and is
/// never a valid `ObjectId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Validate a raw ID.
    ///
    /// # Errors
    ///
    /// [`PickError::ReservedId`] for 0, [`PickError::IdOutOfRange`] for
    /// anything that does not fit in 24 bits.
    pub fn new(raw: u32) -> Result<Self, PickError> {
        match raw {
            0 => Err(PickError::ReservedId),
            id if id > MAX_OBJECT_ID => Err(PickError::IdOutOfRange(id)),
            id => Ok(Self(id)),
        }
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Flat fill color that encodes this ID.
    #[must_use]
    pub fn to_color(self) -> Color {
        let [r, g, b] = encode(self.0);
        Color::rgb(r, g, b)
    }

    /// Recover an ID from a fill color, `None` for black (empty space).
    #[must_use]
    pub fn from_color(color: Color) -> Option<Self> {
        match decode([color.r, color.g, color.b]) {
            0 => None,
            id => Some(Self(id)),
        }
    }
}

impl TryFrom<u32> for ObjectId {
    type Error = PickError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Split the low 24 bits of `id` into RGB channels.
#[must_use]
pub const fn encode(id: u32) -> [u8; 3] {
    [
        ((id >> 16) & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        (id & 0xFF) as u8,
    ]
}

/// Recombine RGB channels into a 24-bit ID.
#[must_use]
pub const fn decode(rgb: [u8; 3]) -> u32 {
    (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_valid_id_round_trips() {
        for raw in 1..=MAX_OBJECT_ID {
            assert_eq!(decode(encode(raw)), raw, "id {raw}");
        }
    }

    #[test]
    fn green_channel_keeps_all_eight_bits() {
        assert_eq!(encode(0xAB00), [0x00, 0xAB, 0x00]);
        assert_eq!(encode(0x0012_3456), [0x12, 0x34, 0x56]);
        // 0x100 and 0x1100 collide under a 4-bit green mask.
        assert_ne!(encode(0x100), encode(0x1100));
    }

    #[test]
    fn zero_and_oversized_ids_are_rejected() {
        assert!(matches!(ObjectId::new(0), Err(PickError::ReservedId)));
        assert!(matches!(
            ObjectId::new(MAX_OBJECT_ID + 1),
            Err(PickError::IdOutOfRange(0x0100_0000))
        ));
        assert!(ObjectId::try_from(MAX_OBJECT_ID).is_ok());
    }

    #[test]
    fn color_conversion_is_inverse() {
        let id = ObjectId::new(101).unwrap();
        let color = id.to_color();
        assert_eq!((color.r, color.g, color.b, color.a), (0, 0, 101, 255));
        assert_eq!(ObjectId::from_color(color), Some(id));
        assert_eq!(ObjectId::from_color(Color::BLACK), None);
    }

    #[test]
    fn alpha_is_ignored_on_decode() {
        let color = Color::rgba(0, 1, 2, 0);
        assert_eq!(ObjectId::from_color(color).map(ObjectId::get), Some(258));
    }
}
