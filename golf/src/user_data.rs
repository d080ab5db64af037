/// Packed per-collider metadata stored in rapier's `Collider::user_data`.
///
/// # Why this exists
/// The rapier event handler only sees `&ColliderSet`. Packing the owning actor and
/// its filter data into the collider lets the handler decide whether a pair is
/// reportable without reaching back into the actor registry.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=31   : actor id (u32)
/// - bits 32..=63  : filter group bits (u32)
/// - bits 64..=95  : filter mask bits (u32)
/// - bits 96..=103 : shape flags (u8, see [`ShapeFlags`])
/// - bits 104..=127: reserved (must be zero)
pub type PackedUserData = u128;

use crate::filter::FilterData;

/// Shape flags carried in the packed user data.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeFlags(pub u8);

impl ShapeFlags {
    pub const TRIGGER: u8 = 1 << 0;
    pub const VISUAL_ONLY: u8 = 1 << 1;
    /// Infinite ground planes; dropped from the trigger feed.
    pub const PLANE: u8 = 1 << 2;

    pub fn is_trigger(self) -> bool {
        self.0 & Self::TRIGGER != 0
    }

    pub fn is_visual_only(self) -> bool {
        self.0 & Self::VISUAL_ONLY != 0
    }

    pub fn is_plane(self) -> bool {
        self.0 & Self::PLANE != 0
    }

    pub fn with(self, flag: u8, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }
}

/// Unpacked view of a collider's user data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColliderTag {
    pub actor: u32,
    pub filter: FilterData,
    pub flags: ShapeFlags,
}

const WORD: u32 = 32;
const WORD_MASK: u128 = u32::MAX as u128;

pub fn pack_tag(tag: ColliderTag) -> PackedUserData {
    (tag.actor as u128)
        | ((tag.filter.group.bits as u128) << WORD)
        | ((tag.filter.mask.bits as u128) << (2 * WORD))
        | ((tag.flags.0 as u128) << (3 * WORD))
}

pub fn unpack_tag(data: PackedUserData) -> ColliderTag {
    let actor = (data & WORD_MASK) as u32;
    let group = ((data >> WORD) & WORD_MASK) as u32;
    let mask = ((data >> (2 * WORD)) & WORD_MASK) as u32;
    let flags = ((data >> (3 * WORD)) & (u8::MAX as u128)) as u8;
    ColliderTag {
        actor,
        filter: FilterData::new(group, mask),
        flags: ShapeFlags(flags),
    }
}

/// Validates that packed data conforms to the current layout.
pub fn validate_tag(data: PackedUserData) -> Result<(), &'static str> {
    const RESERVED_MASK: u128 = !0u128 << 104;
    if (data & RESERVED_MASK) != 0 {
        return Err("Collider user data reserved bits are non-zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterGroup;

    #[test]
    fn pack_unpacks_every_field() {
        let tag = ColliderTag {
            actor: 0xDEAD_BEEF,
            filter: FilterData::of(FilterGroup::Player, &[FilterGroup::Terrain]),
            flags: ShapeFlags(ShapeFlags::TRIGGER),
        };
        let packed = pack_tag(tag);
        assert_eq!(unpack_tag(packed), tag);
        assert_eq!(validate_tag(packed), Ok(()));
    }

    #[test]
    fn fields_land_in_their_words() {
        let tag = ColliderTag {
            actor: 7,
            filter: FilterData::new(0b10, 0b01),
            flags: ShapeFlags(ShapeFlags::VISUAL_ONLY),
        };
        let packed = pack_tag(tag);
        assert_eq!(packed & 0xFFFF_FFFF, 7);
        assert_eq!((packed >> 32) & 0xFFFF_FFFF, 0b10);
        assert_eq!((packed >> 64) & 0xFFFF_FFFF, 0b01);
        assert_eq!((packed >> 96) & 0xFF, ShapeFlags::VISUAL_ONLY as u128);
    }

    #[test]
    fn validate_fails_if_reserved_bits_non_zero() {
        let packed = pack_tag(ColliderTag {
            actor: 1,
            filter: FilterData::default(),
            flags: ShapeFlags::default(),
        }) | (1u128 << 110);
        assert_eq!(
            validate_tag(packed),
            Err("Collider user data reserved bits are non-zero")
        );
    }

    #[test]
    fn flags_toggle_independently() {
        let flags = ShapeFlags::default()
            .with(ShapeFlags::TRIGGER, true)
            .with(ShapeFlags::VISUAL_ONLY, true)
            .with(ShapeFlags::PLANE, true)
            .with(ShapeFlags::TRIGGER, false);
        assert!(!flags.is_trigger());
        assert!(flags.is_visual_only());
        assert!(flags.is_plane());
    }
}
