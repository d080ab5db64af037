use num_traits::{One, PrimInt};

/// Trait implemented by flag enums declared with [`define_bitmask_flags!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index and the
/// associated `Storage` picks the backing integer.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over a primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// True if any bit is set in both masks.
    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```rust
/// golf::define_bitmask_flags!(Layer, u32, {
///     Player,
///     Terrain,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_bitmask_flags!(Sample, u32, { A, B, C });

    #[test]
    fn masks_follow_declaration_order() {
        assert_eq!(Sample::A.mask(), 0b001);
        assert_eq!(Sample::B.mask(), 0b010);
        assert_eq!(Sample::C.mask(), 0b100);
    }

    #[test]
    fn intersects_needs_a_shared_bit() {
        let ab = BitmaskFlags::new(Sample::A.mask() | Sample::B.mask());
        let c = BitmaskFlags::new(Sample::C.mask());
        let b = BitmaskFlags::new(Sample::B.mask());
        assert!(!ab.intersects(c));
        assert!(ab.intersects(b));
        assert!(!BitmaskFlags::<u32>::default().intersects(ab));
    }
}
