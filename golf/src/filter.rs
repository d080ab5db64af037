//! Collision filter identities.
//!
//! Every shape carries a group mask (what it is) and a reaction mask (what it
//! wants to hear about). A contact pair is reported to the router only when
//! each side's group intersects the other side's reaction mask. Triggers bypass
//! this test entirely.

use crate::bitmask_flags::{BitmaskFlags, FlagBitmask};
use crate::define_bitmask_flags;

define_bitmask_flags!(FilterGroup, u32, {
    Player,
    Terrain,
});

pub type FilterMask = BitmaskFlags<u32>;

/// Group/mask pair attached to every shape of an actor.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterData {
    pub group: FilterMask,
    pub mask: FilterMask,
}

impl FilterData {
    pub fn new(group: u32, mask: u32) -> Self {
        Self {
            group: FilterMask::new(group),
            mask: FilterMask::new(mask),
        }
    }

    /// Identity `group` reacting to every group in `reacts_to`.
    pub fn of(group: FilterGroup, reacts_to: &[FilterGroup]) -> Self {
        Self {
            group: FilterMask::new(group.mask()),
            mask: FilterMask::of(reacts_to),
        }
    }

    /// Mutual interest test between two shapes.
    #[inline]
    pub fn notifies(&self, other: &FilterData) -> bool {
        self.group.intersects(other.mask) && other.group.intersects(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_and_terrain_notify_each_other() {
        let player = FilterData::of(FilterGroup::Player, &[FilterGroup::Terrain]);
        let terrain = FilterData::of(FilterGroup::Terrain, &[FilterGroup::Player]);
        assert!(player.notifies(&terrain));
        assert!(terrain.notifies(&player));
    }

    #[test]
    fn one_sided_interest_is_not_enough() {
        let player = FilterData::of(FilterGroup::Player, &[FilterGroup::Terrain]);
        let deaf_terrain = FilterData::of(FilterGroup::Terrain, &[]);
        assert!(!player.notifies(&deaf_terrain));
        assert!(!deaf_terrain.notifies(&player));
    }

    #[test]
    fn default_filter_never_notifies() {
        let player = FilterData::of(FilterGroup::Player, &[FilterGroup::Terrain]);
        assert!(!FilterData::default().notifies(&player));
        assert!(!FilterData::default().notifies(&FilterData::default()));
    }
}
