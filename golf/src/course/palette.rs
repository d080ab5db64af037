//! Course colors.

use crate::actor::Rgba;

pub const SOFT_BLUE: Rgba = Rgba::rgb8(66, 134, 244);
pub const COURSE_GREEN: Rgba = Rgba::rgb8(82, 175, 35);
pub const WALL_BROWN: Rgba = Rgba::rgb8(156, 84, 16);
pub const WHITE: Rgba = Rgba::WHITE;
pub const DARK_GREY: Rgba = Rgba::new(0.3, 0.3, 0.3, 1.0);
pub const SAND: Rgba = Rgba::rgb8(214, 184, 109);
pub const ICE: Rgba = Rgba::rgb8(167, 201, 232);

pub const GROUND: Rgba = Rgba::rgb8(171, 226, 158);
pub const POLE_RED: Rgba = Rgba::new(0.9, 0.0, 0.0, 1.0);

/// Goal trigger: present but not drawn.
pub const INVISIBLE: Rgba = Rgba::WHITE.with_alpha(0.0);
