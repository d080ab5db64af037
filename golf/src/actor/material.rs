use rapier3d::prelude::{CoefficientCombineRule, ColliderBuilder};

/// Surface response of a shape.
///
/// Rapier resolves a pair's friction/restitution from both shapes' coefficients
/// using the stronger of the two combine rules, so ice (`Min`) stays slick and
/// sand (`Max`) stays grippy whatever rolls across them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
    pub friction_combine: CoefficientCombineRule,
}

impl Material {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            friction_combine: CoefficientCombineRule::Average,
        }
    }

    pub const fn with_combine(mut self, rule: CoefficientCombineRule) -> Self {
        self.friction_combine = rule;
        self
    }

    /// Scene default for shapes added without an explicit material.
    pub const DEFAULT: Material = Material::new(0.2, 0.0);

    pub const BALL: Material = Material::new(0.3, 0.8);

    /// Regular course floor.
    pub const TURF: Material = Material::new(1.2, 0.1);

    /// Near-maximal friction floor.
    pub const SAND: Material = Material::new(100.0, 0.0).with_combine(CoefficientCombineRule::Max);

    /// Near-zero friction floor.
    pub const ICE: Material = Material::new(0.0, 0.1).with_combine(CoefficientCombineRule::Min);

    pub(crate) fn apply(&self, builder: ColliderBuilder) -> ColliderBuilder {
        builder
            .friction(self.friction)
            .restitution(self.restitution)
            .friction_combine_rule(self.friction_combine)
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::DEFAULT
    }
}

/// Linear RGBA render color, components in `0.0..=1.0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}
