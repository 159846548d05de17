// Per-room velocity modifiers run before the locomotion step
//
// Each modifier sees the body box and the tick's input, mutates the velocity
// and may scale gravity for the coming step. They run in room order.

use glam::Vec2;
use serde::Deserialize;

use super::body::MovementBody;
use crate::core::Rect;
use crate::engine::input::{Action, InputSnapshot};

/// What a modifier can read
#[derive(Debug, Clone, Copy)]
pub struct ModifierContext<'a> {
    pub body: Rect,
    pub input: &'a InputSnapshot,
    pub dt: f32,
}

/// Side effects on the core step besides the velocity change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierEffect {
    /// Multiplies gravity for this tick (0 suspends it)
    pub gravity_scale: f32,
}

impl Default for ModifierEffect {
    fn default() -> Self {
        Self { gravity_scale: 1.0 }
    }
}

impl ModifierEffect {
    fn combine(self, other: Self) -> Self {
        Self {
            gravity_scale: self.gravity_scale * other.gravity_scale,
        }
    }
}

pub trait VelocityModifier: std::fmt::Debug {
    fn apply(&self, ctx: &ModifierContext<'_>, velocity: &mut Vec2) -> ModifierEffect;

    fn name(&self) -> &'static str;
}

/// Climbable region. Holding up or down inside it climbs at a fixed speed,
/// otherwise the body hangs in place.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vine {
    pub region: Rect,
    pub climb_speed: f32,
}

impl VelocityModifier for Vine {
    fn apply(&self, ctx: &ModifierContext<'_>, velocity: &mut Vec2) -> ModifierEffect {
        if !self.region.overlaps(&ctx.body) {
            return ModifierEffect::default();
        }
        let vertical = ctx.input.vertical();
        let climbing = ctx.input.is_held(Action::Up) || ctx.input.is_held(Action::Down);
        if !climbing && velocity.y < 0.0 {
            // Still rising from a jump into the vine
            return ModifierEffect::default();
        }
        velocity.y = vertical * self.climb_speed;
        ModifierEffect { gravity_scale: 0.0 }
    }

    fn name(&self) -> &'static str {
        "vine"
    }
}

/// Radial pull toward a point, linear falloff to zero at `radius`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GravityWell {
    pub center: Vec2,
    pub radius: f32,
    /// Acceleration at the center in units/second^2
    pub strength: f32,
}

impl VelocityModifier for GravityWell {
    fn apply(&self, ctx: &ModifierContext<'_>, velocity: &mut Vec2) -> ModifierEffect {
        let offset = self.center - ctx.body.center();
        let distance = offset.length();
        if self.radius <= 0.0 || distance >= self.radius || distance <= f32::EPSILON {
            return ModifierEffect::default();
        }
        let falloff = 1.0 - distance / self.radius;
        *velocity += offset / distance * self.strength * falloff * ctx.dt;
        ModifierEffect::default()
    }

    fn name(&self) -> &'static str {
        "gravity_well"
    }
}

/// Constant push (wind, water) while the body overlaps the region
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Current {
    pub region: Rect,
    /// Acceleration in units/second^2
    pub push: Vec2,
}

impl VelocityModifier for Current {
    fn apply(&self, ctx: &ModifierContext<'_>, velocity: &mut Vec2) -> ModifierEffect {
        if self.region.overlaps(&ctx.body) {
            *velocity += self.push * ctx.dt;
        }
        ModifierEffect::default()
    }

    fn name(&self) -> &'static str {
        "current"
    }
}

/// Run every modifier in order against one velocity. Gravity scales multiply.
pub fn apply_modifiers(
    modifiers: &[Box<dyn VelocityModifier>],
    ctx: &ModifierContext<'_>,
    velocity: &mut Vec2,
) -> ModifierEffect {
    modifiers
        .iter()
        .fold(ModifierEffect::default(), |effect, modifier| {
            effect.combine(modifier.apply(ctx, velocity))
        })
}

impl MovementBody {
    /// Pre-step hook: let room modifiers act on this body's velocity.
    /// A dashing body keeps its locked velocity.
    pub fn apply_modifiers(
        &mut self,
        modifiers: &[Box<dyn VelocityModifier>],
        input: &InputSnapshot,
        dt: f32,
    ) -> ModifierEffect {
        if modifiers.is_empty() || self.is_dashing {
            return ModifierEffect::default();
        }
        let ctx = ModifierContext {
            body: self.rect(),
            input,
            dt,
        };
        apply_modifiers(modifiers, &ctx, &mut self.velocity)
    }
}
