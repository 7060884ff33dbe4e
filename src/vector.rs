//! Vector helpers that glam's `Vec2` does not provide out of the box.
//!
//! `Vec2` itself is a `Copy` value type, so every operation here returns a
//! fresh vector and nothing can alias a normal or vertex held elsewhere.

use bevy::prelude::*;

use crate::Rot;

/// Vectors shorter than this normalize to zero instead of blowing up.
pub const NORMALIZE_EPSILON: f32 = 1e-4;

pub trait Vec2Ext {
    /// 2D cross product, the z component of the 3D cross.
    fn cross(self, other: Vec2) -> f32;

    /// `v × s`, the vector rotated by -90° and scaled by `s`.
    fn cross_scalar(self, s: f32) -> Vec2;

    /// Unit vector in the same direction, or zero for near-zero input.
    fn normalize_safe(self) -> Vec2;

    /// Perpendicular `(-y, x)`.
    fn normal(self) -> Vec2;

    fn approx_eq(self, other: Vec2, epsilon: f32) -> bool;

    fn rotated(self, radians: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn cross_scalar(self, s: f32) -> Vec2 {
        Vec2::new(s * self.y, -s * self.x)
    }

    #[inline]
    fn normalize_safe(self) -> Vec2 {
        let len = self.length();
        if len > NORMALIZE_EPSILON {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    #[inline]
    fn normal(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    fn approx_eq(self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    #[inline]
    fn rotated(self, radians: f32) -> Vec2 {
        Rot::from_radians(radians).rotate(self)
    }
}

/// `s × v`, used for the velocity a spin of `s` gives a point at lever arm `v`.
#[inline]
pub fn scalar_cross(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}
