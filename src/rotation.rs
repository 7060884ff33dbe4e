use std::f32::consts::PI;
use std::ops::{Mul, MulAssign};

use bevy::math::Mat2;
use bevy::prelude::*;
use rand::distributions::{Distribution, Standard, Uniform};

/// A 2x2 rotation matrix stored as its cosine/sine pair.
///
/// Shapes keep one of these next to their angle so local vertices can be
/// taken to world space without recomputing trig for every vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rot {
    cos: f32,
    sin: f32,
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot {
    pub const IDENTITY: Self = Self { cos: 1., sin: 0. };

    pub fn from_radians(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { cos, sin }
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    pub fn as_radians(&self) -> f32 {
        f32::atan2(self.sin, self.cos)
    }

    /// Local to world: `[cos -sin; sin cos] * vec`.
    pub fn rotate(&self, vec: Vec2) -> Vec2 {
        Vec2::new(
            vec.x * self.cos - vec.y * self.sin,
            vec.x * self.sin + vec.y * self.cos,
        )
    }

    /// World to local, the transpose of [`Rot::rotate`].
    pub fn unrotate(&self, vec: Vec2) -> Vec2 {
        Vec2::new(
            vec.x * self.cos + vec.y * self.sin,
            -vec.x * self.sin + vec.y * self.cos,
        )
    }

    /// For a rotation the inverse is the transpose.
    pub fn inv(self) -> Self {
        Self {
            sin: -self.sin,
            ..self
        }
    }

    /// The same rotation as an explicit column-major matrix.
    pub fn to_mat2(self) -> Mat2 {
        Mat2::from_cols(Vec2::new(self.cos, self.sin), Vec2::new(-self.sin, self.cos))
    }

    pub fn sin(self) -> f32 {
        self.sin
    }

    pub fn cos(self) -> f32 {
        self.cos
    }
}

/// Matrix product; applying `a * b` rotates by `b` first, then `a`.
impl Mul for Rot {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let [cos, sin] = (self.to_mat2() * Vec2::new(rhs.cos, rhs.sin)).to_array();
        Self { cos, sin }
    }
}

impl MulAssign for Rot {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec2> for Rot {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        self.rotate(rhs)
    }
}

impl From<Rot> for Quat {
    fn from(rot: Rot) -> Self {
        Quat::from_rotation_z(rot.as_radians())
    }
}

/// Uniformly distributed orientations.
impl Distribution<Rot> for Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Rot {
        Rot::from_radians(Uniform::new(-PI, PI).sample(rng))
    }
}
