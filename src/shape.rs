//! World-space geometry owned by a body.
//!
//! Both shape kinds keep derived data (world vertices, rectangle face normals)
//! in sync with their position and angle. Position is written by the owning
//! [`crate::Body`], never directly by collision code.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::error::{check_extent, check_placement, BodyError};
use crate::{Rot, Vec2Ext};

/// Number of points in the ring handed to renderers for a circle.
pub const CIRCLE_RING_SEGMENTS: usize = 24;

/// Interval covered by a shape projected onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    /// Strict overlap; touching intervals do not overlap.
    pub fn overlaps(&self, other: &Projection) -> bool {
        self.min < other.max && other.min < self.max
    }

    /// Penetration along the axis, negative when the intervals are apart.
    pub fn overlap(&self, other: &Projection) -> f32 {
        (self.max - other.min).min(other.max - self.min)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    radius: f32,
    position: Vec2,
    angle: f32,
    vertices: Vec<Vec2>,
}

impl Circle {
    pub fn new(position: Vec2, angle: f32, radius: f32) -> Result<Self, BodyError> {
        check_placement(position, angle)?;
        let radius = check_extent("radius", radius)?;
        let mut circle = Self {
            radius,
            position,
            angle,
            vertices: Vec::with_capacity(CIRCLE_RING_SEGMENTS),
        };
        circle.calculate_vertices();
        Ok(circle)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    fn calculate_vertices(&mut self) {
        self.vertices.clear();
        let step = TAU / CIRCLE_RING_SEGMENTS as f32;
        for i in 0..CIRCLE_RING_SEGMENTS {
            let (sin, cos) = (self.angle + step * i as f32).sin_cos();
            self.vertices
                .push(self.position + Vec2::new(cos, sin) * self.radius);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    width: f32,
    height: f32,
    position: Vec2,
    angle: f32,
    rot: Rot,
    /// Counter-clockwise from the `(-w/2, -h/2)` corner.
    vertices: [Vec2; 4],
    /// `face_normals[i]` is the outward normal of the edge `vertices[i] -> vertices[i + 1]`.
    face_normals: [Vec2; 4],
    loose_check_radius: f32,
}

impl Rectangle {
    pub fn new(position: Vec2, angle: f32, width: f32, height: f32) -> Result<Self, BodyError> {
        check_placement(position, angle)?;
        let width = check_extent("width", width)?;
        let height = check_extent("height", height)?;
        let mut rect = Self {
            width,
            height,
            position,
            angle,
            rot: Rot::from_radians(angle),
            vertices: [Vec2::ZERO; 4],
            face_normals: [Vec2::ZERO; 4],
            loose_check_radius: (width * width + height * height).sqrt() / 2.,
        };
        rect.calculate_vertices();
        rect.calculate_normals();
        Ok(rect)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width, self.height) / 2.
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rot(&self) -> Rot {
        self.rot
    }

    /// Index of the face whose outward normal is most aligned with `direction`.
    pub fn face_index_towards(&self, direction: Vec2) -> usize {
        let direction = direction.normalize_safe();
        let mut best = 0;
        let mut max = f32::MIN;
        for (i, normal) in self.face_normals.iter().enumerate() {
            let alignment = direction.dot(*normal);
            if alignment > max {
                best = i;
                max = alignment;
            }
        }
        best
    }

    /// The two vertices bounding face `index`.
    pub fn face_vertices(&self, index: usize) -> [Vec2; 2] {
        [self.vertices[index % 4], self.vertices[(index + 1) % 4]]
    }

    /// Takes a world point into the rectangle's unrotated frame, centred on it.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        self.rot.unrotate(point - self.position)
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.rot.rotate(local)
    }

    pub fn face_normals(&self) -> &[Vec2; 4] {
        &self.face_normals
    }

    /// Containment test grown by `slack` on every side.
    pub fn contains(&self, point: Vec2, slack: f32) -> bool {
        let local = self.to_local(point).abs();
        let half = self.half_extents() + Vec2::splat(slack);
        local.x <= half.x && local.y <= half.y
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        let first = axis.dot(self.vertices[0]);
        self.vertices[1..].iter().fold(
            Projection { min: first, max: first },
            |p, v| {
                let d = axis.dot(*v);
                Projection {
                    min: p.min.min(d),
                    max: p.max.max(d),
                }
            },
        )
    }

    /// World-space corners of the axis-aligned box around the rectangle.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let min = self.vertices.iter().fold(Vec2::splat(f32::MAX), |acc, v| acc.min(*v));
        let max = self.vertices.iter().fold(Vec2::splat(f32::MIN), |acc, v| acc.max(*v));
        (min, max)
    }

    fn calculate_vertices(&mut self) {
        let half = self.half_extents();
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ];
        for (vertex, corner) in self.vertices.iter_mut().zip(corners) {
            *vertex = self.position + self.rot.rotate(corner);
        }
    }

    fn calculate_normals(&mut self) {
        for i in 0..4 {
            let edge = self.vertices[(i + 1) % 4] - self.vertices[i];
            // The ring is counter-clockwise, so the outward side is the negated perpendicular.
            self.face_normals[i] = (-edge.normal()).normalize_safe();
        }
    }
}

/// Closed set of collidable shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl Shape {
    pub fn circle(position: Vec2, radius: f32) -> Result<Self, BodyError> {
        Circle::new(position, 0., radius).map(Shape::Circle)
    }

    pub fn rectangle(position: Vec2, angle: f32, width: f32, height: f32) -> Result<Self, BodyError> {
        Rectangle::new(position, angle, width, height).map(Shape::Rectangle)
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.position,
            Shape::Rectangle(r) => r.position,
        }
    }

    pub fn angle(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.angle,
            Shape::Rectangle(r) => r.angle,
        }
    }

    /// World-space outline. For circles this is a render-only ring sample.
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            Shape::Circle(c) => &c.vertices,
            Shape::Rectangle(r) => &r.vertices,
        }
    }

    /// Empty for circles.
    pub fn face_normals(&self) -> &[Vec2] {
        match self {
            Shape::Circle(_) => &[],
            Shape::Rectangle(r) => &r.face_normals,
        }
    }

    /// Radius of a circle around the centre that encloses the whole shape.
    pub fn loose_check_radius(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Rectangle(r) => r.loose_check_radius,
        }
    }

    pub fn point_within(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => (point - c.position).length_squared() < c.radius * c.radius,
            Shape::Rectangle(r) => r.contains(point, 0.),
        }
    }

    pub fn move_to(&mut self, position: Vec2) {
        match self {
            Shape::Circle(c) => {
                c.position = position;
                c.calculate_vertices();
            }
            Shape::Rectangle(r) => {
                r.position = position;
                r.calculate_vertices();
                r.calculate_normals();
            }
        }
    }

    /// Circles only spin their render ring.
    pub fn set_angle(&mut self, angle: f32) {
        match self {
            Shape::Circle(c) => {
                c.angle = angle;
                c.calculate_vertices();
            }
            Shape::Rectangle(r) => {
                r.angle = angle;
                r.rot = Rot::from_radians(angle);
                r.calculate_vertices();
                r.calculate_normals();
            }
        }
    }

    /// The point of the shape furthest along `direction`.
    pub fn support_vertex(&self, direction: Vec2) -> Vec2 {
        match self {
            Shape::Circle(c) => c.position + direction.normalize_safe() * c.radius,
            Shape::Rectangle(r) => {
                let mut best = r.vertices[0];
                let mut max = direction.dot(best);
                for vertex in &r.vertices[1..] {
                    let d = direction.dot(*vertex);
                    if d > max {
                        best = *vertex;
                        max = d;
                    }
                }
                best
            }
        }
    }

    /// The face normal most aligned with `direction`. A circle has no discrete
    /// faces, so it answers with the normalized direction itself.
    pub fn face_normal_towards(&self, direction: Vec2) -> Vec2 {
        match self {
            Shape::Circle(_) => direction.normalize_safe(),
            Shape::Rectangle(r) => r.face_normals[r.face_index_towards(direction)],
        }
    }

    pub fn project(&self, axis: Vec2) -> Projection {
        match self {
            Shape::Circle(c) => {
                let centre = axis.dot(c.position);
                let extent = c.radius * axis.length();
                Projection {
                    min: centre - extent,
                    max: centre + extent,
                }
            }
            Shape::Rectangle(r) => r.project(axis),
        }
    }
}
