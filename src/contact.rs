use std::cmp::Ordering;

use bevy::prelude::*;

use crate::*;

/// Tolerance for deciding two contact points are the same point, and for
/// treating a vertex on an edge as inside the other rectangle.
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Exact overlap test for a pair that passed the broad phase.
///
/// Touching shapes do not intersect.
pub fn shapes_intersect(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Circle(a), Shape::Circle(b)) => {
            let combined_radius = a.radius() + b.radius();
            (b.position() - a.position()).length_squared() < combined_radius * combined_radius
        }
        (Shape::Rectangle(_), Shape::Rectangle(_)) => separating_axis_test(a, b),
        (Shape::Rectangle(r), Shape::Circle(c)) | (Shape::Circle(c), Shape::Rectangle(r)) => {
            rect_circle_intersect(r, c)
        }
    }
}

/// No axis among either shape's face normals separates their projections.
fn separating_axis_test(a: &Shape, b: &Shape) -> bool {
    a.face_normals()
        .iter()
        .chain(b.face_normals())
        .all(|axis| a.project(*axis).overlaps(&b.project(*axis)))
}

fn rect_circle_intersect(rect: &Rectangle, circle: &Circle) -> bool {
    let local = rect.to_local(circle.position());
    let half = rect.half_extents();
    let nearest = local.clamp(-half, half);
    (local - nearest).length_squared() < circle.radius() * circle.radius()
}

/// Normal, depth and contact points of one colliding pair.
///
/// Built fresh every step and thrown away afterwards. A manifold with
/// `penetration_depth() <= 0` describes a pair that is not actually
/// penetrating and must not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionManifold {
    normal: Vec2,
    penetration_depth: f32,
    contacts: [Vec2; 2],
    contact_count: usize,
}

impl CollisionManifold {
    pub fn new(a: &Body, b: &Body) -> Self {
        Self::between(a.shape(), b.shape())
    }

    pub fn between(a: &Shape, b: &Shape) -> Self {
        match (a, b) {
            (Shape::Circle(a), Shape::Circle(b)) => circle_circle(a, b),
            (Shape::Rectangle(a), Shape::Rectangle(b)) => rect_rect(a, b),
            (Shape::Rectangle(r), Shape::Circle(c)) => rect_circle(r, c),
            (Shape::Circle(c), Shape::Rectangle(r)) => rect_circle(r, c).flip(),
        }
    }

    /// Unit vector pointing from A to B.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn penetration_depth(&self) -> f32 {
        self.penetration_depth
    }

    pub fn contacts(&self) -> &[Vec2] {
        &self.contacts[..self.contact_count]
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    pub fn is_penetrating(&self) -> bool {
        self.penetration_depth > 0.
    }

    fn separated(normal: Vec2) -> Self {
        Self {
            normal,
            penetration_depth: 0.,
            contacts: [Vec2::ZERO; 2],
            contact_count: 0,
        }
    }

    fn single(normal: Vec2, penetration_depth: f32, contact: Vec2) -> Self {
        Self {
            normal,
            penetration_depth,
            contacts: [contact, Vec2::ZERO],
            contact_count: 1,
        }
    }

    /// Swaps the roles of A and B.
    fn flip(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Centre-to-centre direction, with a fixed fallback for coincident centres.
fn centre_normal(from: Vec2, to: Vec2) -> Vec2 {
    let n = (to - from).normalize_safe();
    if n == Vec2::ZERO {
        Vec2::Y
    } else {
        n
    }
}

fn circle_circle(a: &Circle, b: &Circle) -> CollisionManifold {
    let normal = centre_normal(a.position(), b.position());
    let distance = (b.position() - a.position()).length();
    let depth = a.radius() + b.radius() - distance;
    if depth <= 0. {
        return CollisionManifold::separated(normal);
    }
    CollisionManifold::single(normal, depth, a.position() + normal * a.radius())
}

/// Normal points from the rectangle to the circle.
fn rect_circle(rect: &Rectangle, circle: &Circle) -> CollisionManifold {
    let radius = circle.radius();
    let local = rect.to_local(circle.position());
    let half = rect.half_extents();
    let mut nearest = local.clamp(-half, half);

    let inside = nearest == local;
    if inside {
        // Push the nearest point out to the closest face.
        if half.x - local.x.abs() < half.y - local.y.abs() {
            nearest.x = half.x.copysign(local.x);
        } else {
            nearest.y = half.y.copysign(local.y);
        }
    }

    let p = rect.to_world(nearest);
    let n = circle.position() - p;
    let distance_sq = n.length_squared();
    if !inside && distance_sq > radius * radius {
        return CollisionManifold::separated(centre_normal(rect.position(), circle.position()));
    }

    let distance = distance_sq.sqrt();
    // Depth is measured from the circle's surface, not the centre-to-face
    // distance alone: r - d outside, r + d when the centre is inside.
    let (depth, outward) = if inside {
        (radius + distance, -n)
    } else {
        (radius - distance, n)
    };
    if depth <= 0. {
        return CollisionManifold::separated(centre_normal(rect.position(), circle.position()));
    }

    let outward = if outward == Vec2::ZERO {
        circle.position() - rect.position()
    } else {
        outward
    };
    let normal = rect.face_normals()[rect.face_index_towards(outward)];
    // Contact on the circle's surface facing the rectangle, not at its centre.
    CollisionManifold::single(normal, depth, circle.position() - normal * radius)
}

/// Depth and normal come from the least-overlapping face axis of either
/// rectangle; for axis-aligned boxes that is the smaller of the x and y
/// interval overlaps.
fn rect_rect(a: &Rectangle, b: &Rectangle) -> CollisionManifold {
    let centres = b.position() - a.position();

    let mut depth = f32::MAX;
    let mut normal = centre_normal(a.position(), b.position());
    // Opposite faces share an axis, so two normals per rectangle cover it.
    for axis in a.face_normals()[..2].iter().chain(&b.face_normals()[..2]) {
        let overlap = a.project(*axis).overlap(&b.project(*axis));
        if overlap < depth {
            depth = overlap;
            normal = *axis;
        }
    }
    if normal.dot(centres) < 0. {
        normal = -normal;
    }
    if depth <= 0. {
        return CollisionManifold::separated(normal);
    }

    let face_a = a.face_vertices(a.face_index_towards(normal));
    let face_b = b.face_vertices(b.face_index_towards(-normal));

    // Prefer vertices that actually sit inside the other box.
    let mut candidates: Vec<Vec2> = face_a
        .iter()
        .filter(|v| b.contains(**v, CONTACT_EPSILON))
        .chain(face_b.iter().filter(|v| a.contains(**v, CONTACT_EPSILON)))
        .copied()
        .collect();
    if candidates.is_empty() {
        candidates.extend(face_a);
        candidates.extend(face_b);
    }
    candidates.sort_by(|p, q| q.dot(normal).partial_cmp(&p.dot(normal)).unwrap_or(Ordering::Equal));

    let first = candidates[0];
    let second = candidates[1..]
        .iter()
        .copied()
        .find(|p| !p.approx_eq(first, CONTACT_EPSILON));
    match second {
        Some(second) => CollisionManifold {
            normal,
            penetration_depth: depth,
            contacts: [first, second],
            contact_count: 2,
        },
        None => CollisionManifold::single(normal, depth, first),
    }
}
