//! Axis-aligned bounding boxes in 2D and 3D.
//!
//! The 2D box is stored as `top_left` / `bottom_right` with Y pointing up, so a
//! valid box has `top_left.x <= bottom_right.x` and `top_left.y >= bottom_right.y`.
//! The 3D box is the usual `min_point <= max_point` per axis. Touching edges
//! count as intersecting.

use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub top_left: Vec2,
    pub bottom_right: Vec2,
}

impl BoundingBox {
    pub const fn new(top_left: Vec2, bottom_right: Vec2) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Smallest box enclosing every point. `None` for an empty slice.
    pub fn from_vertices(vertices: &[Vec2]) -> Option<Self> {
        let first = *vertices.first()?;
        let (min, max) = vertices
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v)));
        Some(Self::from_min_max(min, max))
    }

    fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            top_left: Vec2::new(min.x, max.y),
            bottom_right: Vec2::new(max.x, min.y),
        }
    }

    pub fn intersect_with(&self, other: &BoundingBox) -> bool {
        self.top_left.x <= other.bottom_right.x
            && other.top_left.x <= self.bottom_right.x
            && self.bottom_right.y <= other.top_left.y
            && other.bottom_right.y <= self.top_left.y
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.top_left.x <= other.top_left.x
            && self.top_left.y >= other.top_left.y
            && self.bottom_right.x >= other.bottom_right.x
            && self.bottom_right.y <= other.bottom_right.y
    }

    pub fn contained_in(&self, other: &BoundingBox) -> bool {
        other.contains(self)
    }

    pub fn midpoint(&self) -> Vec2 {
        0.5 * (self.top_left + self.bottom_right)
    }

    /// Transform all four corners in the z = 0 plane and re-derive the box.
    pub fn transform(&self, transform: &Mat4) -> BoundingBox {
        let corners = [
            self.top_left,
            self.bottom_right,
            Vec2::new(self.top_left.x, self.bottom_right.y),
            Vec2::new(self.bottom_right.x, self.top_left.y),
        ]
        .map(|c| transform.transform_point3(c.extend(0.0)).truncate());
        Self::from_vertices(&corners).unwrap_or(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox3D {
    pub min_point: Vec3,
    pub max_point: Vec3,
}

impl BoundingBox3D {
    pub const fn new(min_point: Vec3, max_point: Vec3) -> Self {
        Self {
            min_point,
            max_point,
        }
    }

    pub fn from_vertices(vertices: &[Vec3]) -> Option<Self> {
        let first = *vertices.first()?;
        let (min_point, max_point) = vertices
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v)));
        Some(Self {
            min_point,
            max_point,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.min_point.cmple(self.max_point).all()
    }

    pub fn intersect_with(&self, other: &BoundingBox3D) -> bool {
        self.min_point.cmple(other.max_point).all() && self.max_point.cmpge(other.min_point).all()
    }

    pub fn contains(&self, other: &BoundingBox3D) -> bool {
        self.min_point.cmple(other.min_point).all() && other.max_point.cmple(self.max_point).all()
    }

    pub fn contained_in(&self, other: &BoundingBox3D) -> bool {
        other.contains(self)
    }

    pub fn midpoint(&self) -> Vec3 {
        0.5 * (self.min_point + self.max_point)
    }

    /// Transform the two defining corners and take their componentwise
    /// min/max. Exact for scale, translation and quarter-turn rotations; not a
    /// tight bound under arbitrary rotation, which collision code relies on
    /// staying as-is.
    pub fn transform(&self, transform: &Mat4) -> BoundingBox3D {
        let a = transform.transform_point3(self.min_point);
        let b = transform.transform_point3(self.max_point);
        Self {
            min_point: a.min(b),
            max_point: a.max(b),
        }
    }
}
