// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Axis-aligned bounds attached to render batches.

use super::Vec3;
use serde::{Deserialize, Serialize};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// Every render batch carries its world-space bounds so the scheduler can
/// order transparent work back to front without knowing anything else about
/// the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// Merging any valid `Aabb` with `INVALID` results in that valid `Aabb`.
    pub const INVALID: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points given in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a degenerate `Aabb` containing a single point.
    #[inline]
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Returns the smallest `Aabb` enclosing both boxes.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the point of the box closest to `point`.
    ///
    /// Points inside the box map to themselves.
    #[inline]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.max(self.min).min(self.max)
    }

    /// Squared distance from `point` to the surface of the box, `0.0` when inside.
    ///
    /// Invalid boxes report an infinite distance so they sort as farthest.
    pub fn distance_squared_to(&self, point: Vec3) -> f32 {
        if !self.is_valid() {
            return f32::INFINITY;
        }
        self.closest_point(point).distance_squared(point)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_distance_to_point_outside_and_inside() {
        let aabb = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert_relative_eq!(aabb.distance_squared_to(Vec3::new(3.0, 0.5, 0.5)), 4.0);
        assert_eq!(aabb.distance_squared_to(Vec3::new(0.5, 0.5, 0.5)), 0.0);
    }

    #[test]
    fn test_invalid_is_farthest() {
        assert_eq!(Aabb::INVALID.distance_squared_to(Vec3::ZERO), f32::INFINITY);
        let merged = Aabb::INVALID.merge(&Aabb::from_point(Vec3::ONE));
        assert!(merged.is_valid());
    }
}
