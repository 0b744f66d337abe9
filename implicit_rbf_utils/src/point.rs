/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the immutable 3D point/vector value type and its distance helpers.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::squared;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Sub},
};

/// A point (or vector) in 3D space with `f64` coordinates.
///
/// Equality is exact component-wise floating point comparison. Callers that
/// need a tolerance must apply it themselves, e.g. via [`Point3::distance`].
///
/// # Examples
///
/// ```
/// use implicit_rbf_utils::Point3;
///
/// let a = Point3::new(1.0, 2.0, 2.0);
/// let b = Point3::ORIGIN;
///
/// assert_eq!(a.norm(), 3.0);
/// assert_eq!(a.distance(&b), b.distance(&a));
/// assert_eq!(a - a, Point3::ORIGIN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Point3 {
    /// The origin `(0, 0, 0)`.
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a point with the same value on every axis.
    #[inline(always)]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline(always)]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline(always)]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline(always)]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Returns the coordinates as `[x, y, z]`.
    #[inline(always)]
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Squared Euclidean distance between two points.
    #[inline(always)]
    pub fn distance2(&self, other: &Point3) -> f64 {
        squared(self.x - other.x) + squared(self.y - other.y) + squared(self.z - other.z)
    }

    /// Euclidean distance between two points. Zero only when the points coincide.
    #[inline(always)]
    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance2(other).sqrt()
    }

    /// Squared distance from the origin.
    #[inline(always)]
    pub fn norm2(&self) -> f64 {
        squared(self.x) + squared(self.y) + squared(self.z)
    }

    /// Distance from the origin.
    #[inline(always)]
    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Returns the point with every coordinate multiplied by `factor`.
    #[inline(always)]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// True only if every axis of `self` is strictly greater than the same axis
    /// of `other`.
    ///
    /// This is not an ordering: two points can fail both `all_greater` and
    /// `all_less` in either direction.
    #[inline(always)]
    pub fn all_greater(&self, other: &Point3) -> bool {
        self.x > other.x && self.y > other.y && self.z > other.z
    }

    /// True only if every axis of `self` is strictly less than the same axis
    /// of `other`.
    #[inline(always)]
    pub fn all_less(&self, other: &Point3) -> bool {
        self.x < other.x && self.y < other.y && self.z < other.z
    }

    /// Component-wise minimum.
    #[inline(always)]
    pub fn min(&self, other: &Point3) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[inline(always)]
    pub fn max(&self, other: &Point3) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// True when all three coordinates are finite.
    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Point3;

    #[inline(always)]
    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    #[inline(always)]
    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Point3::new(v[0], v[1], v[2])
    }
}

// -0.0 and 0.0 compare equal, so they must hash equal too.
#[inline(always)]
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

impl Hash for Point3 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_bits(self.x).hash(state);
        canonical_bits(self.y).hash(state);
        canonical_bits(self.z).hash(state);
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::hash_map::DefaultHasher;

    fn random_point(rng: &mut StdRng) -> Point3 {
        Point3::new(
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
        )
    }

    fn hash_of(p: &Point3) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            assert!(a.distance(&b) == b.distance(&a));
            assert!(a.distance2(&b) == b.distance2(&a));
            assert!(a.distance(&a) == 0.0);
            assert!(a.distance(&b) >= 0.0);
        }
    }

    #[test]
    fn distance_matches_norm_of_difference() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert!(a.distance2(&b) == 25.0);
        assert!(a.distance(&b) == 5.0);
        assert!((b - a).norm() == 5.0);
        assert!((b - a).norm2() == 25.0);
    }

    #[test]
    fn add_and_subtract_are_componentwise() {
        let a = Point3::new(1.0, -2.0, 0.5);
        let b = Point3::new(0.5, 4.0, -1.5);
        assert!(a + b == Point3::new(1.5, 2.0, -1.0));
        assert!(a - b == Point3::new(0.5, -6.0, 2.0));
        assert!((a + b) - b == a);
    }

    #[test]
    fn strict_ordering_requires_every_axis() {
        let lo = Point3::new(0.0, 0.0, 0.0);
        let hi = Point3::new(1.0, 1.0, 1.0);
        let mixed = Point3::new(2.0, -1.0, 2.0);
        let flat = Point3::new(1.0, 1.0, 0.0);

        assert!(hi.all_greater(&lo));
        assert!(lo.all_less(&hi));

        // incomparable in both directions
        assert!(!mixed.all_greater(&lo));
        assert!(!mixed.all_less(&lo));

        // equal on one axis is not strictly greater
        assert!(!flat.all_greater(&lo));
    }

    #[test]
    fn signed_zero_hashes_like_zero() {
        let a = Point3::new(0.0, 1.0, 2.0);
        let b = Point3::new(-0.0, 1.0, 2.0);
        assert!(a == b);
        assert!(hash_of(&a) == hash_of(&b));
    }
}
