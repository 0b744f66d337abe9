/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the axis aligned bounding box derived from a set of sample points.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::Point3;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Axis aligned bounding box (AABB) of a point set.
///
/// A valid box has every component of `max` strictly greater than the matching
/// component of `min`. The [`BoundingBox::empty`] state (`min = +inf`,
/// `max = -inf`) marks a cleared box with no data and is never valid.
///
/// # Examples
///
/// ```
/// use implicit_rbf_utils::{BoundingBox, Point3};
///
/// let points = [
///     Point3::new(-1.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.5),
///     Point3::new(0.0, -1.0, -0.5),
/// ];
///
/// let mut bbox = BoundingBox::from_points(&points).unwrap();
/// assert_eq!(bbox.min(), Point3::new(-1.0, -1.0, -0.5));
/// assert_eq!(bbox.max(), Point3::new(1.0, 2.0, 0.5));
///
/// bbox.clear();
/// assert!(bbox.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Point3,
    max: Point3,
}

impl BoundingBox {
    /// Creates a box from its two corners, checking that `max > min` on every axis.
    pub fn new(min: Point3, max: Point3) -> Result<Self, BoundingBoxError> {
        let bbox = Self { min, max };
        match bbox.is_valid() {
            true => Ok(bbox),
            false => Err(BoundingBoxError::NotOrdered { min, max }),
        }
    }

    /// Computes the tight box around `points`.
    ///
    /// Fails for an empty slice, and for point sets that are flat along any
    /// axis since those cannot satisfy the strict corner ordering.
    pub fn from_points(points: &[Point3]) -> Result<Self, BoundingBoxError> {
        if points.is_empty() {
            return Err(BoundingBoxError::Empty);
        }

        let (min, max) = points.iter().fold(
            (Point3::splat(f64::INFINITY), Point3::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        );

        Self::new(min, max)
    }

    /// The cleared "no data" box.
    pub const fn empty() -> Self {
        Self {
            min: Point3::splat(f64::INFINITY),
            max: Point3::splat(f64::NEG_INFINITY),
        }
    }

    /// Resets to the [`BoundingBox::empty`] state.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Checks the corner invariant.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max.all_greater(&self.min)
    }

    pub fn min(&self) -> Point3 {
        self.min
    }

    pub fn max(&self) -> Point3 {
        self.max
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max).scaled(0.5)
    }

    /// Edge lengths along each axis.
    pub fn size(&self) -> Point3 {
        self.max - self.min
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x() >= self.min.x()
            && p.y() >= self.min.y()
            && p.z() >= self.min.z()
            && p.x() <= self.max.x()
            && p.y() <= self.max.y()
            && p.z() <= self.max.z()
    }

    /// Returns the box grown by `buffer` on every side.
    pub fn padded(&self, buffer: f64) -> Result<Self, BoundingBoxError> {
        let pad = Point3::splat(buffer);
        Self::new(self.min - pad, self.max + pad)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Errors raised when a [`BoundingBox`] cannot be formed.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingBoxError {
    /// No points were supplied.
    Empty,
    /// Some axis of `max` is not strictly greater than `min`.
    NotOrdered { min: Point3, max: Point3 },
}

impl fmt::Display for BoundingBoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundingBoxError::Empty => write!(f, "cannot bound an empty point set"),
            BoundingBoxError::NotOrdered { min, max } => write!(
                f,
                "bounding box corners are not strictly ordered: min {} max {}",
                min, max
            ),
        }
    }
}

impl Error for BoundingBoxError {}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    fn cube_points() -> Vec<Point3> {
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ]
    }

    #[test]
    fn from_points_is_tight() {
        let bbox = BoundingBox::from_points(&cube_points()).unwrap();
        assert!(bbox.min() == Point3::splat(-1.0));
        assert!(bbox.max() == Point3::splat(1.0));
        assert!(bbox.center() == Point3::ORIGIN);
        assert!(bbox.size() == Point3::splat(2.0));
        assert!(bbox.is_valid());
    }

    #[test]
    fn flat_point_set_is_rejected() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let err = BoundingBox::from_points(&points).unwrap_err();
        assert!(matches!(err, BoundingBoxError::NotOrdered { .. }));
    }

    #[test]
    fn new_rejects_unordered_corners() {
        let lo = Point3::splat(0.0);
        let hi = Point3::new(1.0, 1.0, -1.0);
        assert!(BoundingBox::new(lo, hi).is_err());
        assert!(BoundingBox::new(hi, lo).is_err());
        assert!(BoundingBox::new(lo, Point3::splat(1.0)).is_ok());
        assert!(BoundingBox::from_points(&[]).unwrap_err() == BoundingBoxError::Empty);
    }

    #[test]
    fn cleared_box_is_empty_and_invalid() {
        let mut bbox = BoundingBox::from_points(&cube_points()).unwrap();
        bbox.clear();
        assert!(bbox.is_empty());
        assert!(!bbox.is_valid());
        assert!(bbox == BoundingBox::empty());
        assert!(bbox.min() == Point3::splat(f64::INFINITY));
        assert!(bbox.max() == Point3::splat(f64::NEG_INFINITY));
    }

    #[test]
    fn contains_is_inclusive_and_padding_grows() {
        let bbox = BoundingBox::from_points(&cube_points()).unwrap();
        assert!(bbox.contains(&Point3::ORIGIN));
        assert!(bbox.contains(&Point3::new(1.0, -1.0, 1.0)));
        assert!(!bbox.contains(&Point3::new(1.5, 0.0, 0.0)));

        let padded = bbox.padded(0.5).unwrap();
        assert!(padded.contains(&Point3::new(1.5, 0.0, 0.0)));
        assert!(padded.min() == Point3::splat(-1.5));
    }
}
