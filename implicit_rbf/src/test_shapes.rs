/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides labelled sample sets for validating and demonstrating implicit function fits.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{Label, common};
use implicit_rbf_utils::Point3;

/// Labelled sample sets of simple shapes for testing implicit function fits.
pub struct TestShapes;

impl TestShapes {
    /// The unit sphere from seven samples: the six axis points `(±1, 0, 0)`,
    /// `(0, ±1, 0)`, `(0, 0, ±1)` on the boundary and the origin inside.
    ///
    /// # Example
    /// ```
    /// use implicit_rbf::{Label, TestShapes};
    ///
    /// let (points, labels) = TestShapes::sphere();
    /// assert_eq!(points.len(), 7);
    /// assert_eq!(labels.iter().filter(|l| **l == Label::In).count(), 1);
    /// ```
    pub fn sphere() -> (Vec<Point3>, Vec<Label>) {
        let points = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
            Point3::ORIGIN,
        ];

        let labels = points
            .iter()
            .map(|p| match *p == Point3::ORIGIN {
                true => Label::In,
                false => Label::Boundary,
            })
            .collect();

        (points, labels)
    }

    /// A sphere of `radius` sampled with `num_boundary` random surface points,
    /// the centre labelled inside and the eight corners of the cube of half
    /// width `2 * radius` labelled outside.
    ///
    /// The same `seed` always yields the same samples.
    pub fn random_sphere(num_boundary: usize, radius: f64, seed: u64) -> (Vec<Point3>, Vec<Label>) {
        let mut points = Vec::with_capacity(num_boundary + 9);
        let mut labels = Vec::with_capacity(num_boundary + 9);

        let candidates = common::generate_random_points(4 * num_boundary + 16, Some(seed));

        for p in candidates.iter() {
            if points.len() == num_boundary {
                break;
            }
            // unit cube in [0, 1)^3, recentre and drop near-centre directions
            let d = *p - Point3::splat(0.5);
            let len = d.norm();
            if len < 0.1 || len > 0.5 {
                continue;
            }
            points.push(d.scaled(radius / len));
            labels.push(Label::Boundary);
        }

        points.push(Point3::ORIGIN);
        labels.push(Label::In);

        for corner in 0..8u32 {
            let sign = |bit: u32| match corner & bit != 0 {
                true => 2.0 * radius,
                false => -2.0 * radius,
            };
            points.push(Point3::new(sign(1), sign(2), sign(4)));
            labels.push(Label::Out);
        }

        (points, labels)
    }
}
