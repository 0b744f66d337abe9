/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation and regular evaluation grids.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use implicit_rbf_utils::{BoundingBox, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate random points in the unit cube `[0, 1)^3`.
///
/// # Parameters
/// - `n`: Number of points to generate.
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same sequence of points will be generated
///     deterministically across runs and platforms (useful for reproducible tests).
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Example
/// ```
/// use implicit_rbf::generate_random_points;
///
/// let pts = generate_random_points(100, Some(42));
/// assert_eq!(pts.len(), 100);
/// assert_eq!(pts, generate_random_points(100, Some(42)));
/// ```
pub fn generate_random_points(n: usize, seed: Option<u64>) -> Vec<Point3> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    (0..n)
        .map(|_| {
            Point3::new(
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
            )
        })
        .collect()
}

/// Create a regular grid of points spanning `bbox`, end points included.
///
/// `counts` gives the number of samples along x, y and z; each must be at
/// least 2. The x index varies fastest.
///
/// # Example
/// ```
/// use implicit_rbf::create_evaluation_grid;
/// use implicit_rbf_utils::{BoundingBox, Point3};
///
/// let bbox = BoundingBox::new(Point3::splat(-6.0), Point3::splat(6.0)).unwrap();
/// let grid = create_evaluation_grid(&bbox, [13, 13, 13]);
///
/// assert_eq!(grid.len(), 13 * 13 * 13);
/// assert_eq!(grid[0], Point3::splat(-6.0));
/// assert_eq!(grid[1], Point3::new(-5.0, -6.0, -6.0));
/// assert_eq!(grid[grid.len() - 1], Point3::splat(6.0));
/// ```
pub fn create_evaluation_grid(bbox: &BoundingBox, counts: [usize; 3]) -> Vec<Point3> {
    assert!(counts.iter().all(|c| *c >= 2), "each axis needs at least two samples");

    let min = bbox.min().to_array();
    let size = bbox.size().to_array();

    let step: Vec<f64> = (0..3)
        .map(|d| size[d] / (counts[d] as f64 - 1.0))
        .collect();

    let mut grid = Vec::with_capacity(counts.iter().product());

    for k in 0..counts[2] {
        for j in 0..counts[1] {
            for i in 0..counts[0] {
                grid.push(Point3::new(
                    min[0] + step[0] * i as f64,
                    min[1] + step[1] * j as f64,
                    min[2] + step[2] * k as f64,
                ));
            }
        }
    }

    grid
}
