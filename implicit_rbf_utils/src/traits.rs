/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the kernel evaluation trait shared by all radial basis kernels.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::Point3;

/// Evaluates a radial kernel between two points.
///
/// Implementors only define the radial profile `phi(r)`; the point-pair
/// evaluation is derived from the Euclidean distance, which makes every kernel
/// symmetric in its arguments.
pub trait KernelFunction {
    /// Kernel value at distance `r`.
    fn phi(&self, r: f64) -> f64;

    /// Kernel value between `target` and `source`.
    #[inline(always)]
    fn evaluate(&self, target: &Point3, source: &Point3) -> f64 {
        self.phi(target.distance(source))
    }
}
