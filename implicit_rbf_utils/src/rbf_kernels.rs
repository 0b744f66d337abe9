/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the radial basis kernels used to build variational implicit functions.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{KernelFunction, utils::cubed};

/// Cubic RBF kernel with `phi(r) = r^3`.
///
/// Conditionally positive definite of order two, so it must be paired with a
/// (at least) linear polynomial term.
#[derive(Clone, Debug, Copy, Default)]
pub struct CubicRbfKernel;

impl KernelFunction for CubicRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        cubed(r)
    }
}

/// Thin plate spline RBF kernel with `phi(r) = r^2 log r`.
///
/// The biharmonic kernel of Turk & O'Brien's variational implicit surfaces.
/// `phi(0)` is defined as `0`.
#[derive(Clone, Debug, Copy, Default)]
pub struct ThinPlateSplineRbfKernel;

impl KernelFunction for ThinPlateSplineRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        match r.abs() < f64::EPSILON {
            true => 0.0,
            false => r.powi(2) * r.ln(),
        }
    }
}
