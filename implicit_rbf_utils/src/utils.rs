/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies scalar helpers and the runtime kernel selector built from the kernel registry.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{KernelFunction, Point3};
use serde::{Deserialize, Serialize};

/// Returns `x * x`.
///
/// # Examples
///
/// ```
/// use implicit_rbf_utils::squared;
///
/// assert_eq!(squared(-3.0), 9.0);
/// ```
#[inline(always)]
pub fn squared(x: f64) -> f64 {
    x * x
}

/// Returns `x * x * x`.
///
/// # Examples
///
/// ```
/// use implicit_rbf_utils::cubed;
///
/// assert_eq!(cubed(-2.0), -8.0);
/// ```
#[inline(always)]
pub fn cubed(x: f64) -> f64 {
    x * x * x
}

// Runtime selector generated from the kernel registry below.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum KernelType {
            $( $V, )*
        }

        /// Evaluates the selected kernel function at distance `r`.
        #[inline(always)]
        pub fn kernel_phi(r: f64, kernel_type: KernelType) -> f64 {
            match kernel_type {
                $( KernelType::$V => <$Kty as Default>::default().phi(r), )*
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (Cubic,           crate::kernels::CubicRbfKernel),
        (ThinPlateSpline, crate::kernels::ThinPlateSplineRbfKernel),
    ]
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Cubic
    }
}

impl KernelFunction for KernelType {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        kernel_phi(r, *self)
    }
}

/// Kernel value between two points for the selected kernel.
#[inline(always)]
pub fn basis_value(kernel_type: KernelType, a: &Point3, b: &Point3) -> f64 {
    kernel_type.evaluate(a, b)
}
