/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for the kernel, dense solver, and fit validation options.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for the kernel, dense solver, and fit validation options.
use implicit_rbf_utils::KernelType;
use serde::{Deserialize, Serialize};

/// Dense factorisations available for the RBF system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Solvers {
    /// Bunch-Kaufman `LBLᵀ`. Symmetric aware and handles the indefinite system.
    Lblt,

    /// General LU with partial pivoting.
    PartialPivLu,
}

impl Default for Solvers {
    fn default() -> Self {
        Solvers::Lblt
    }
}

/// Settings controlling how a [`VariationalRbfEvaluator`](crate::VariationalRbfEvaluator)
/// fits its weights.
///
/// ### Default Values
/// - `kernel_type`: [`KernelType::Cubic`]
/// - `solver_type`: [`Solvers::Lblt`]
/// - `residual_tolerance`: `1e-6`
/// - `test_unique`: `true`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvaluatorSettings {
    /// Radial kernel used as the basis function.
    pub kernel_type: KernelType,

    /// Factorisation used to solve for the weights.
    pub solver_type: Solvers,

    /// Largest accepted relative residual `‖Mw - b‖∞ / max(‖b‖∞, 1)` after the solve.
    /// Larger residuals are reported as an ill-conditioned system.
    pub residual_tolerance: f64,

    /// Whether to reject coincident sample points before solving.
    pub test_unique: bool,
}

impl EvaluatorSettings {
    /// Returns a new [`EvaluatorSettingsBuilder`] populated with the defaults.
    pub fn builder() -> EvaluatorSettingsBuilder {
        EvaluatorSettingsBuilder::new()
    }
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        EvaluatorSettings::builder().build()
    }
}

/// A convenience builder for constructing an [`EvaluatorSettings`] instance.
///
/// The builder should be called via the [`EvaluatorSettings::builder`] method.
///
/// See [`EvaluatorSettings`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorSettingsBuilder {
    kernel_type: KernelType,
    solver_type: Solvers,
    residual_tolerance: f64,
    test_unique: bool,
}

impl EvaluatorSettingsBuilder {
    fn new() -> Self {
        Self {
            kernel_type: KernelType::Cubic,
            solver_type: Solvers::Lblt,
            residual_tolerance: 1E-6,
            test_unique: true,
        }
    }

    /// Sets the kernel type.
    pub fn kernel_type(mut self, kernel_type: KernelType) -> Self {
        self.kernel_type = kernel_type;
        self
    }

    /// Sets the solver type.
    pub fn solver_type(mut self, solver_type: Solvers) -> Self {
        self.solver_type = solver_type;
        self
    }

    /// Sets the accepted relative residual.
    pub fn residual_tolerance(mut self, residual_tolerance: f64) -> Self {
        self.residual_tolerance = residual_tolerance;
        self
    }

    /// Enables or disables the coincident point check.
    pub fn test_unique(mut self, test_unique: bool) -> Self {
        self.test_unique = test_unique;
        self
    }

    /// Builds and returns an [`EvaluatorSettings`] instance.
    pub fn build(self) -> EvaluatorSettings {
        assert!(self.residual_tolerance > 0.0);
        EvaluatorSettings {
            kernel_type: self.kernel_type,
            solver_type: self.solver_type,
            residual_tolerance: self.residual_tolerance,
            test_unique: self.test_unique,
        }
    }
}
