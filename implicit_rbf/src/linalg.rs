/////////////////////////////////////////////////////////////////////////////////////////////
//
// Adds dense factorisations for the symmetric indefinite variational RBF system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! Dense solvers for the augmented RBF system.
//!
//! The system matrix carries a trailing block of zeros for the polynomial
//! terms, so it is symmetric but not positive definite and Cholesky cannot be
//! used. The default is the Bunch-Kaufman `LBLᵀ` factorisation, which keeps
//! the symmetry and handles indefinite pivots with 2x2 blocks. A partial pivot
//! LU is available as a general fallback.
//!
//! # References
//! 1. J. R. Bunch, L. Kaufman. Some stable methods for calculating inertia and
//!    solving symmetric linear systems. Math. Comp. 31, 163-179, 1977.

use crate::config::Solvers;
use faer::{
    self, Conj, Mat, Par, Side,
    diag::Diag,
    dyn_stack::{MemBuffer, MemStack},
    linalg::{
        cholesky::lblt,
        solvers::{PartialPivLu, Solve},
    },
    mat::*,
    perm::Perm,
    prelude::*,
};

/// Bunch-Kaufman factorisation `P A Pᵀ = L B Lᵀ` of a symmetric matrix.
///
/// `L` is unit lower triangular and `B` is block diagonal with 1x1 and 2x2
/// blocks, stored as its diagonal and subdiagonal.
pub struct Lblt {
    l: Mat<f64>,
    b_diag: Diag<f64>,
    b_subdiag: Diag<f64>,
    perm: Perm<usize>,
}

impl Lblt {
    /// Factorises `a`, reading only the triangle given by `side`.
    pub fn new(a: MatRef<'_, f64>, side: Side) -> Self {
        assert!(a.nrows() == a.ncols());

        let n = a.nrows();
        let mut l = Mat::<f64>::zeros(n, n);

        match side {
            Side::Lower => l.copy_from_triangular_lower(a),
            Side::Upper => l.copy_from_triangular_lower(a.transpose()),
        }

        let par = Par::Seq;

        let mut diag = Diag::<f64>::zeros(n);
        let mut subdiag = Diag::<f64>::zeros(n);
        let mut perm_fwd = vec![0usize; n];
        let mut perm_bwd = vec![0usize; n];

        let mut mem = MemBuffer::new(lblt::factor::cholesky_in_place_scratch::<usize, f64>(
            n,
            par,
            default(),
        ));
        let stack = MemStack::new(&mut mem);

        lblt::factor::cholesky_in_place(
            l.as_mut(),
            subdiag.as_mut(),
            &mut perm_fwd,
            &mut perm_bwd,
            par,
            stack,
            default(),
        );

        diag.copy_from(l.diagonal());
        l.diagonal_mut().fill(1.0);

        Self {
            l,
            b_diag: diag,
            b_subdiag: subdiag,
            // SAFETY: the factorisation writes a permutation and its inverse.
            perm: unsafe {
                Perm::new_unchecked(perm_fwd.into_boxed_slice(), perm_bwd.into_boxed_slice())
            },
        }
    }

    /// Solves `A X = rhs`.
    pub fn solve(&self, rhs: &Mat<f64>) -> Mat<f64> {
        let par = Par::Seq;
        let mut x = rhs.clone();

        let mut mem = MemBuffer::new(lblt::solve::solve_in_place_scratch::<usize, f64>(
            self.l.nrows(),
            x.ncols(),
            par,
        ));
        let stack = MemStack::new(&mut mem);

        lblt::solve::solve_in_place_with_conj(
            self.l.as_ref(),
            self.b_diag.as_ref(),
            self.b_subdiag.as_ref(),
            Conj::No,
            self.perm.as_ref(),
            x.as_mut(),
            par,
            stack,
        );

        x
    }
}

/// Dense factorisation of the RBF system, chosen by [`Solvers`].
pub enum SymmetricSolver {
    Lblt(Lblt),
    PartialPivLu(PartialPivLu<f64>),
}

impl SymmetricSolver {
    /// Factorises `a` with the requested method. `a` must be square.
    pub fn new(a: MatRef<'_, f64>, solver_type: Solvers) -> Self {
        match solver_type {
            Solvers::Lblt => SymmetricSolver::Lblt(Lblt::new(a, Side::Lower)),
            Solvers::PartialPivLu => SymmetricSolver::PartialPivLu(a.partial_piv_lu()),
        }
    }

    pub fn solve(&self, rhs: &Mat<f64>) -> Mat<f64> {
        match self {
            SymmetricSolver::Lblt(s) => s.solve(rhs),
            SymmetricSolver::PartialPivLu(s) => s.solve(rhs),
        }
    }

    /// Short name of the factorisation in use.
    pub fn kind(&self) -> &'static str {
        match self {
            SymmetricSolver::Lblt(_) => "lblt",
            SymmetricSolver::PartialPivLu(_) => "partial_piv_lu",
        }
    }
}

/// Max-norm residual `‖A x - b‖∞`, relative to `max(‖b‖∞, 1)`.
///
/// Returns `NaN` if the solution holds non-finite values.
pub fn relative_residual(a: MatRef<'_, f64>, x: &Mat<f64>, b: &Mat<f64>) -> f64 {
    let ax = a * x.as_ref();

    let mut max_res = 0.0f64;
    let mut max_rhs = 1.0f64;

    for j in 0..b.ncols() {
        for i in 0..b.nrows() {
            let r = (ax[(i, j)] - b[(i, j)]).abs();
            if r.is_nan() {
                return f64::NAN;
            }
            max_res = max_res.max(r);
            max_rhs = max_rhs.max(b[(i, j)].abs());
        }
    }

    max_res / max_rhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    #[test]
    fn lblt_solves_zero_diagonal_indefinite_system() {
        // eigenvalues 2, -1, -1
        let a = mat![
            [0.0, 1.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0f64],
        ];
        let b = mat![[2.0], [2.0], [2.0f64]];

        let x = Lblt::new(a.as_ref(), Side::Lower).solve(&b);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0);
        assert!(&x ~ mat![[1.0], [1.0], [1.0f64]]);
    }

    #[test]
    fn lblt_reads_only_the_requested_triangle() {
        let full = mat![
            [4.0, 1.0, 2.0],
            [1.0, -3.0, 0.5],
            [2.0, 0.5, 0.0f64],
        ];
        // garbage above the diagonal must be ignored for the lower side
        let mut lower_only = full.clone();
        lower_only[(0, 1)] = 99.0;
        lower_only[(0, 2)] = -99.0;
        lower_only[(1, 2)] = 42.0;

        let b = mat![[1.0], [2.0], [3.0f64]];

        let x_full = Lblt::new(full.as_ref(), Side::Lower).solve(&b);
        let x_lower = Lblt::new(lower_only.as_ref(), Side::Lower).solve(&b);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0);
        assert!(&x_full ~ &x_lower);
        assert!(relative_residual(full.as_ref(), &x_full, &b) < 1e-12);
    }

    #[test]
    fn lblt_and_lu_agree_on_saddle_point_system() {
        // kernel block with a zero polynomial corner, same shape as the RBF system
        let a = mat![
            [0.0, 8.0, 1.0, 1.0],
            [8.0, 0.0, 1.0, 3.0],
            [1.0, 1.0, 0.0, 0.0],
            [1.0, 3.0, 0.0, 0.0f64],
        ];
        let b = mat![[1.0], [-1.0], [0.0], [0.0f64]];

        let lblt = SymmetricSolver::new(a.as_ref(), Solvers::Lblt);
        let lu = SymmetricSolver::new(a.as_ref(), Solvers::PartialPivLu);
        assert!(lblt.kind() == "lblt");
        assert!(lu.kind() == "partial_piv_lu");

        let x_lblt = lblt.solve(&b);
        let x_lu = lu.solve(&b);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1e6);
        assert!(&x_lblt ~ &x_lu);
        assert!(relative_residual(a.as_ref(), &x_lblt, &b) < 1e-10);
    }

    #[test]
    fn lu_solves_general_system() {
        let a = mat![
            [5.0, 2.0, -4.0],
            [3.0, -7.0, 6.0],
            [4.0, 1.0, 5.0f64],
        ];
        let b = mat![[-7.0], [38.0], [43.0f64]];

        let x = SymmetricSolver::new(a.as_ref(), Solvers::PartialPivLu).solve(&b);

        assert!(relative_residual(a.as_ref(), &x, &b) < 1e-12);
    }

    #[test]
    fn residual_reports_non_finite_solutions() {
        let a = mat![[1.0, 0.0], [0.0, 1.0f64]];
        let b = mat![[1.0], [1.0f64]];
        let x = mat![[f64::NAN], [1.0f64]];
        assert!(relative_residual(a.as_ref(), &x, &b).is_nan());
    }
}
