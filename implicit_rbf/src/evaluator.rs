/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the implicit function evaluator interface, sample labels, and evaluator errors.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # evaluator
//!
//! The capability shared by every implicit function strategy: it owns a set
//! of labelled sample points, lazily derives whatever internal state it needs
//! from them, and evaluates a signed scalar field where negative means
//! outside, zero means on the boundary and positive means inside.

use implicit_rbf_utils::{BoundingBox, BoundingBoxError, Point3};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Minimum number of samples needed for a well posed variational system.
pub const MIN_SAMPLES: usize = 4;

/// Classification of a sample point relative to the implied surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Out = -1,
    Boundary = 0,
    In = 1,
}

impl Label {
    /// The boundary condition value used in the right hand side.
    #[inline(always)]
    pub fn value(&self) -> f64 {
        *self as i8 as f64
    }

    /// Label whose sign matches `value`, with `|value| <= tolerance` treated
    /// as on the boundary.
    pub fn from_value(value: f64, tolerance: f64) -> Self {
        if value.abs() <= tolerance {
            Label::Boundary
        } else if value > 0.0 {
            Label::In
        } else {
            Label::Out
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Label::Out),
            0 => Ok(Label::Boundary),
            1 => Ok(Label::In),
            other => Err(other),
        }
    }
}

/// Lifecycle of an evaluator.
///
/// `Uninitialized -> Ready` happens on the first compute or evaluation.
/// `Invalidated` is terminal: the evaluator has to be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    Uninitialized,
    Ready,
    Invalidated,
}

/// Labelled sample points and their bounding box.
///
/// Every evaluator strategy owns one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    points: Vec<Point3>,
    labels: Vec<Label>,
    bbox: BoundingBox,
}

impl SampleSet {
    /// Validates the samples and computes their bounding box.
    ///
    /// Requires more than three points and at least as many labels as points.
    /// Labels past the point count are ignored.
    pub fn new(points: Vec<Point3>, labels: &[Label]) -> Result<Self, EvaluatorError> {
        if points.len() < MIN_SAMPLES {
            return Err(EvaluatorError::TooFewPoints {
                found: points.len(),
                required: MIN_SAMPLES,
            });
        }

        if labels.len() < points.len() {
            return Err(EvaluatorError::LabelCountMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }

        let bbox = BoundingBox::from_points(&points)?;
        let labels = labels[..points.len()].to_vec();

        Ok(Self {
            points,
            labels,
            bbox,
        })
    }

    /// Drops every sample and resets the bounding box to empty.
    pub fn clear(&mut self) {
        self.points = Vec::new();
        self.labels = Vec::new();
        self.bbox.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// First pair of indices whose points coincide exactly, if any.
    pub fn find_duplicate(&self) -> Option<(usize, usize)> {
        let n = self.points.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.points[i] == self.points[j] {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

/// An implicit function fitted to labelled samples.
///
/// Implementations derive their internal state lazily: the first call to
/// [`Evaluator::evaluate`] runs [`Evaluator::compute`] once, later calls reuse
/// it. [`Evaluator::invalidate`] discards everything and is terminal.
///
/// Lazy computation needs `&mut self`, so a single evaluator cannot be
/// fitted from several threads at once. Call [`Evaluator::compute`] up front
/// to fit eagerly.
pub trait Evaluator {
    /// Evaluates the field at `point`. Negative is outside, zero is on the
    /// boundary and positive is inside.
    fn evaluate(&mut self, point: &Point3) -> Result<f64, EvaluatorError>;

    /// Derives the strategy's internal state from the current samples.
    fn compute(&mut self) -> Result<(), EvaluatorError>;

    /// Discards samples and derived state, leaving the bounding box empty.
    fn invalidate(&mut self);

    fn state(&self) -> EvaluatorState;

    fn samples(&self) -> &SampleSet;

    fn bounding_box(&self) -> &BoundingBox {
        self.samples().bounding_box()
    }

    /// Evaluates the field at every point in `points`.
    fn evaluate_points(&mut self, points: &[Point3]) -> Result<Vec<f64>, EvaluatorError> {
        points.iter().map(|p| self.evaluate(p)).collect()
    }

    /// Classifies `point`, treating values within `tolerance` of zero as boundary.
    fn classify(&mut self, point: &Point3, tolerance: f64) -> Result<Label, EvaluatorError> {
        self.evaluate(point)
            .map(|value| Label::from_value(value, tolerance))
    }
}

/// Errors raised while building, fitting or evaluating an [`Evaluator`].
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    /// Fewer samples than a well posed system needs.
    TooFewPoints { found: usize, required: usize },

    /// The label array is shorter than the point array.
    LabelCountMismatch { points: usize, labels: usize },

    /// Precomputed weights do not match the `n + 4` system size.
    WeightCountMismatch { expected: usize, found: usize },

    /// The samples do not span a valid bounding box.
    BoundingBox(BoundingBoxError),

    /// Two samples coincide, which makes the system singular.
    DuplicatePoints { first: usize, second: usize },

    /// The factorisation produced non-finite weights.
    SingularSystem { size: usize },

    /// The solved weights do not reproduce the right hand side.
    IllConditioned { residual: f64, tolerance: f64 },

    /// The evaluator was invalidated and must be rebuilt before use.
    Invalidated,
}

impl fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorError::TooFewPoints { found, required } => write!(
                f,
                "{} sample points supplied, at least {} are required",
                found, required
            ),
            EvaluatorError::LabelCountMismatch { points, labels } => write!(
                f,
                "{} labels supplied for {} sample points",
                labels, points
            ),
            EvaluatorError::WeightCountMismatch { expected, found } => write!(
                f,
                "{} weights supplied, expected {}",
                found, expected
            ),
            EvaluatorError::BoundingBox(e) => write!(f, "invalid sample extents: {}", e),
            EvaluatorError::DuplicatePoints { first, second } => write!(
                f,
                "sample points {} and {} coincide",
                first, second
            ),
            EvaluatorError::SingularSystem { size } => write!(
                f,
                "the {}x{} RBF system is singular",
                size, size
            ),
            EvaluatorError::IllConditioned {
                residual,
                tolerance,
            } => write!(
                f,
                "RBF system is ill-conditioned: relative residual {:e} exceeds {:e}",
                residual, tolerance
            ),
            EvaluatorError::Invalidated => write!(f, "evaluator has been invalidated"),
        }
    }
}

impl Error for EvaluatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EvaluatorError::BoundingBox(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoundingBoxError> for EvaluatorError {
    fn from(e: BoundingBoxError) -> Self {
        EvaluatorError::BoundingBox(e)
    }
}
