/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the variational RBF evaluator, its system assembly, solve and model persistence.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # evaluator_rbf
//!
//! Variational implicit function fitted with radial basis functions.
//!
//! Given samples `c_0..c_{n-1}` with boundary values `h_k` of `-1`, `0` or
//! `1`, the weights `w` solve the augmented `(n + 4) x (n + 4)` system
//!
//! ```text
//! | Φ   P | | w_r |   | h |
//! | Pᵀ  0 | | w_p | = | 0 |
//! ```
//!
//! where `Φ[i][j] = φ(|c_i - c_j|)` and the rows of `P` are `[1, x_i, y_i, z_i]`.
//! The field is then
//!
//! ```text
//! f(p) = Σ_k w_k φ(|p - c_k|) + w_n + w_{n+1} x + w_{n+2} y + w_{n+3} z
//! ```
//!
//! # References
//! 1. G. Turk, J. F. O'Brien. Shape transformation using variational implicit
//!    functions. SIGGRAPH 1999, 335-342.

use crate::{
    config::EvaluatorSettings,
    evaluator::{Evaluator, EvaluatorError, EvaluatorState, Label, SampleSet},
    linalg::{self, SymmetricSolver},
    progress::{ProgressMsg, ProgressSink},
};

use faer::Mat;
use implicit_rbf_utils::{KernelFunction, Point3};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

/// Number of polynomial terms appended to the system: `1, x, y, z`.
const POLY_TERMS: usize = 4;

/// Solved weights split into their radial and polynomial parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    /// One weight per sample point.
    pub point_weights: Vec<f64>,

    /// Constant, x, y and z coefficients of the linear polynomial.
    pub poly_weights: [f64; 4],
}

#[derive(Debug, Clone)]
enum Fit {
    Uninitialized,
    Ready(Vec<f64>),
    Invalidated,
}

/// This builder provides an ergonomic way to configure and create a
/// [`VariationalRbfEvaluator`] from labelled samples.
///
/// The builder should be called via the [`VariationalRbfEvaluator::builder`] method.
pub struct VariationalRbfEvaluatorBuilder {
    points: Vec<Point3>,
    labels: Vec<Label>,
    settings: EvaluatorSettings,
    weights: Option<Vec<f64>>,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl VariationalRbfEvaluatorBuilder {
    fn new(points: Vec<Point3>, labels: &[Label]) -> Self {
        Self {
            points,
            labels: labels.to_vec(),
            settings: EvaluatorSettings::default(),
            weights: None,
            progress_callback: None,
        }
    }

    /// Sets the kernel, solver and validation settings.
    pub fn settings(mut self, settings: EvaluatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Supplies precomputed weights, skipping the solve on first evaluation.
    ///
    /// Must hold `n + 4` values: one per sample, then the constant, x, y and z
    /// polynomial coefficients.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Optional callback for reporting fitting progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Validates the samples and builds the evaluator.
    ///
    /// ### Errors
    /// - Any [`SampleSet::new`] error.
    /// - [`EvaluatorError::WeightCountMismatch`] if precomputed weights are not `n + 4` long.
    pub fn build(self) -> Result<VariationalRbfEvaluator, EvaluatorError> {
        let samples = SampleSet::new(self.points, &self.labels)?;

        let fit = match self.weights {
            None => Fit::Uninitialized,
            Some(weights) => {
                let expected = samples.len() + POLY_TERMS;
                if weights.len() != expected {
                    return Err(EvaluatorError::WeightCountMismatch {
                        expected,
                        found: weights.len(),
                    });
                }
                Fit::Ready(weights)
            }
        };

        Ok(VariationalRbfEvaluator {
            samples,
            settings: self.settings,
            fit,
            progress_callback: self.progress_callback,
        })
    }
}

/// Implicit function interpolating labelled samples with a variational RBF fit.
///
/// The weights are solved lazily on the first call to [`Evaluator::evaluate`]
/// and reused afterwards, or supplied up front with
/// [`VariationalRbfEvaluator::with_weights`].
///
/// # Example
/// ```
/// use implicit_rbf::{Evaluator, TestShapes, VariationalRbfEvaluator};
/// use implicit_rbf_utils::Point3;
///
/// let (points, labels) = TestShapes::sphere();
/// let mut evaluator = VariationalRbfEvaluator::new(points, &labels)?;
///
/// assert!((evaluator.evaluate(&Point3::ORIGIN)? - 1.0).abs() < 1e-9);
/// assert!(evaluator.evaluate(&Point3::splat(100.0))? < 0.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct VariationalRbfEvaluator {
    samples: SampleSet,
    settings: EvaluatorSettings,
    fit: Fit,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl VariationalRbfEvaluator {
    /// Creates a new [`VariationalRbfEvaluatorBuilder`] for the given samples.
    pub fn builder(points: Vec<Point3>, labels: &[Label]) -> VariationalRbfEvaluatorBuilder {
        VariationalRbfEvaluatorBuilder::new(points, labels)
    }

    /// Evaluator with default settings whose weights are solved on first use.
    pub fn new(points: Vec<Point3>, labels: &[Label]) -> Result<Self, EvaluatorError> {
        Self::builder(points, labels).build()
    }

    /// Evaluator using `weights` as is, without solving.
    pub fn with_weights(
        points: Vec<Point3>,
        labels: &[Label],
        weights: Vec<f64>,
    ) -> Result<Self, EvaluatorError> {
        Self::builder(points, labels).weights(weights).build()
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    /// `φ(|a - p|)` for the configured kernel.
    #[inline(always)]
    pub fn basis_function(&self, a: &Point3, p: &Point3) -> f64 {
        self.settings.kernel_type.evaluate(a, p)
    }

    /// Assembles the dense symmetric `(n + 4) x (n + 4)` system matrix.
    ///
    /// The leading `n x n` block holds the kernel between every pair of
    /// samples with a zero diagonal. Column `n` is all ones and columns
    /// `n + 1..n + 3` hold the sample coordinates, mirrored into the trailing
    /// rows. The trailing `4 x 4` block is zero.
    pub fn assemble_matrix(&self) -> Mat<f64> {
        let points = self.samples.points();
        let n = points.len();
        let size = n + POLY_TERMS;

        let mut m = Mat::<f64>::zeros(size, size);

        for r in 0..n {
            for c in (r + 1)..n {
                let v = self.basis_function(&points[r], &points[c]);
                m[(r, c)] = v;
                m[(c, r)] = v;
            }

            let poly = [1.0, points[r].x(), points[r].y(), points[r].z()];
            for (k, v) in poly.into_iter().enumerate() {
                m[(r, n + k)] = v;
                m[(n + k, r)] = v;
            }
        }

        m
    }

    /// Assembles the right hand side: the label values followed by four zeros.
    pub fn assemble_rhs(&self) -> Mat<f64> {
        let labels = self.samples.labels();
        let n = labels.len();

        Mat::from_fn(n + POLY_TERMS, 1, |i, _| match i < n {
            true => labels[i].value(),
            false => 0.0,
        })
    }

    /// The `n + 4` weights, if solved or supplied.
    pub fn weights(&self) -> Option<&[f64]> {
        match &self.fit {
            Fit::Ready(w) => Some(w),
            _ => None,
        }
    }

    /// Weights split into their radial and polynomial parts, if available.
    pub fn coefficients(&self) -> Option<Coefficients> {
        let w = self.weights()?;
        let n = self.samples.len();

        Some(Coefficients {
            point_weights: w[..n].to_vec(),
            poly_weights: [w[n], w[n + 1], w[n + 2], w[n + 3]],
        })
    }

    fn field_value(&self, weights: &[f64], p: &Point3) -> f64 {
        let points = self.samples.points();
        let n = points.len();

        let radial: f64 = points
            .iter()
            .zip(weights[..n].iter())
            .map(|(c, w)| w * self.basis_function(p, c))
            .sum();

        radial
            + weights[n]
            + weights[n + 1] * p.x()
            + weights[n + 2] * p.y()
            + weights[n + 3] * p.z()
    }

    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = &self.progress_callback {
            sink.emit(msg);
        }
    }

    /// Save this fitted evaluator to a **JSON envelope** `{ format, version, model }`.
    ///
    /// Files produced here are intended to be read back with
    /// [`VariationalRbfEvaluator::load_model`].
    ///
    /// ### Errors
    /// - `ModelIOError::NotFitted` if no weights have been solved or supplied.
    /// - `ModelIOError::{Create, Serialize, Flush}` on I/O or serialization failures.
    ///
    /// ### Example
    /// ```no_run
    /// # use implicit_rbf::{Evaluator, TestShapes, VariationalRbfEvaluator};
    /// let (points, labels) = TestShapes::sphere();
    /// let mut evaluator = VariationalRbfEvaluator::new(points, &labels)?;
    /// evaluator.compute()?;
    /// evaluator.save_model("sphere_model.json")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> ModelIOResult<()> {
        let path_ref = path.as_ref();

        let weights = self.weights().ok_or_else(|| ModelIOError::NotFitted {
            path: path_ref.to_path_buf(),
        })?;

        let file = File::create(path_ref).map_err(|e| ModelIOError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let mut w = BufWriter::new(file);

        let env = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            model: SavedModelRef {
                points: self.samples.points(),
                labels: self.samples.labels(),
                settings: &self.settings,
                weights,
            },
        };

        serde_json::to_writer_pretty(&mut w, &env).map_err(|e| ModelIOError::Serialize {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        w.flush().map_err(|e| ModelIOError::Flush {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load a fitted evaluator from a versioned **JSON envelope**, validating
    /// format, version and the samples themselves.
    ///
    /// If `progress` is `Some`, the sink is installed on the returned evaluator.
    ///
    /// ### Errors
    /// - `ModelIOError::{Open, Parse, FormatMismatch, VersionMismatch}` as appropriate.
    /// - `ModelIOError::Invalid` if the stored samples or weights are inconsistent.
    pub fn load_model<P: AsRef<Path>>(
        path: P,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> ModelIOResult<Self> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| ModelIOError::Open {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let env: JsonEnvelopeOwned<SavedModel> =
            serde_json::from_reader(reader).map_err(|e| ModelIOError::Parse {
                path: path_ref.to_path_buf(),
                source: e,
            })?;

        if env.format != JSON_FORMAT_NAME {
            return Err(ModelIOError::FormatMismatch {
                path: path_ref.to_path_buf(),
                found: env.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if env.version != JSON_VERSION {
            return Err(ModelIOError::VersionMismatch {
                path: path_ref.to_path_buf(),
                found: env.version,
                expected: JSON_VERSION,
            });
        }

        let model = env.model;
        let mut builder = Self::builder(model.points, &model.labels)
            .settings(model.settings)
            .weights(model.weights);
        if let Some(sink) = progress {
            builder = builder.progress_callback(sink);
        }

        builder.build().map_err(|e| ModelIOError::Invalid {
            path: path_ref.to_path_buf(),
            source: e,
        })
    }
}

impl Evaluator for VariationalRbfEvaluator {
    fn evaluate(&mut self, point: &Point3) -> Result<f64, EvaluatorError> {
        if matches!(self.fit, Fit::Uninitialized) {
            self.compute()?;
        }

        match &self.fit {
            Fit::Ready(weights) => Ok(self.field_value(weights, point)),
            Fit::Uninitialized | Fit::Invalidated => Err(EvaluatorError::Invalidated),
        }
    }

    /// Assembles and solves the system, replacing any existing weights.
    ///
    /// ### Errors
    /// - [`EvaluatorError::Invalidated`] after [`Evaluator::invalidate`].
    /// - [`EvaluatorError::DuplicatePoints`] when `test_unique` is set and two samples coincide.
    /// - [`EvaluatorError::SingularSystem`] if the solve yields non-finite weights.
    /// - [`EvaluatorError::IllConditioned`] if the weights do not reproduce the right hand side.
    fn compute(&mut self) -> Result<(), EvaluatorError> {
        if matches!(self.fit, Fit::Invalidated) {
            return Err(EvaluatorError::Invalidated);
        }

        if self.settings.test_unique {
            if let Some((first, second)) = self.samples.find_duplicate() {
                return Err(EvaluatorError::DuplicatePoints { first, second });
            }
        }

        let start = Instant::now();

        let matrix = self.assemble_matrix();
        let rhs = self.assemble_rhs();
        let size = matrix.nrows();

        self.emit(ProgressMsg::SystemAssembled { size });

        let solver = SymmetricSolver::new(matrix.as_ref(), self.settings.solver_type);
        let solution = solver.solve(&rhs);

        let weights: Vec<f64> = (0..size).map(|i| solution[(i, 0)]).collect();

        if weights.iter().any(|w| !w.is_finite()) {
            log::warn!("{} solve of the {size}x{size} RBF system produced non-finite weights", solver.kind());
            return Err(EvaluatorError::SingularSystem { size });
        }

        let residual = linalg::relative_residual(matrix.as_ref(), &solution, &rhs);
        let tolerance = self.settings.residual_tolerance;

        if !(residual <= tolerance) {
            log::warn!("RBF system residual {residual:e} exceeds tolerance {tolerance:e}");
            return Err(EvaluatorError::IllConditioned {
                residual,
                tolerance,
            });
        }

        let elapsed = start.elapsed();
        log::debug!(
            "solved {size}x{size} RBF system with {} in {:?}, residual {residual:e}",
            solver.kind(),
            elapsed
        );

        self.emit(ProgressMsg::SystemSolved {
            size,
            solver: solver.kind(),
            residual,
            elapsed,
        });

        self.fit = Fit::Ready(weights);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.samples.clear();
        self.fit = Fit::Invalidated;

        log::debug!("RBF evaluator invalidated");
        self.emit(ProgressMsg::Invalidated);
    }

    fn state(&self) -> EvaluatorState {
        match self.fit {
            Fit::Uninitialized => EvaluatorState::Uninitialized,
            Fit::Ready(_) => EvaluatorState::Ready,
            Fit::Invalidated => EvaluatorState::Invalidated,
        }
    }

    fn samples(&self) -> &SampleSet {
        &self.samples
    }
}

const JSON_FORMAT_NAME: &str = "implicit_rbf.json";
const JSON_VERSION: u32 = 1;

#[derive(Serialize)]
struct SavedModelRef<'a> {
    points: &'a [Point3],
    labels: &'a [Label],
    settings: &'a EvaluatorSettings,
    weights: &'a [f64],
}

#[derive(Deserialize)]
struct SavedModel {
    points: Vec<Point3>,
    labels: Vec<Label>,
    settings: EvaluatorSettings,
    weights: Vec<f64>,
}

/// Borrowing envelope for SAVE (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<T> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: T,
}

/// Owning envelope for LOAD.
#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

type ModelIOResult<T> = std::result::Result<T, ModelIOError>;

/// Errors that can occur when saving or loading a [`VariationalRbfEvaluator`].
#[derive(Debug)]
pub enum ModelIOError {
    /// The evaluator has no weights to save.
    NotFitted { path: PathBuf },
    /// Failed to create the target file before writing a model.
    Create { path: PathBuf, source: io::Error },
    /// Failed to open an existing model file for reading.
    Open { path: PathBuf, source: io::Error },
    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },
    /// Error serializing the model to JSON.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error parsing JSON when reading a model from disk.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The JSON `format` field does not match the expected model format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    /// The stored samples or weights do not form a valid evaluator.
    Invalid {
        path: PathBuf,
        source: EvaluatorError,
    },
}

impl fmt::Display for ModelIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIOError::NotFitted { path } => {
                write!(f, "cannot save {}: evaluator has no weights", path.display())
            }
            ModelIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            ModelIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            ModelIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            ModelIOError::Serialize { path, source } => {
                write!(f, "serializing JSON to {}: {}", path.display(), source)
            }
            ModelIOError::Parse { path, source } => {
                write!(f, "parsing JSON in {}: {}", path.display(), source)
            }
            ModelIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::Invalid { path, source } => {
                write!(f, "invalid model in {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for ModelIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelIOError::Create { source, .. }
            | ModelIOError::Open { source, .. }
            | ModelIOError::Flush { source, .. } => Some(source),
            ModelIOError::Serialize { source, .. } | ModelIOError::Parse { source, .. } => {
                Some(source)
            }
            ModelIOError::Invalid { source, .. } => Some(source),
            ModelIOError::NotFitted { .. }
            | ModelIOError::FormatMismatch { .. }
            | ModelIOError::VersionMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Solvers, progress::closure_sink, test_shapes::TestShapes};
    use equator::assert;
    use faer::utils::approx::*;
    use implicit_rbf_utils::KernelType;
    use std::sync::Mutex;

    fn sphere_evaluator() -> VariationalRbfEvaluator {
        let (points, labels) = TestShapes::sphere();
        VariationalRbfEvaluator::new(points, &labels).unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("implicit_rbf_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn sphere_matrix_layout() {
        let evaluator = sphere_evaluator();
        let m = evaluator.assemble_matrix();
        let b = evaluator.assemble_rhs();
        let n = 7;

        assert!(all(m.nrows() == n + 4, m.ncols() == n + 4, b.nrows() == n + 4));

        for i in 0..n + 4 {
            assert!(m[(i, i)] == 0.0);
            for j in 0..n + 4 {
                assert!(m[(i, j)] == m[(j, i)]);
            }
        }
        for i in n..n + 4 {
            for j in n..n + 4 {
                assert!(m[(i, j)] == 0.0);
            }
        }

        // (1, 0, 0) to (-1, 0, 0) is distance 2
        assert!(m[(0, 1)] == 8.0);
        assert!(m[(0, 6)] == 1.0);
        assert!(all(m[(0, n)] == 1.0, m[(0, n + 1)] == 1.0, m[(0, n + 2)] == 0.0));
        assert!(m[(n + 3, 4)] == 1.0);

        for i in 0..n + 4 {
            let expected = if i == 6 { 1.0 } else { 0.0 };
            assert!(b[(i, 0)] == expected);
        }
    }

    #[test]
    fn sphere_weights_match_closed_form() {
        let mut evaluator = sphere_evaluator();
        assert!(evaluator.state() == EvaluatorState::Uninitialized);
        assert!(evaluator.weights().is_none());

        evaluator.compute().unwrap();
        assert!(evaluator.state() == EvaluatorState::Ready);

        // boundary weight a = 1 / (4 - 8√2), centre -6a, constant -(2 + 8√2) a
        let a = 1.0 / (4.0 - 8.0 * 2f64.sqrt());
        let d = -(2.0 + 8.0 * 2f64.sqrt()) * a;

        let c = evaluator.coefficients().unwrap();
        for w in &c.point_weights[..6] {
            assert!((w - a).abs() < 1e-10);
        }
        assert!((c.point_weights[6] + 6.0 * a).abs() < 1e-10);
        assert!((c.poly_weights[0] - d).abs() < 1e-10);
        for w in &c.poly_weights[1..] {
            assert!(w.abs() < 1e-10);
        }
    }

    #[test]
    fn sphere_field_signs() {
        let mut evaluator = sphere_evaluator();

        let centre = evaluator.evaluate(&Point3::ORIGIN).unwrap();
        assert!((centre - 1.0).abs() < 1e-10);

        let (points, _) = TestShapes::sphere();
        for p in &points[..6] {
            assert!(evaluator.evaluate(p).unwrap().abs() < 1e-10);
        }

        assert!(evaluator.evaluate(&Point3::new(0.5, 0.0, 0.0)).unwrap() > 0.0);
        assert!(evaluator.evaluate(&Point3::new(2.0, 0.0, 0.0)).unwrap() < 0.0);
        assert!(evaluator.evaluate(&Point3::splat(100.0)).unwrap() < 0.0);

        assert!(evaluator.classify(&Point3::ORIGIN, 1e-6).unwrap() == Label::In);
        assert!(evaluator.classify(&Point3::new(0.0, -1.0, 0.0), 1e-6).unwrap() == Label::Boundary);
        assert!(evaluator.classify(&Point3::splat(3.0), 1e-6).unwrap() == Label::Out);
    }

    #[test]
    fn reproduces_labels_at_random_samples() {
        let (points, labels) = TestShapes::random_sphere(30, 2.0, 7);
        let mut evaluator = VariationalRbfEvaluator::new(points.clone(), &labels).unwrap();

        let values = evaluator.evaluate_points(&points).unwrap();
        for (v, l) in values.iter().zip(labels.iter()) {
            assert!((v - l.value()).abs() < 1e-6);
        }
    }

    #[test]
    fn uniform_scaling_leaves_field_unchanged() {
        let (points, labels) = TestShapes::random_sphere(12, 1.0, 3);
        let s = 3.0;
        let scaled: Vec<Point3> = points.iter().map(|p| p.scaled(s)).collect();

        let mut base = VariationalRbfEvaluator::new(points, &labels).unwrap();
        let mut big = VariationalRbfEvaluator::new(scaled, &labels).unwrap();

        for p in [
            Point3::new(0.3, -0.2, 0.1),
            Point3::new(1.5, 0.0, -0.4),
            Point3::new(-0.7, 0.7, 0.7),
        ] {
            let a = base.evaluate(&p).unwrap();
            let b = big.evaluate(&p.scaled(s)).unwrap();
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn lu_and_lblt_agree() {
        let (points, labels) = TestShapes::random_sphere(16, 1.5, 21);

        let mut lblt = VariationalRbfEvaluator::new(points.clone(), &labels).unwrap();
        let mut lu = VariationalRbfEvaluator::builder(points, &labels)
            .settings(
                EvaluatorSettings::builder()
                    .solver_type(Solvers::PartialPivLu)
                    .build(),
            )
            .build()
            .unwrap();

        lblt.compute().unwrap();
        lu.compute().unwrap();

        let a = Mat::from_fn(lblt.weights().unwrap().len(), 1, |i, _| lblt.weights().unwrap()[i]);
        let b = Mat::from_fn(lu.weights().unwrap().len(), 1, |i, _| lu.weights().unwrap()[i]);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1e8);
        assert!(&a ~ &b);
    }

    #[test]
    fn thin_plate_spline_fits_sphere() {
        let (points, labels) = TestShapes::sphere();
        let mut evaluator = VariationalRbfEvaluator::builder(points.clone(), &labels)
            .settings(
                EvaluatorSettings::builder()
                    .kernel_type(KernelType::ThinPlateSpline)
                    .build(),
            )
            .build()
            .unwrap();

        assert!((evaluator.evaluate(&Point3::ORIGIN).unwrap() - 1.0).abs() < 1e-9);
        for p in &points[..6] {
            assert!(evaluator.evaluate(p).unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn precomputed_weights_skip_the_solve() {
        let (points, labels) = TestShapes::sphere();
        let mut weights = vec![0.0; 11];
        weights[7] = 5.0;

        let mut evaluator = VariationalRbfEvaluator::with_weights(points, &labels, weights).unwrap();
        assert!(evaluator.state() == EvaluatorState::Ready);
        assert!(evaluator.evaluate(&Point3::ORIGIN).unwrap() == 5.0);
        assert!(evaluator.evaluate(&Point3::new(-4.0, 2.0, 9.0)).unwrap() == 5.0);
    }

    #[test]
    fn precomputed_weights_must_match_system_size() {
        let (points, labels) = TestShapes::sphere();
        let err = VariationalRbfEvaluator::with_weights(points, &labels, vec![0.0; 10]).unwrap_err();
        assert_eq!(
            err,
            EvaluatorError::WeightCountMismatch {
                expected: 11,
                found: 10
            }
        );
    }

    #[test]
    fn invalidate_is_terminal() {
        let mut evaluator = sphere_evaluator();
        evaluator.compute().unwrap();

        evaluator.invalidate();
        assert!(evaluator.state() == EvaluatorState::Invalidated);
        assert!(evaluator.weights().is_none());
        assert!(evaluator.samples().is_empty());
        assert!(evaluator.bounding_box().is_empty());

        assert_eq!(evaluator.evaluate(&Point3::ORIGIN), Err(EvaluatorError::Invalidated));
        assert_eq!(evaluator.compute(), Err(EvaluatorError::Invalidated));
    }

    #[test]
    fn duplicate_points_are_rejected() {
        let (mut points, mut labels) = TestShapes::sphere();
        points.push(points[0]);
        labels.push(Label::Boundary);

        let mut evaluator = VariationalRbfEvaluator::new(points, &labels).unwrap();
        assert_eq!(
            evaluator.evaluate(&Point3::ORIGIN),
            Err(EvaluatorError::DuplicatePoints { first: 0, second: 7 })
        );
        assert!(evaluator.state() == EvaluatorState::Uninitialized);
    }

    #[test]
    fn conflicting_duplicates_fail_the_solve() {
        let (mut points, mut labels) = TestShapes::sphere();
        points.push(points[0]);
        labels.push(Label::In);

        let mut evaluator = VariationalRbfEvaluator::builder(points, &labels)
            .settings(EvaluatorSettings::builder().test_unique(false).build())
            .build()
            .unwrap();

        let err = evaluator.compute().unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::SingularSystem { .. } | EvaluatorError::IllConditioned { .. }
        ));
        assert!(evaluator.weights().is_none());
    }

    #[test]
    fn progress_reports_assembly_and_solve() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = seen.clone();

        let (sink, handle) = closure_sink(16, move |msg| {
            let tag = match msg {
                ProgressMsg::SystemAssembled { size } => format!("assembled {}", size),
                ProgressMsg::SystemSolved { size, solver, .. } => {
                    format!("solved {} {}", size, solver)
                }
                ProgressMsg::Invalidated => "invalidated".to_string(),
                ProgressMsg::Message { message } => message,
            };
            seen_in_handler.lock().unwrap().push(tag);
        });

        let (points, labels) = TestShapes::sphere();
        let mut evaluator = VariationalRbfEvaluator::builder(points, &labels)
            .progress_callback(sink)
            .build()
            .unwrap();

        evaluator.evaluate(&Point3::ORIGIN).unwrap();
        evaluator.evaluate(&Point3::ORIGIN).unwrap();
        evaluator.invalidate();
        drop(evaluator);
        handle.join().unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["assembled 11", "solved 11 lblt", "invalidated"]
        );
    }

    #[test]
    fn model_round_trip() {
        let (points, labels) = TestShapes::random_sphere(10, 1.0, 5);
        let mut evaluator = VariationalRbfEvaluator::new(points, &labels).unwrap();
        let path = temp_path("round_trip");

        assert!(matches!(
            evaluator.save_model(&path),
            Err(ModelIOError::NotFitted { .. })
        ));

        evaluator.compute().unwrap();
        evaluator.save_model(&path).unwrap();

        let mut loaded = VariationalRbfEvaluator::load_model(&path, None).unwrap();
        assert!(loaded.state() == EvaluatorState::Ready);
        assert!(loaded.weights() == evaluator.weights());
        assert!(loaded.settings() == evaluator.settings());

        let p = Point3::new(0.2, -0.4, 0.9);
        assert!(loaded.evaluate(&p).unwrap() == evaluator.evaluate(&p).unwrap());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_foreign_format() {
        let path = temp_path("foreign");
        std::fs::write(
            &path,
            r#"{"format":"other.json","version":1,"points":[],"labels":[],
                "settings":{"kernel_type":"Cubic","solver_type":"Lblt","residual_tolerance":1e-6,"test_unique":true},
                "weights":[]}"#,
        )
        .unwrap();

        assert!(matches!(
            VariationalRbfEvaluator::load_model(&path, None),
            Err(ModelIOError::FormatMismatch { .. })
        ));

        let _ = std::fs::remove_file(&path);
    }
}
