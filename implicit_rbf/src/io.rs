/////////////////////////////////////////////////////////////////////////////////////////////
//
// Reads and writes labelled sample points in the plain point-file and CSV formats.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # io
//!
//! Two text formats are supported.
//!
//! The plain point file holds the point count `n` on the first line, then `n`
//! lines of whitespace separated `x y z` coordinates, then optionally `n + 4`
//! lines with one precomputed weight each.
//!
//! The CSV format holds one `x, y, z, label` row per sample, with the label
//! one of `-1`, `0` or `1`.

use crate::Label;
use csv::{ReaderBuilder, Writer};
use implicit_rbf_utils::Point3;
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Contents of a plain point file.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFile {
    pub points: Vec<Point3>,

    /// Precomputed `n + 4` weights, when the file carries them.
    pub weights: Option<Vec<f64>>,
}

/// Reads a plain point file from `path`.
///
/// ### Errors
/// - `PointFileError::Open` / `Read` on I/O failures.
/// - `PointFileError::Parse` for malformed numbers or short coordinate lines.
/// - `PointFileError::Truncated` when fewer than `n` point lines follow the count.
/// - `PointFileError::WeightCount` when weights are present but not exactly `n + 4`.
pub fn read_point_file<P: AsRef<Path>>(path: P) -> Result<PointFile, PointFileError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| PointFileError::Open {
        path: path_ref.to_path_buf(),
        source: e,
    })?;

    parse_point_file(BufReader::new(file)).map_err(|e| match e {
        PointFileError::Read { source, .. } => PointFileError::Read {
            path: path_ref.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses the plain point file format from any buffered reader.
pub fn parse_point_file<R: BufRead>(reader: R) -> Result<PointFile, PointFileError> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PointFileError::Read {
            path: PathBuf::new(),
            source: e,
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push((idx + 1, trimmed.to_string()));
        }
    }

    let mut lines = lines.into_iter();

    let (count_line, count_text) = lines.next().ok_or(PointFileError::Truncated {
        expected: 1,
        found: 0,
    })?;
    let n: usize = count_text.parse().map_err(|_| PointFileError::Parse {
        line: count_line,
        message: format!("expected a point count, found {:?}", count_text),
    })?;

    let mut points = Vec::with_capacity(n);
    for _ in 0..n {
        let (line_no, text) = lines.next().ok_or(PointFileError::Truncated {
            expected: n,
            found: points.len(),
        })?;

        let coords = text
            .split(|c: char| c == ' ' || c == '\t')
            .filter(|s| !s.is_empty())
            .take(3)
            .map(|s| parse_f64(s, line_no))
            .collect::<Result<Vec<f64>, _>>()?;

        if coords.len() < 3 {
            return Err(PointFileError::Parse {
                line: line_no,
                message: format!("expected 3 coordinates, found {}", coords.len()),
            });
        }

        points.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    let weights = lines
        .map(|(line_no, text)| parse_f64(&text, line_no))
        .collect::<Result<Vec<f64>, _>>()?;

    let weights = match weights.len() {
        0 => None,
        len if len == n + 4 => Some(weights),
        len => {
            return Err(PointFileError::WeightCount {
                expected: n + 4,
                found: len,
            });
        }
    };

    Ok(PointFile { points, weights })
}

fn parse_f64(text: &str, line: usize) -> Result<f64, PointFileError> {
    text.parse::<f64>().map_err(|_| PointFileError::Parse {
        line,
        message: format!("invalid number {:?}", text),
    })
}

/// Load a CSV file of `x, y, z, label` rows into points and labels.
///
/// # Arguments
/// * `file_path` - Path to the CSV file.
/// * `has_headers` - Whether the file has a single header row to skip.
pub fn csv_to_labelled_points<P: AsRef<Path>>(
    file_path: P,
    has_headers: bool,
) -> Result<(Vec<Point3>, Vec<Label>), Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut points = Vec::new();
    let mut labels = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.len() != 4 {
            return Err(format!(
                "expected 4 columns (x, y, z, label), found {}",
                record.len()
            )
            .into());
        }

        let x: f64 = record[0].parse()?;
        let y: f64 = record[1].parse()?;
        let z: f64 = record[2].parse()?;
        let raw: i64 = record[3].parse()?;

        let label = Label::try_from(raw).map_err(|v| format!("invalid label {}", v))?;

        points.push(Point3::new(x, y, z));
        labels.push(label);
    }

    Ok((points, labels))
}

/// Write points and their evaluated values to a CSV file with headers
/// `X, Y, Z, Value`.
pub fn points_to_csv<P: AsRef<Path>>(
    points: &[Point3],
    values: &[f64],
    file_path: P,
) -> Result<(), Box<dyn Error>> {
    if points.len() != values.len() {
        return Err(format!(
            "{} points but {} values",
            points.len(),
            values.len()
        )
        .into());
    }

    let mut wtr = Writer::from_path(file_path)?;

    wtr.write_record(["X", "Y", "Z", "Value"])?;

    for (p, v) in points.iter().zip(values.iter()) {
        wtr.write_record(&[
            p.x().to_string(),
            p.y().to_string(),
            p.z().to_string(),
            v.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Errors raised while reading a plain point file.
#[derive(Debug)]
pub enum PointFileError {
    /// Failed to open the file.
    Open { path: PathBuf, source: io::Error },
    /// Low-level read error.
    Read { path: PathBuf, source: io::Error },
    /// A line could not be parsed.
    Parse { line: usize, message: String },
    /// The file ended before all point lines were read.
    Truncated { expected: usize, found: usize },
    /// Weight lines are present but their number is not `n + 4`.
    WeightCount { expected: usize, found: usize },
}

impl fmt::Display for PointFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointFileError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            PointFileError::Read { path, source } => {
                write!(f, "reading {}: {}", path.display(), source)
            }
            PointFileError::Parse { line, message } => write!(f, "line {}: {}", line, message),
            PointFileError::Truncated { expected, found } => write!(
                f,
                "file ended after {} of {} point lines",
                found, expected
            ),
            PointFileError::WeightCount { expected, found } => {
                write!(f, "found {} weight lines, expected {}", found, expected)
            }
        }
    }
}

impl Error for PointFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PointFileError::Open { source, .. } | PointFileError::Read { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
