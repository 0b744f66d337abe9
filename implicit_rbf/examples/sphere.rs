/////////////////////////////////////////////////////////////////////////////////////////////
//
// Example fit of the seven point unit sphere, checked at its samples and sampled on a
// 13 x 13 x 13 grid. Optionally reads the samples from a plain point file.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use implicit_rbf::{
    Evaluator, Label, TestShapes, VariationalRbfEvaluator, create_evaluation_grid,
    points_to_csv,
    progress::{ProgressMsg, ProgressSink, closure_sink},
    read_point_file,
};
use implicit_rbf_utils::{BoundingBox, Point3};
use std::{env, sync::Arc};

/// Generates a callback closure_sink
fn get_callback_sink() -> Arc<dyn ProgressSink> {
    let (sink, _listener) = closure_sink(64, |msg| match msg {
        ProgressMsg::SystemAssembled { size } => {
            println!("Assembled {size}x{size} system");
        }
        ProgressMsg::SystemSolved {
            solver,
            residual,
            elapsed,
            ..
        } => {
            println!("Solved with {solver} in {elapsed:?}, relative residual {residual:.3E}");
        }
        ProgressMsg::Invalidated => println!("Evaluator invalidated"),
        ProgressMsg::Message { message } => println!("{message}"),
    });

    sink
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Samples come from a point file when one is given, labelled as the
    // sphere set is: the origin inside, every other point on the boundary.
    let (points, labels, weights) = match env::args().nth(1) {
        Some(path) => {
            let file = read_point_file(&path)?;
            let labels: Vec<Label> = file
                .points
                .iter()
                .map(|p| match *p == Point3::ORIGIN {
                    true => Label::In,
                    false => Label::Boundary,
                })
                .collect();
            (file.points, labels, file.weights)
        }
        None => {
            let (points, labels) = TestShapes::sphere();
            (points, labels, None)
        }
    };

    let mut builder =
        VariationalRbfEvaluator::builder(points.clone(), &labels).progress_callback(get_callback_sink());
    if let Some(weights) = weights {
        println!("Using {} precomputed weights", weights.len());
        builder = builder.weights(weights);
    }
    let mut evaluator = builder.build()?;

    // Every sample should evaluate to its label
    let mut max_error = 0.0f64;
    for (p, l) in points.iter().zip(labels.iter()) {
        let value = evaluator.evaluate(p)?;
        println!("f{} = {:>10.6}    expected {:>2}", p, value, l.value());
        max_error = max_error.max((value - l.value()).abs());
    }
    println!("Largest deviation at the samples: {max_error:.3E}");

    // Sample the field on a 13 x 13 x 13 grid spanning [-6, 6]^3
    let bbox = BoundingBox::new(Point3::splat(-6.0), Point3::splat(6.0))?;
    let grid = create_evaluation_grid(&bbox, [13, 13, 13]);
    let values = evaluator.evaluate_points(&grid)?;

    let inside = values.iter().filter(|v| **v > 0.0).count();
    println!("{} of {} grid points inside", inside, grid.len());

    // z = 0 slice, '#' inside and '.' outside
    let slice = 13 * 13 * 6;
    for j in (0..13).rev() {
        let row: String = (0..13)
            .map(|i| match values[slice + j * 13 + i] > 0.0 {
                true => '#',
                false => '.',
            })
            .collect();
        println!("{row}");
    }

    let out = env::temp_dir().join("implicit_rbf_sphere_grid.csv");
    points_to_csv(&grid, &values, &out)?;
    println!("Wrote grid values to {}", out.display());

    Ok(())
}
