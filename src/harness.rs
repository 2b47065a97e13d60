// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Runs a set of strategies over a matrix of square grid sizes and
//! records how long each one took.  The report is plain text, one
//! `strategy size nanoseconds` line per measurement, so that it can be
//! fed straight to a plotting script.

use failure::Fail;
use itertools::iproduct;
use log::{debug, info};
use std::fmt;
use std::time::{Duration, Instant};

use crate::params::{GridParams, ParamsError, DEFAULT_WORKERS};
use crate::strategies::Strategy;

/// What can stop a benchmark run.
#[derive(Debug, Fail)]
pub enum HarnessError {
    /// The template or the worker count was invalid.
    #[fail(display = "{}", _0)]
    Params(#[cause] ParamsError),

    /// A strategy disagreed with the sequential baseline.
    #[fail(
        display = "{} differs from the baseline at ({}, {}) on a {}x{} grid",
        strategy, column, row, size, size
    )]
    Mismatch {
        /// The strategy that disagreed.
        strategy: Strategy,
        /// The side of the grid.
        size: usize,
        /// The first column that disagreed.
        column: usize,
        /// The first row that disagreed.
        row: usize,
    },

    /// There was nothing to measure.
    #[fail(display = "no rounds to run")]
    NoRounds,
}

impl From<ParamsError> for HarnessError {
    fn from(e: ParamsError) -> Self {
        HarnessError::Params(e)
    }
}

/// Describes a benchmark run.
#[derive(Clone, Debug)]
pub struct Matrix {
    /// Grid sides to try; every grid is square.
    pub sizes: Vec<usize>,
    /// Runs per strategy and size; the fastest is reported.
    pub rounds: usize,
    /// Workers for the pool strategies.
    pub workers: usize,
    /// Everything but the size.
    pub template: GridParams,
    /// Compare every grid against the sequential baseline.
    pub verify: bool,
}

impl Matrix {
    /// Sizes from zero to `max` inclusive, `step` apart.
    pub fn sizes_up_to(max: usize, step: usize) -> Vec<usize> {
        (0..=max).step_by(step.max(1)).collect()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix {
            sizes: Matrix::sizes_up_to(500, 50),
            rounds: 3,
            workers: DEFAULT_WORKERS,
            template: GridParams {
                complexity: 40.0,
                move_x: -0.75,
                ..GridParams::default()
            },
            verify: false,
        }
    }
}

/// One measurement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    /// The strategy measured.
    pub strategy: Strategy,
    /// The side of the grid.
    pub size: usize,
    /// The fastest of the rounds.
    pub elapsed: Duration,
}

/// Every measurement of a run, in the order they were taken.
#[derive(Clone, Debug, Default)]
pub struct Report {
    /// The measurements.
    pub samples: Vec<Sample>,
}

impl Report {
    /// The measurements of one strategy, smallest grid first.
    pub fn series(&self, strategy: Strategy) -> Vec<&Sample> {
        self.samples
            .iter()
            .filter(|sample| sample.strategy == strategy)
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for sample in &self.samples {
            writeln!(
                f,
                "{} {} {}",
                sample.strategy,
                sample.size,
                sample.elapsed.as_nanos()
            )?;
        }
        Ok(())
    }
}

/// Runs every strategy at every size, `rounds` times each.  With
/// verification on, each size first renders a sequential baseline and
/// every other grid must match it cell for cell.
pub fn run(matrix: &Matrix, strategies: &[Strategy]) -> Result<Report, HarnessError> {
    if matrix.rounds == 0 {
        return Err(HarnessError::NoRounds);
    }
    matrix.template.validate()?;
    if matrix.workers == 0 {
        return Err(HarnessError::Params(ParamsError::NoWorkers));
    }

    info!(
        "benchmarking {} strategies over {} sizes with {} workers on {} cpus",
        strategies.len(),
        matrix.sizes.len(),
        matrix.workers,
        num_cpus::get()
    );

    let mut report = Report::default();
    for &size in &matrix.sizes {
        let params = matrix.template.with_size(size, size);
        let baseline = if matrix.verify {
            Some(Strategy::Sequential.run(&params, matrix.workers)?)
        } else {
            None
        };

        for &strategy in strategies {
            let mut fastest = None;
            for _ in 0..matrix.rounds {
                let start = Instant::now();
                let grid = strategy.run(&params, matrix.workers)?;
                let elapsed = start.elapsed();
                fastest = Some(fastest.map_or(elapsed, |best: Duration| best.min(elapsed)));

                if let Some(ref baseline) = baseline {
                    if let Some((column, row)) = grid.first_difference(baseline) {
                        return Err(HarnessError::Mismatch {
                            strategy,
                            size,
                            column,
                            row,
                        });
                    }
                }
            }

            let elapsed = fastest.unwrap_or_default();
            debug!("{} {}x{} best of {}: {:?}", strategy, size, size, matrix.rounds, elapsed);
            report.samples.push(Sample {
                strategy,
                size,
                elapsed,
            });
        }
    }
    Ok(report)
}

/// Every pairing of strategy and size the matrix will measure, in
/// the order `run` measures them.
pub fn plan(matrix: &Matrix, strategies: &[Strategy]) -> Vec<(usize, Strategy)> {
    iproduct!(matrix.sizes.iter().cloned(), strategies.iter().cloned()).collect()
}
