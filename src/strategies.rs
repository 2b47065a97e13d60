// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The six ways of filling a grid.
//!
//! Every strategy calls the same kernel once per cell and produces
//! the same grid; what differs is how the cells are handed out.
//!
//! * `sequential` walks the rows, then the columns, on the calling
//!   thread.
//! * `cell_parallel` spawns one task per cell and waits for all of
//!   them.
//! * `row_parallel` spawns one task per row and waits for all of
//!   them.
//! * `cell_workers` starts a fixed pool of workers and hands them one
//!   cell at a time over a channel with no buffer, so the producer
//!   waits for a free worker on every cell.
//! * `buffered_cell_workers` does the same over a channel big enough
//!   to hold every cell, so the producer never waits.
//! * `buffered_row_workers` hands the pool whole rows instead, over a
//!   channel big enough to hold every row.
//!
//! None of them return until every cell has been written, and an
//! empty grid returns immediately without spawning anything.

use itertools::iproduct;
use log::debug;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Instant;

use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::params::{GridParams, ParamsError};
use crate::pool::{self, Capacity};

/// The baseline: no concurrency at all.
pub fn sequential<K: Kernel>(width: usize, height: usize, kernel: &K) -> Grid {
    let grid = Grid::new(width, height);
    for row in 0..height {
        for column in 0..width {
            grid.set(column, row, kernel.shade(column, row));
        }
    }
    grid
}

/// One task per cell.  The scope is the completion barrier; it does
/// not return until all width × height tasks have finished.
pub fn cell_parallel<K: Kernel>(width: usize, height: usize, kernel: &K) -> Grid {
    let grid = Grid::new(width, height);
    if grid.is_empty() {
        return grid;
    }
    {
        let grid = &grid;
        rayon::scope(|scope| {
            for (row, column) in iproduct!(0..height, 0..width) {
                scope.spawn(move |_| grid.set(column, row, kernel.shade(column, row)));
            }
        });
    }
    grid
}

/// One task per row, joined the same way as `cell_parallel`.
pub fn row_parallel<K: Kernel>(width: usize, height: usize, kernel: &K) -> Grid {
    let grid = Grid::new(width, height);
    if grid.is_empty() {
        return grid;
    }
    {
        let grid = &grid;
        rayon::scope(|scope| {
            for row in 0..height {
                scope.spawn(move |_| fill_row(grid, row, kernel));
            }
        });
    }
    grid
}

fn fill_row<K: Kernel>(grid: &Grid, row: usize, kernel: &K) {
    for column in 0..grid.width() {
        grid.set(column, row, kernel.shade(column, row));
    }
}

fn cells_to_workers<K: Kernel>(
    width: usize,
    height: usize,
    kernel: &K,
    workers: NonZeroUsize,
    capacity: Capacity,
) -> Grid {
    let grid = Grid::new(width, height);
    if grid.is_empty() {
        return grid;
    }
    pool::dispatch(
        workers,
        capacity,
        |tasks| {
            for cell in iproduct!(0..height, 0..width) {
                if tasks.send(cell).is_err() {
                    break;
                }
            }
        },
        |(row, column): (usize, usize)| grid.set(column, row, kernel.shade(column, row)),
    );
    grid
}

/// A pool of workers fed one cell at a time through a channel with no
/// buffer.
pub fn cell_workers<K: Kernel>(
    width: usize,
    height: usize,
    kernel: &K,
    workers: NonZeroUsize,
) -> Grid {
    cells_to_workers(width, height, kernel, workers, Capacity::Handoff)
}

/// A pool of workers fed one cell at a time through a channel that
/// can hold every cell.
pub fn buffered_cell_workers<K: Kernel>(
    width: usize,
    height: usize,
    kernel: &K,
    workers: NonZeroUsize,
) -> Grid {
    cells_to_workers(
        width,
        height,
        kernel,
        workers,
        Capacity::Bounded(width * height),
    )
}

/// A pool of workers fed one row at a time through a channel that can
/// hold every row.  Each worker fills its row completely before taking
/// another.
pub fn buffered_row_workers<K: Kernel>(
    width: usize,
    height: usize,
    kernel: &K,
    workers: NonZeroUsize,
) -> Grid {
    let grid = Grid::new(width, height);
    if grid.is_empty() {
        return grid;
    }
    pool::dispatch(
        workers,
        Capacity::Bounded(height),
        |tasks| {
            for row in 0..height {
                if tasks.send(row).is_err() {
                    break;
                }
            }
        },
        |row: usize| fill_row(&grid, row, kernel),
    );
    grid
}

/// Names one of the six strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// See `sequential`.
    Sequential,
    /// See `cell_parallel`.
    CellParallel,
    /// See `row_parallel`.
    RowParallel,
    /// See `cell_workers`.
    CellWorkers,
    /// See `buffered_cell_workers`.
    BufferedCellWorkers,
    /// See `buffered_row_workers`.
    BufferedRowWorkers,
}

impl Strategy {
    /// Every strategy, baseline first.
    pub const ALL: [Strategy; 6] = [
        Strategy::Sequential,
        Strategy::CellParallel,
        Strategy::RowParallel,
        Strategy::CellWorkers,
        Strategy::BufferedCellWorkers,
        Strategy::BufferedRowWorkers,
    ];

    /// The label used on the command line and in benchmark reports.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "basic",
            Strategy::CellParallel => "pixelParallel",
            Strategy::RowParallel => "rowParallel",
            Strategy::CellWorkers => "workers",
            Strategy::BufferedCellWorkers => "bufferedWorkers",
            Strategy::BufferedRowWorkers => "bufferedRowWorkers",
        }
    }

    /// True for the three strategies built on a worker pool.
    pub fn uses_pool(self) -> bool {
        match self {
            Strategy::CellWorkers | Strategy::BufferedCellWorkers | Strategy::BufferedRowWorkers => {
                true
            }
            _ => false,
        }
    }

    /// Fills a grid with any kernel.  The worker count only matters to
    /// the pool strategies.
    pub fn fill<K: Kernel>(self, width: usize, height: usize, kernel: &K, workers: NonZeroUsize) -> Grid {
        match self {
            Strategy::Sequential => sequential(width, height, kernel),
            Strategy::CellParallel => cell_parallel(width, height, kernel),
            Strategy::RowParallel => row_parallel(width, height, kernel),
            Strategy::CellWorkers => cell_workers(width, height, kernel, workers),
            Strategy::BufferedCellWorkers => buffered_cell_workers(width, height, kernel, workers),
            Strategy::BufferedRowWorkers => buffered_row_workers(width, height, kernel, workers),
        }
    }

    /// Validates the parameters, then renders them with the escape-time
    /// kernel.  Nothing is spawned if the parameters are bad.
    pub fn run(self, params: &GridParams, workers: usize) -> Result<Grid, ParamsError> {
        params.validate()?;
        let workers = NonZeroUsize::new(workers).ok_or(ParamsError::NoWorkers)?;

        let start = Instant::now();
        let grid = self.fill(params.width, params.height, params, workers);
        if self.uses_pool() {
            debug!(
                "{} filled {}x{} with {} workers in {:?}",
                self,
                params.width,
                params.height,
                workers,
                start.elapsed()
            );
        } else {
            debug!(
                "{} filled {}x{} in {:?}",
                self,
                params.width,
                params.height,
                start.elapsed()
            );
        }
        Ok(grid)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .cloned()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
                format!("Unknown strategy '{}', expected one of: {}", s, names.join(", "))
            })
    }
}
