#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time grid benchmark
//!
//! The Mandelbrot set is the set of points on the complex plane for
//! which repeatedly squaring and adding the point never runs off to
//! infinity.  Rendering it means asking that question once per pixel,
//! and since no pixel's answer depends on any other's, it is about as
//! embarrassingly parallel as a workload gets.  That makes it a good
//! yardstick for the *shape* of a parallel program: here the same
//! kernel is driven by six different ways of handing out work, from a
//! plain nested loop to pools of workers pulling cells or rows out of
//! channels, and the benchmark harness measures how each one scales.
//!
//! Whatever the strategy, the result is a Grid in which every cell
//! was written exactly once and which is identical to the one the
//! sequential loop produces.
//!
//! A second, smaller piece, the pipeline, demonstrates a bounded
//! producer/consumer pair whose two halves can be stopped
//! independently.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod cli;
pub mod grid;
pub mod harness;
pub mod kernel;
pub mod params;
pub mod pipeline;
pub mod pool;
pub mod strategies;

pub use grid::Grid;
pub use kernel::{colour_of, iterate, Kernel};
pub use params::{GridParams, ParamsError, DEFAULT_WORKERS};
pub use strategies::Strategy;
