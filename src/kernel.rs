// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-cell computation.  Nothing in here knows about threads;
//! every function is pure and reads only the parameters it is given,
//! which is what lets the strategies call it from anywhere.

use image::Rgba;
use num::Complex;

use crate::params::GridParams;

/// The colour of a point that never escaped.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Anything that can colour a cell of the grid.  The strategies are
/// generic over this so that they can be handed the real escape-time
/// kernel or, in tests, something that makes the placement of every
/// write easy to check.
pub trait Kernel: Sync {
    /// The colour of the cell at (column, row).
    fn shade(&self, column: usize, row: usize) -> Rgba<u8>;
}

impl Kernel for GridParams {
    #[inline]
    fn shade(&self, column: usize, row: usize) -> Rgba<u8> {
        colour_of(iterate(column, row, self), self)
    }
}

impl<F> Kernel for F
where
    F: Fn(usize, usize) -> Rgba<u8> + Sync,
{
    #[inline]
    fn shade(&self, column: usize, row: usize) -> Rgba<u8> {
        self(column, row)
    }
}

/// Maps a pixel of the integral plane onto the complex plane using
/// the zoom and offset of the parameters.  The horizontal axis is
/// stretched by half again so that the whole set fits a square grid.
pub fn pixel_to_point(column: usize, row: usize, params: &GridParams) -> Complex<f64> {
    let width = params.width as f64;
    let height = params.height as f64;
    Complex::new(
        1.5 * (column as f64 - width / 2.0) / (0.5 * width * params.zoom) + params.move_x,
        (row as f64 - height / 2.0) / (0.5 * params.zoom * height) + params.move_y,
    )
}

/// This is the classic escape-time loop: starting at zero, square and
/// add until the point leaves the circle described by the complexity
/// or the iteration cap is reached.  Returns the number of iterations
/// performed, so a result equal to `max_iteration` means the point is
/// (as far as we can tell) inside the set.
pub fn iterate(column: usize, row: usize, params: &GridParams) -> u32 {
    let c = pixel_to_point(column, row, params);
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut count = 0;
    while z.norm_sqr() < params.complexity && count < params.max_iteration {
        z = z * z + c;
        count += 1;
    }
    count
}

/// Converts a ramp value into a channel: truncate toward zero, then
/// keep the low eight bits.  Values past 255 wrap around, which is
/// what gives the rendered image its repeating bands.
#[inline]
fn channel(value: f64) -> u8 {
    value as i64 as u8
}

/// Maps an iteration count onto a colour.  Points in the set are
/// black; the first half of the range ramps from black toward red,
/// and the second half ramps from red toward white.  The bands switch
/// at `max_iteration / 2 - 1`, and that comparison is strict.
pub fn colour_of(count: u32, params: &GridParams) -> Rgba<u8> {
    if count == params.max_iteration {
        return BLACK;
    }

    let ramp = channel(
        f64::from(count) / f64::from(params.max_iteration.saturating_sub(1)) * 255.0 * 15.0,
    );

    if i64::from(count) < i64::from(params.max_iteration) / 2 - 1 {
        Rgba([ramp, 0, 0, 255])
    } else {
        Rgba([255, ramp, ramp, 255])
    }
}
