// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains GridParams, the one immutable description of a render.
//! It is constructed once (usually from the command line), validated,
//! and then passed by reference to every strategy, worker and kernel
//! call that needs it.  There is no global configuration.

use failure::Fail;

/// The number of workers the pool strategies use when nobody says
/// otherwise.
pub const DEFAULT_WORKERS: usize = 8;

/// Everything that can be wrong with a set of parameters.  All of
/// these are reported before a single task is spawned.
#[derive(Debug, Fail, PartialEq)]
pub enum ParamsError {
    /// The iteration cap must allow at least one iteration.
    #[fail(display = "max iteration count must be at least 1")]
    ZeroMaxIteration,

    /// The escape radius (squared) must be a positive, finite number.
    #[fail(display = "complexity must be positive and finite, got {}", _0)]
    BadComplexity(f64),

    /// A zero zoom would divide the plane by zero.
    #[fail(display = "zoom must be non-zero and finite, got {}", _0)]
    BadZoom(f64),

    /// The offset must be a real point.
    #[fail(display = "offset must be finite, got ({}, {})", _0, _1)]
    BadOffset(f64, f64),

    /// The grid would not fit in memory addressable by this machine.
    #[fail(display = "grid of {}x{} cells is too large", _0, _1)]
    TooLarge(usize, usize),

    /// Pool strategies need somebody to do the work.
    #[fail(display = "worker count must be at least 1")]
    NoWorkers,
}

/// The parameters of a single render.  Width and height describe the
/// integral plane, zoom and the two offsets position it over the
/// complex plane, and complexity and max_iteration bound the
/// escape-time loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridParams {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Magnification; 1.0 shows the whole set.
    pub zoom: f64,
    /// Horizontal offset applied after scaling.
    pub move_x: f64,
    /// Vertical offset applied after scaling.
    pub move_y: f64,
    /// The squared escape radius.
    pub complexity: f64,
    /// The iteration cap; points that reach it are in the set.
    pub max_iteration: u32,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            width: 2048,
            height: 2048,
            zoom: 1.0,
            move_x: 0.0,
            move_y: 0.0,
            complexity: 4.0,
            max_iteration: 1000,
        }
    }
}

impl GridParams {
    /// The same parameters, resized.  The benchmark harness uses this
    /// to walk a template across its matrix of sizes.
    pub fn with_size(self, width: usize, height: usize) -> Self {
        GridParams {
            width,
            height,
            ..self
        }
    }

    /// The total number of cells in the grid.
    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Checks every range the kernel and the grid depend upon.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_iteration == 0 {
            return Err(ParamsError::ZeroMaxIteration);
        }
        if !(self.complexity.is_finite() && self.complexity > 0.0) {
            return Err(ParamsError::BadComplexity(self.complexity));
        }
        if !self.zoom.is_finite() || self.zoom == 0.0 {
            return Err(ParamsError::BadZoom(self.zoom));
        }
        if !(self.move_x.is_finite() && self.move_y.is_finite()) {
            return Err(ParamsError::BadOffset(self.move_x, self.move_y));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(ParamsError::TooLarge(self.width, self.height));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GridParams::default().validate(), Ok(()));
    }

    #[test]
    fn empty_grids_are_valid() {
        let params = GridParams::default().with_size(0, 17);
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.cells(), 0);
    }

    #[test]
    fn rejects_zero_iterations() {
        let params = GridParams {
            max_iteration: 0,
            ..GridParams::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroMaxIteration));
    }

    #[test]
    fn rejects_bad_complexity() {
        for &complexity in &[0.0, -4.0, std::f64::NAN, std::f64::INFINITY] {
            let params = GridParams {
                complexity,
                ..GridParams::default()
            };
            assert!(params.validate().is_err(), "accepted {}", complexity);
        }
    }

    #[test]
    fn rejects_zero_zoom() {
        let params = GridParams {
            zoom: 0.0,
            ..GridParams::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::BadZoom(0.0)));
    }

    #[test]
    fn rejects_overflowing_grids() {
        let params = GridParams::default().with_size(usize::max_value(), 2);
        assert_eq!(
            params.validate(),
            Err(ParamsError::TooLarge(usize::max_value(), 2))
        );
    }

    #[test]
    fn errors_describe_themselves() {
        assert_eq!(
            ParamsError::BadZoom(0.0).to_string(),
            "zoom must be non-zero and finite, got 0"
        );
    }
}
