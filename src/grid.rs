// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Grid, the output surface every strategy fills in.
//!
//! Each cell is a single atomic word: the low 32 bits hold the RGBA
//! colour and bit 32 records that the cell has been written.  Writing
//! is one `swap`, so any number of threads may fill distinct cells at
//! the same time without a lock, and a second write to the same cell
//! is caught by the bit it finds already set.  The strategies
//! guarantee, by the way they partition work, that this never
//! happens; if it does, it is a bug, and the grid panics.

use image::Rgba;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const WRITTEN: u64 = 1 << 32;

fn pack(colour: Rgba<u8>) -> u64 {
    WRITTEN | u64::from(u32::from_le_bytes(colour.0))
}

fn unpack(cell: u64) -> Rgba<u8> {
    Rgba((cell as u32).to_le_bytes())
}

/// A width × height surface of colours, addressed by (column, row).
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<AtomicU64>,
}

impl Grid {
    /// An unwritten grid of the given size.  Either dimension may be
    /// zero.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..width * height).map(|_| AtomicU64::new(0)).collect();
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, column: usize, row: usize) -> usize {
        assert!(
            column < self.width && row < self.height,
            "cell ({}, {}) is outside of a {}x{} grid",
            column,
            row,
            self.width,
            self.height
        );
        row * self.width + column
    }

    /// Writes the colour of a cell.  Safe to call concurrently for
    /// distinct cells.  Panics if the cell is out of bounds or has
    /// already been written.
    pub fn set(&self, column: usize, row: usize, colour: Rgba<u8>) {
        let previous = self.cells[self.offset(column, row)].swap(pack(colour), Ordering::Relaxed);
        assert!(
            previous & WRITTEN == 0,
            "cell ({}, {}) was written twice",
            column,
            row
        );
    }

    /// Reads the colour of a cell.  Panics if the cell is out of bounds
    /// or has not been written yet.
    pub fn get(&self, column: usize, row: usize) -> Rgba<u8> {
        let cell = self.cells[self.offset(column, row)].load(Ordering::Relaxed);
        assert!(
            cell & WRITTEN != 0,
            "cell ({}, {}) was read before it was written",
            column,
            row
        );
        unpack(cell)
    }

    /// True once every cell has been written.
    pub fn is_complete(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.load(Ordering::Relaxed) & WRITTEN != 0)
    }

    /// The first cell, in row-major order, where two grids disagree.
    /// Grids of different shapes disagree at (0, 0).
    pub fn first_difference(&self, other: &Grid) -> Option<(usize, usize)> {
        if self.width != other.width || self.height != other.height {
            return Some((0, 0));
        }
        self.cells
            .iter()
            .zip(other.cells.iter())
            .position(|(a, b)| a.load(Ordering::Relaxed) != b.load(Ordering::Relaxed))
            .map(|offset| (offset % self.width, offset / self.width))
    }

    /// The whole grid as row-major RGBA8 bytes, the layout image
    /// encoders expect.  Panics if any cell is unwritten.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() * 4);
        for row in 0..self.height {
            for column in 0..self.width {
                bytes.extend_from_slice(&self.get(column, row).0);
            }
        }
        bytes
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Grid) -> bool {
        self.first_difference(other).is_none()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("complete", &self.is_complete())
            .finish()
    }
}
