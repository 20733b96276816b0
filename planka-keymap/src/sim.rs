//! Host-side stand-ins for the board: an in-memory switch matrix and a delay
//! that returns immediately. Used by the trace replay tool and the tests.

use embedded_hal::delay::DelayNs;

use crate::lines::LineDriver;
use crate::matrix::MatrixRow;

/// A switch matrix held in memory.
///
/// Switches are wired like the real board: a closed switch connects its
/// column to its row, so the row reads low while that column is selected.
/// There are no diodes to model, and no ghosting either.
#[derive(Clone, Debug)]
pub struct Simulated<const ROWS: usize> {
    closed: [MatrixRow; ROWS],
    selected: Option<usize>,
}

impl<const ROWS: usize> Simulated<ROWS> {
    pub const fn new() -> Self {
        Self {
            closed: [0; ROWS],
            selected: None,
        }
    }

    /// Close the switch at (row, col).
    pub fn close(&mut self, row: usize, col: usize) {
        self.closed[row] |= 1 << col;
    }

    /// Open the switch at (row, col).
    pub fn open(&mut self, row: usize, col: usize) {
        self.closed[row] &= !(1 << col);
    }

    /// Open every switch.
    pub fn open_all(&mut self) {
        self.closed = [0; ROWS];
    }

    pub fn is_closed(&self, row: usize, col: usize) -> bool {
        self.closed[row] & (1 << col) != 0
    }
}

impl<const ROWS: usize> Default for Simulated<ROWS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize> LineDriver for Simulated<ROWS> {
    fn init(&mut self) {
        self.selected = None;
    }

    fn select(&mut self, col: usize) {
        self.selected = Some(col);
    }

    fn release(&mut self, col: usize) {
        if self.selected == Some(col) {
            self.selected = None;
        }
    }

    fn read(&mut self, row: usize) -> bool {
        match self.selected {
            Some(col) => !self.is_closed(row, col),
            None => true,
        }
    }
}

/// Delay that does not wait.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
