//! Column/row line access.
//!
//! The scanner only ever talks to a [`LineDriver`]; which port bit backs
//! which line is board data kept behind this trait.

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::matrix::MatrixRow;

/// Physical selection and sampling of the matrix lines.
///
/// Columns are driven, rows are read. `read` returns the raw logic level:
/// `true` = high. With the usual pull-up wiring a closed switch on the
/// selected column pulls its row low.
pub trait LineDriver {
    /// One-time setup: rows as inputs, all columns released.
    fn init(&mut self);

    /// Drive column `col` to its active level.
    fn select(&mut self, col: usize);

    /// Return column `col` to inactive / high impedance.
    fn release(&mut self, col: usize);

    /// Sample row `row`.
    fn read(&mut self, row: usize) -> bool;

    /// Sample rows `0..rows` into a bit vector of logic levels (bit n = row n).
    ///
    /// Boards whose rows share a port should override this with a single
    /// port read.
    fn read_rows(&mut self, rows: usize) -> MatrixRow {
        let mut levels = 0;
        for row in 0..rows {
            if self.read(row) {
                levels |= 1 << row;
            }
        }
        levels
    }
}

/// Line driver over `embedded-hal` pins.
///
/// Columns are active low; a released column is driven high since
/// `OutputPin` has no high-impedance state. Rows need pull-ups.
pub struct PinLines<C, R, const ROWS: usize, const COLS: usize> {
    cols: [C; COLS],
    rows: [R; ROWS],
}

impl<C, R, const ROWS: usize, const COLS: usize> PinLines<C, R, ROWS, COLS>
where
    C: OutputPin<Error = Infallible>,
    R: InputPin<Error = Infallible>,
{
    pub fn new(cols: [C; COLS], rows: [R; ROWS]) -> Self {
        Self { cols, rows }
    }
}

impl<C, R, const ROWS: usize, const COLS: usize> LineDriver for PinLines<C, R, ROWS, COLS>
where
    C: OutputPin<Error = Infallible>,
    R: InputPin<Error = Infallible>,
{
    fn init(&mut self) {
        for col in 0..COLS {
            self.release(col);
        }
    }

    fn select(&mut self, col: usize) {
        self.cols[col].set_low().unwrap_or_else(|e| match e {});
    }

    fn release(&mut self, col: usize) {
        self.cols[col].set_high().unwrap_or_else(|e| match e {});
    }

    fn read(&mut self, row: usize) -> bool {
        self.rows[row].is_high().unwrap_or_else(|e| match e {})
    }
}
