//! Key matrix scanning and the committed key state.
//!
//! Every scan sweeps the columns one at a time: select, let the line settle,
//! sample all rows, release. A closed switch pulls its row low, so the raw
//! readings are inverted into "bit set = key down". The raw matrix then goes
//! through the global [`Debouncer`], which owns the snapshot everybody else
//! reads.

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::debounce::{Debounce, Debouncer};
use crate::lines::LineDriver;
use crate::Config;

/// One row of the matrix, one bit per column (bit n = column n).
pub type MatrixRow = u16;

/// Committed key state, one [`MatrixRow`] per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot<const ROWS: usize> {
    rows: [MatrixRow; ROWS],
}

impl<const ROWS: usize> Snapshot<ROWS> {
    pub const fn new(rows: [MatrixRow; ROWS]) -> Self {
        Self { rows }
    }

    /// All keys up.
    pub const fn empty() -> Self {
        Self { rows: [0; ROWS] }
    }

    pub fn is_on(&self, row: usize, col: usize) -> bool {
        self.rows[row] & (1 << col) != 0
    }

    pub fn row(&self, row: usize) -> MatrixRow {
        self.rows[row]
    }

    /// Number of keys down.
    pub fn key_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// Textual snapshot for the debug console: a header line, then for each
    /// row its index in hex and its 16 bits, column 0 first.
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("\nr/c 0123456789ABCDEF\n")?;
        for (index, row) in self.rows.iter().enumerate() {
            write!(out, "{:02X}: ", index)?;
            for col in 0..MatrixRow::BITS {
                out.write_char(if row & (1 << col) != 0 { '1' } else { '0' })?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl<const ROWS: usize> fmt::Display for Snapshot<ROWS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f)
    }
}

/// Scanner plus debouncer over a board's lines.
pub struct Matrix<L, D, const ROWS: usize, const COLS: usize> {
    lines: L,
    delay: D,
    debouncer: Debouncer<ROWS>,
    settle_us: u32,
    modified: bool,
}

impl<L, D, const ROWS: usize, const COLS: usize> Matrix<L, D, ROWS, COLS>
where
    L: LineDriver,
    D: DelayNs,
{
    const FITS: () = assert!(
        ROWS <= MatrixRow::BITS as usize && COLS <= MatrixRow::BITS as usize,
        "matrix rows and columns must fit in a MatrixRow"
    );

    pub fn new(lines: L, delay: D, config: &Config) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        Self {
            lines,
            delay,
            debouncer: Debouncer::new(config.debounce),
            settle_us: config.settle_us,
            modified: false,
        }
    }

    /// Set up the lines. Call once before the first scan.
    pub fn init(&mut self) {
        self.lines.init();
    }

    /// Sweep every column once and return the raw readings, bit set = closed.
    pub fn scan_raw(&mut self) -> [MatrixRow; ROWS] {
        let mut raw = [0; ROWS];
        for col in 0..COLS {
            self.lines.select(col);
            self.delay.delay_us(self.settle_us);
            let levels = self.lines.read_rows(ROWS);
            for (row, bits) in raw.iter_mut().enumerate() {
                if levels & (1 << row) == 0 {
                    *bits |= 1 << col;
                }
            }
            self.lines.release(col);
        }
        raw
    }

    /// One scan through the debouncer. Paces itself by ~1ms while a change
    /// is settling.
    pub fn scan(&mut self) -> Debounce {
        let raw = self.scan_raw();
        let status = self.debouncer.update(&raw);
        self.modified = status == Debounce::Committed;
        if status == Debounce::Settling {
            self.delay.delay_ms(1);
        }
        status
    }

    /// True only if the most recent scan committed a new snapshot.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_on(&self, row: usize, col: usize) -> bool {
        self.debouncer.stable().is_on(row, col)
    }

    pub fn get_row(&self, row: usize) -> MatrixRow {
        self.debouncer.stable().row(row)
    }

    pub fn key_count(&self) -> u32 {
        self.debouncer.stable().key_count()
    }

    pub fn state(&self) -> &Snapshot<ROWS> {
        self.debouncer.stable()
    }

    pub fn debug_dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.debouncer.stable().dump(out)
    }

    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }
}
