//! Global debounce logic.
//!
//! A single counter covers the whole matrix: any bit changing anywhere
//! restarts the wait for every key. The committed snapshot only moves once
//! the raw readings have stayed unchanged for `threshold` consecutive scans.
//! A key that keeps bouncing therefore delays every other key as well.

use log::debug;

use crate::matrix::{MatrixRow, Snapshot};

/// Number of unchanged scan cycles required before committing.
/// At ~1ms scan rate, this gives ~5ms debounce time.
pub const DEBOUNCE_THRESHOLD: u8 = 5;

/// Outcome of feeding one raw scan to the [`Debouncer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Debounce {
    /// Nothing pending, nothing changed.
    Idle,
    /// Readings changed recently; the counter is still running.
    Settling,
    /// The counter ran out on this scan and the snapshot was replaced.
    Committed,
}

pub struct Debouncer<const ROWS: usize> {
    /// Latest raw readings.
    debouncing: [MatrixRow; ROWS],
    /// Committed state, replaced as a whole.
    stable: Snapshot<ROWS>,
    counter: u8,
    threshold: u8,
}

impl<const ROWS: usize> Debouncer<ROWS> {
    pub const fn new(threshold: u8) -> Self {
        Self {
            debouncing: [0; ROWS],
            stable: Snapshot::empty(),
            counter: threshold,
            threshold,
        }
    }

    /// Feed one raw scan.
    pub fn update(&mut self, raw: &[MatrixRow; ROWS]) -> Debounce {
        let mut changed = false;
        for (debouncing, &row) in self.debouncing.iter_mut().zip(raw) {
            if *debouncing ^ row != 0 {
                *debouncing = row;
                changed = true;
            }
        }

        if changed {
            if self.counter != 0 {
                debug!("bounce!: {:02X}", self.counter);
            }
            self.counter = self.threshold;
            if self.counter == 0 {
                return self.commit();
            }
            return Debounce::Settling;
        }

        match self.counter {
            0 => Debounce::Idle,
            _ => {
                self.counter -= 1;
                if self.counter == 0 {
                    self.commit()
                } else {
                    Debounce::Settling
                }
            }
        }
    }

    fn commit(&mut self) -> Debounce {
        self.stable = Snapshot::new(self.debouncing);
        debug!("matrix committed, {} keys down", self.stable.key_count());
        Debounce::Committed
    }

    /// The committed snapshot.
    pub fn stable(&self) -> &Snapshot<ROWS> {
        &self.stable
    }
}
