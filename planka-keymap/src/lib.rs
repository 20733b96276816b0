//! Keyboard core for the Planka: matrix scanning, debouncing, layers and
//! action execution, plus the Planka keymap itself.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool. Board access goes through
//! [`LineDriver`] and `embedded-hal`'s `DelayNs`, so the whole pipeline also
//! runs on the host against a [`Simulated`] matrix.

#![cfg_attr(not(test), no_std)]

pub mod action;
pub mod debounce;
pub mod keyboard;
pub mod keycode;
pub mod layer;
pub mod lines;
pub mod matrix;
pub mod planka;
pub mod process;
pub mod report;
pub mod sim;

pub use action::{Action, BitOp, On};
pub use debounce::{Debounce, Debouncer, DEBOUNCE_THRESHOLD};
pub use keyboard::Keyboard;
pub use keycode::{Keycode, Mods};
pub use layer::{Keymap, Layer, LayerState, MAX_LAYERS};
pub use lines::{LineDriver, PinLines};
pub use matrix::{Matrix, MatrixRow, Snapshot};
pub use process::{EventSink, HidEvent, KeyEvent, Processor, Rollover};
pub use report::{KeyboardReport, ReportBuilder};
pub use sim::{NoDelay, Simulated};

/// Number of rows in the matrix.
pub const ROWS: usize = 5;
/// Number of columns in the matrix.
pub const COLS: usize = 14;

/// Microseconds a selected column is given before its rows are sampled.
pub const SETTLE_US: u32 = 3;
/// How long a dual-role key may be held and still count as a tap.
pub const TAPPING_TERM_MS: u16 = 200;

/// Build-time tuning of the scan and the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Unchanged scans needed before a change is committed.
    pub debounce: u8,
    pub settle_us: u32,
    pub tapping_term_ms: u16,
    pub rollover: Rollover,
}

impl Config {
    pub const DEFAULT: Config = Config {
        debounce: DEBOUNCE_THRESHOLD,
        settle_us: SETTLE_US,
        tapping_term_ms: TAPPING_TERM_MS,
        rollover: Rollover::HoldOnOtherKeyPress,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
