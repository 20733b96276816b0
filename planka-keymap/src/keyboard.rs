//! One scan-and-resolve cycle per call: the glue between the matrix and the
//! executor.

use embedded_hal::delay::DelayNs;

use crate::debounce::Debounce;
use crate::layer::{Keymap, LayerState};
use crate::lines::LineDriver;
use crate::matrix::{Matrix, Snapshot};
use crate::process::{EventSink, KeyEvent, Processor};
use crate::Config;

pub struct Keyboard<'k, L, D, const ROWS: usize, const COLS: usize> {
    matrix: Matrix<L, D, ROWS, COLS>,
    keymap: Keymap<'k, ROWS, COLS>,
    processor: Processor<ROWS, COLS>,
    /// Snapshot the last events were generated against.
    previous: Snapshot<ROWS>,
}

impl<'k, L, D, const ROWS: usize, const COLS: usize> Keyboard<'k, L, D, ROWS, COLS>
where
    L: LineDriver,
    D: DelayNs,
{
    pub fn new(lines: L, delay: D, keymap: Keymap<'k, ROWS, COLS>, config: &Config) -> Self {
        Self {
            matrix: Matrix::new(lines, delay, config),
            keymap,
            processor: Processor::new(config),
            previous: Snapshot::empty(),
        }
    }

    pub fn init(&mut self) {
        self.matrix.init();
    }

    /// Scan once, turn a newly committed snapshot into key events, then let
    /// one millisecond pass on the executor clock.
    pub fn task<S: EventSink>(&mut self, sink: &mut S) -> Debounce {
        let status = self.matrix.scan();

        if self.matrix.is_modified() {
            let current = *self.matrix.state();
            for row in 0..ROWS {
                let changed = current.row(row) ^ self.previous.row(row);
                if changed == 0 {
                    continue;
                }
                for col in 0..COLS {
                    if changed & (1 << col) == 0 {
                        continue;
                    }
                    // ROWS and COLS are at most 16.
                    let event = KeyEvent {
                        row: row as u8,
                        col: col as u8,
                        pressed: current.is_on(row, col),
                    };
                    self.processor.process(&self.keymap, event, sink);
                }
            }
            self.previous = current;
        }

        self.processor.tick(&self.keymap, 1, sink);
        status
    }

    pub fn matrix(&self) -> &Matrix<L, D, ROWS, COLS> {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut Matrix<L, D, ROWS, COLS> {
        &mut self.matrix
    }

    pub fn keymap(&self) -> &Keymap<'k, ROWS, COLS> {
        &self.keymap
    }

    pub fn layer_state(&self) -> &LayerState {
        self.processor.layer_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::Keycode::{self, *};
    use crate::layer::Layer;
    use crate::process::HidEvent::{self, KeyDown, KeyUp};
    use crate::sim::{NoDelay, Simulated};
    use crate::Action;
    use heapless::Vec;
    use pretty_assertions::assert_eq;

    static LAYERS: [Option<Layer<2, 3>>; 1] = [Some([[A, B, C], [D, E, Keycode::No]])];

    fn keyboard() -> TestBoard {
        static NO_FNS: [Action; 0] = [];
        let mut kb = Keyboard::new(
            Simulated::new(),
            NoDelay,
            Keymap::new(&LAYERS, &NO_FNS),
            &Config::DEFAULT,
        );
        kb.init();
        kb
    }

    type TestBoard = Keyboard<'static, Simulated<2>, NoDelay, 2, 3>;

    fn run(kb: &mut TestBoard, scans: usize) -> Vec<HidEvent, 16> {
        let mut events = Vec::new();
        for _ in 0..scans {
            kb.task(&mut events);
        }
        events
    }

    #[test]
    fn events_follow_commits_in_row_major_order() {
        let mut kb = keyboard();
        kb.matrix_mut().lines_mut().close(1, 0);
        kb.matrix_mut().lines_mut().close(0, 2);
        kb.matrix_mut().lines_mut().close(0, 1);

        assert!(run(&mut kb, 5).is_empty());
        assert_eq!(run(&mut kb, 1), [KeyDown(B), KeyDown(C), KeyDown(D)]);

        kb.matrix_mut().lines_mut().open(0, 2);
        assert_eq!(run(&mut kb, 10), [KeyUp(C)]);
        assert_eq!(kb.matrix().key_count(), 2);
    }

    #[test]
    fn unmapped_position_emits_nothing() {
        let mut kb = keyboard();
        kb.matrix_mut().lines_mut().close(1, 2);
        assert!(run(&mut kb, 8).is_empty());
        assert!(kb.matrix().is_on(1, 2));
    }
}
