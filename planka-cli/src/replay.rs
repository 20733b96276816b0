//! Run a scan trace through the keyboard core against a simulated matrix.

use std::io::Write;

use anyhow::Result;
use log::info;
use planka_keymap::planka::KEYMAP;
use planka_keymap::{
    Config, Debounce, EventSink, HidEvent, Keyboard, NoDelay, Simulated, COLS, ROWS,
};

use crate::trace::Step;

/// Collects events together with the scan they came out of.
#[derive(Default)]
struct Recorder {
    scan: usize,
    events: Vec<(usize, HidEvent)>,
}

impl EventSink for Recorder {
    fn emit(&mut self, event: HidEvent) {
        self.events.push((self.scan, event));
    }
}

fn describe(event: HidEvent) -> String {
    match event {
        HidEvent::KeyDown(kc) => format!("key down  {:?}", kc),
        HidEvent::KeyUp(kc) => format!("key up    {:?}", kc),
        HidEvent::ModsDown(mods) => format!("mods down {:?}", mods),
        HidEvent::ModsUp(mods) => format!("mods up   {:?}", mods),
    }
}

/// Replay `steps`, writing one line per event, the matrix on every commit
/// if `dump` is set, and the final layer state.
pub fn run<W: Write>(steps: &[Step], config: &Config, dump: bool, out: &mut W) -> Result<()> {
    let mut kb = Keyboard::<_, _, ROWS, COLS>::new(Simulated::<ROWS>::new(), NoDelay, KEYMAP, config);
    kb.init();

    let mut recorder = Recorder::default();
    let mut commits = 0;
    for step in steps {
        let lines = kb.matrix_mut().lines_mut();
        lines.open_all();
        for &(row, col) in &step.closed {
            lines.close(row, col);
        }

        for _ in 0..step.scans {
            if kb.task(&mut recorder) == Debounce::Committed {
                commits += 1;
                if dump {
                    let mut text = String::new();
                    kb.matrix().debug_dump(&mut text)?;
                    write!(out, "{text}")?;
                }
            }
            for (scan, event) in recorder.events.drain(..) {
                writeln!(out, "{scan:6}  {}", describe(event))?;
            }
            recorder.scan += 1;
        }
    }

    info!("{} scans, {} commits", recorder.scan, commits);
    let state = kb.layer_state();
    writeln!(
        out,
        "layers {:08X}, default layer {}",
        state.bits(),
        state.default_layer()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace;
    use planka_keymap::Rollover;
    use pretty_assertions::assert_eq;

    fn replay(text: &str, config: &Config) -> String {
        let steps = trace::parse(text).unwrap();
        let mut out = Vec::new();
        run(&steps, config, false, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tap_and_hold() {
        let out = replay("6\n10 1:0\n10\n300 1:0\n10\n", &Config::DEFAULT);
        assert_eq!(
            out,
            "    21  key down  Tab\n\
             \x20   21  key up    Tab\n\
             \x20  230  mods down Mods(LALT)\n\
             \x20  331  mods up   Mods(LALT)\n\
             layers 00000000, default layer 0\n"
        );
    }

    #[test]
    fn layout_switch_sticks() {
        // fn2 goes up before fn1 so each release takes its own layer out.
        let trace = "6\n10 4:4\n10 4:4 4:9\n10 4:4 4:9 0:2\n10 4:4\n10\n";
        let out = replay(trace, &Config::DEFAULT);
        assert!(out.ends_with("layers 00000000, default layer 2\n"), "{out}");
    }

    #[test]
    fn rollover_policy_changes_the_outcome() {
        let trace = "6\n10 1:0\n10 1:0 1:2\n10 1:2\n10\n";
        let tap = Config {
            rollover: Rollover::HoldOnOtherKeyTap,
            ..Config::DEFAULT
        };
        let out = replay(trace, &tap);
        assert!(out.contains("key down  Tab"), "{out}");
        assert!(!out.contains("mods down"), "{out}");

        let out = replay(trace, &Config::DEFAULT);
        assert!(out.contains("mods down Mods(LALT)"), "{out}");
    }

    #[test]
    fn dump_on_commit() {
        let steps = trace::parse("6\n6 2:3").unwrap();
        let mut out = Vec::new();
        run(&steps, &Config::DEFAULT, true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("r/c 0123456789ABCDEF").count(), 2);
        assert!(out.contains("02: 0001000000000000\n"), "{out}");
    }
}
