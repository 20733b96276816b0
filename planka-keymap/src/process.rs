//! Action execution.
//!
//! Each press resolves its position through the layer stack and records on
//! that position what it did, so the matching release undoes exactly that
//! even when the layers have moved in between. A release whose press left
//! nothing behind (layer bit operations) resolves again against the current
//! layer state.
//!
//! Dual-role keys wait for a tap/hold decision: released within the tapping
//! term they tap their key, otherwise they hold their modifiers. What other
//! keys do during the wait is decided by the [`Rollover`] policy.

use core::mem;

use heapless::{Deque, Vec};
use log::{debug, warn};

use crate::action::Action;
use crate::keycode::{Keycode, Mods};
use crate::layer::{Keymap, LayerState};
use crate::Config;

/// Output towards the host report generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HidEvent {
    KeyDown(Keycode),
    KeyUp(Keycode),
    ModsDown(Mods),
    ModsUp(Mods),
}

/// Consumer of the event stream.
pub trait EventSink {
    fn emit(&mut self, event: HidEvent);
}

impl<const N: usize> EventSink for Vec<HidEvent, N> {
    fn emit(&mut self, event: HidEvent) {
        if self.push(event).is_err() {
            warn!("event buffer full, dropping {:?}", event);
        }
    }
}

/// A debounced edge of one matrix position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn press(row: u8, col: u8) -> Self {
        Self { row, col, pressed: true }
    }

    pub const fn release(row: u8, col: u8) -> Self {
        Self { row, col, pressed: false }
    }

    fn same_key(&self, other: &KeyEvent) -> bool {
        self.row == other.row && self.col == other.col
    }
}

/// What another key does to a dual-role key that is still undecided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rollover {
    /// Any other key pressed during the wait forces hold.
    #[default]
    HoldOnOtherKeyPress,
    /// Other keys are held back during the wait. One of them being pressed
    /// and released before the dual-role key is released forces hold;
    /// releasing the dual-role key first taps it.
    HoldOnOtherKeyTap,
}

/// Events held back while a dual-role key waits.
const PENDING_EVENTS: usize = 8;

/// What a press left on its position, undone by the release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Held {
    Nothing,
    Key(Keycode),
    ModsKey(Mods, Keycode),
    Momentary(u8),
    Undecided,
    Mods(Mods),
}

#[derive(Clone, Copy, Debug)]
struct Waiting {
    row: u8,
    col: u8,
    mods: Mods,
    key: Keycode,
    elapsed: u16,
}

pub struct Processor<const ROWS: usize, const COLS: usize> {
    state: LayerState,
    held: [[Held; COLS]; ROWS],
    waiting: Option<Waiting>,
    pending: Deque<KeyEvent, PENDING_EVENTS>,
    tapping_term: u16,
    rollover: Rollover,
}

impl<const ROWS: usize, const COLS: usize> Processor<ROWS, COLS> {
    pub fn new(config: &Config) -> Self {
        Self {
            state: LayerState::new(),
            held: [[Held::Nothing; COLS]; ROWS],
            waiting: None,
            pending: Deque::new(),
            tapping_term: config.tapping_term_ms,
            rollover: config.rollover,
        }
    }

    pub fn layer_state(&self) -> &LayerState {
        &self.state
    }

    /// Whether a dual-role key is waiting for its tap/hold decision.
    pub fn is_undecided(&self) -> bool {
        self.waiting.is_some()
    }

    /// Handle one key edge.
    pub fn process<S: EventSink>(
        &mut self,
        keymap: &Keymap<'_, ROWS, COLS>,
        event: KeyEvent,
        sink: &mut S,
    ) {
        let Some(waiting) = self.waiting else {
            self.execute(keymap, event, sink);
            return;
        };

        if event.row == waiting.row && event.col == waiting.col {
            if !event.pressed {
                self.tap(waiting, sink);
                self.replay(keymap, sink);
            }
            return;
        }

        match self.rollover {
            Rollover::HoldOnOtherKeyPress => {
                if event.pressed {
                    self.hold(waiting, sink);
                }
                self.execute(keymap, event, sink);
            }
            Rollover::HoldOnOtherKeyTap => {
                let tapped = !event.pressed
                    && self.pending.iter().any(|p| p.pressed && p.same_key(&event));
                if !tapped && (event.pressed || !self.pending.is_empty()) {
                    if self.pending.push_back(event).is_ok() {
                        return;
                    }
                    debug!("pending events full");
                } else if !tapped {
                    // Released, pressed before the dual-role key went down.
                    self.execute(keymap, event, sink);
                    return;
                }
                self.hold(waiting, sink);
                self.replay(keymap, sink);
                self.process(keymap, event, sink);
            }
        }
    }

    /// Advance the tapping-term clock.
    pub fn tick<S: EventSink>(
        &mut self,
        keymap: &Keymap<'_, ROWS, COLS>,
        elapsed_ms: u16,
        sink: &mut S,
    ) {
        let Some(mut waiting) = self.waiting else {
            return;
        };
        waiting.elapsed = waiting.elapsed.saturating_add(elapsed_ms);
        if waiting.elapsed >= self.tapping_term {
            self.hold(waiting, sink);
            self.replay(keymap, sink);
        } else {
            self.waiting = Some(waiting);
        }
    }

    fn execute<S: EventSink>(
        &mut self,
        keymap: &Keymap<'_, ROWS, COLS>,
        event: KeyEvent,
        sink: &mut S,
    ) {
        let (row, col) = (usize::from(event.row), usize::from(event.col));
        if event.pressed {
            self.held[row][col] = self.press(keymap, event, sink);
        } else {
            self.release(keymap, event, sink);
        }
    }

    fn press<S: EventSink>(
        &mut self,
        keymap: &Keymap<'_, ROWS, COLS>,
        event: KeyEvent,
        sink: &mut S,
    ) -> Held {
        let (row, col) = (usize::from(event.row), usize::from(event.col));
        match keymap.resolve(row, col, &self.state) {
            Action::Transparent | Action::Key(Keycode::No) => Held::Nothing,
            Action::Key(kc) => {
                sink.emit(HidEvent::KeyDown(kc));
                Held::Key(kc)
            }
            Action::ModsKey(mods, kc) => {
                sink.emit(HidEvent::ModsDown(mods));
                sink.emit(HidEvent::KeyDown(kc));
                Held::ModsKey(mods, kc)
            }
            Action::ModsTapKey(mods, key) => {
                self.waiting = Some(Waiting {
                    row: event.row,
                    col: event.col,
                    mods,
                    key,
                    elapsed: 0,
                });
                Held::Undecided
            }
            Action::LayerMomentary(layer) => {
                self.state.on(layer);
                Held::Momentary(layer)
            }
            Action::LayerBitOp { op, part, bits, on } => {
                if on.on_press() {
                    self.state.apply(op, part, bits);
                }
                Held::Nothing
            }
            Action::DefaultLayerSet(layer) => {
                self.state.set_default(layer);
                Held::Nothing
            }
        }
    }

    fn release<S: EventSink>(
        &mut self,
        keymap: &Keymap<'_, ROWS, COLS>,
        event: KeyEvent,
        sink: &mut S,
    ) {
        let (row, col) = (usize::from(event.row), usize::from(event.col));
        match mem::replace(&mut self.held[row][col], Held::Nothing) {
            Held::Key(kc) => sink.emit(HidEvent::KeyUp(kc)),
            Held::ModsKey(mods, kc) => {
                sink.emit(HidEvent::KeyUp(kc));
                sink.emit(HidEvent::ModsUp(mods));
            }
            Held::Mods(mods) => sink.emit(HidEvent::ModsUp(mods)),
            Held::Momentary(layer) => {
                let still_held = self
                    .held
                    .iter()
                    .flatten()
                    .any(|h| *h == Held::Momentary(layer));
                if !still_held {
                    self.state.off(layer);
                }
            }
            Held::Undecided => {}
            Held::Nothing => {
                if let Action::LayerBitOp { op, part, bits, on } =
                    keymap.resolve(row, col, &self.state)
                {
                    if on.on_release() {
                        self.state.apply(op, part, bits);
                    }
                }
            }
        }
    }

    fn tap<S: EventSink>(&mut self, waiting: Waiting, sink: &mut S) {
        debug!("tap {:?}", waiting.key);
        self.waiting = None;
        self.held[usize::from(waiting.row)][usize::from(waiting.col)] = Held::Nothing;
        sink.emit(HidEvent::KeyDown(waiting.key));
        sink.emit(HidEvent::KeyUp(waiting.key));
    }

    fn hold<S: EventSink>(&mut self, waiting: Waiting, sink: &mut S) {
        debug!("hold {:?}", waiting.mods);
        self.waiting = None;
        self.held[usize::from(waiting.row)][usize::from(waiting.col)] = Held::Mods(waiting.mods);
        sink.emit(HidEvent::ModsDown(waiting.mods));
    }

    /// Run the held-back events after a decision. Events may be held back
    /// again if one of them starts a new wait.
    fn replay<S: EventSink>(&mut self, keymap: &Keymap<'_, ROWS, COLS>, sink: &mut S) {
        let mut pending = mem::replace(&mut self.pending, Deque::new());
        while let Some(event) = pending.pop_front() {
            self.process(keymap, event, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::On;
    use crate::keycode::Keycode::*;
    use crate::layer::Layer;
    use pretty_assertions::assert_eq;

    use HidEvent::{KeyDown, KeyUp, ModsDown, ModsUp};

    const ___: Keycode = Trans;

    // Row 0: plain keys, row 1: layer keys, row 2: dual-role and mods keys.
    #[rustfmt::skip]
    static LAYERS: [Option<Layer<3, 4>>; 3] = [
        Some([
            [A,   B,   C,   D  ],
            [Fn0, Fn1, Fn2, Fn3],
            [Fn4, Fn5, E,   Fn6],
        ]),
        Some([
            [N1,  ___, ___, ___],
            [___, ___, ___, ___],
            [___, ___, ___, ___],
        ]),
        Some([
            [N2,  N3,  ___, ___],
            [___, ___, ___, ___],
            [___, ___, ___, ___],
        ]),
    ];

    static FN_ACTIONS: [Action; 7] = [
        Action::LayerMomentary(1),
        Action::LayerMomentary(2),
        Action::layer_bit_xor(0, 0b0010, On::Both),
        Action::DefaultLayerSet(2),
        Action::ModsTapKey(Mods::LALT, Tab),
        Action::ModsKey(Mods::LSHIFT, Minus),
        Action::layer_bit_or(0, 0b0100, On::Press),
    ];

    type Events = Vec<HidEvent, 32>;

    struct Rig {
        keymap: Keymap<'static, 3, 4>,
        processor: Processor<3, 4>,
        events: Events,
    }

    impl Rig {
        fn new(rollover: Rollover) -> Self {
            let config = Config {
                tapping_term_ms: 200,
                rollover,
                ..Config::DEFAULT
            };
            Self {
                keymap: Keymap::new(&LAYERS, &FN_ACTIONS),
                processor: Processor::new(&config),
                events: Vec::new(),
            }
        }

        fn press(&mut self, row: u8, col: u8) {
            self.processor
                .process(&self.keymap, KeyEvent::press(row, col), &mut self.events);
        }

        fn release(&mut self, row: u8, col: u8) {
            self.processor
                .process(&self.keymap, KeyEvent::release(row, col), &mut self.events);
        }

        fn wait(&mut self, ms: u16) {
            for _ in 0..ms {
                self.processor.tick(&self.keymap, 1, &mut self.events);
            }
        }

        fn layers(&self) -> u32 {
            self.processor.layer_state().bits()
        }

        fn take(&mut self) -> Events {
            mem::take(&mut self.events)
        }
    }

    #[test]
    fn plain_key_down_and_up() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(0, 0);
        rig.release(0, 0);
        assert_eq!(rig.take(), [KeyDown(A), KeyUp(A)]);
    }

    #[test]
    fn release_undoes_the_press_even_after_a_layer_change() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(0, 0);
        rig.press(1, 0);
        rig.release(0, 0);
        rig.release(1, 0);
        assert_eq!(rig.take(), [KeyDown(A), KeyUp(A)]);
    }

    #[test]
    fn momentary_layer_while_held() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(1, 0);
        assert_eq!(rig.layers(), 0b10);
        rig.press(0, 0);
        rig.release(0, 0);
        rig.release(1, 0);
        assert_eq!(rig.layers(), 0);
        rig.press(0, 0);
        assert_eq!(rig.take(), [KeyDown(N1), KeyUp(N1), KeyDown(A)]);
    }

    #[test]
    fn overlapping_momentary_keys_keep_their_own_layers() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(1, 0);
        rig.press(1, 1);
        assert_eq!(rig.layers(), 0b110);

        rig.release(1, 0);
        assert_eq!(rig.layers(), 0b100);
        rig.press(0, 1);
        assert_eq!(rig.take(), [KeyDown(N3)]);

        rig.release(1, 1);
        assert_eq!(rig.layers(), 0);
    }

    #[test]
    fn two_keys_on_the_same_momentary_layer() {
        static TWIN: [Option<Layer<1, 2>>; 1] = [Some([[Fn0, Fn0]])];
        static FNS: [Action; 1] = [Action::LayerMomentary(3)];
        let keymap = Keymap::new(&TWIN, &FNS);
        let mut processor = Processor::<1, 2>::new(&Config::DEFAULT);
        let mut events = Events::new();

        processor.process(&keymap, KeyEvent::press(0, 0), &mut events);
        processor.process(&keymap, KeyEvent::press(0, 1), &mut events);
        processor.process(&keymap, KeyEvent::release(0, 0), &mut events);
        assert!(processor.layer_state().is_on(3));
        processor.process(&keymap, KeyEvent::release(0, 1), &mut events);
        assert!(!processor.layer_state().is_on(3));
        assert!(events.is_empty());
    }

    #[test]
    fn bit_toggle_on_both_edges() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(1, 2);
        assert_eq!(rig.layers(), 0b10);
        rig.press(0, 0);
        rig.release(1, 2);
        assert_eq!(rig.layers(), 0);
        assert_eq!(rig.take(), [KeyDown(N1)]);
    }

    #[test]
    fn press_only_bit_op_sticks() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(2, 3);
        rig.release(2, 3);
        assert_eq!(rig.layers(), 0b100);
    }

    #[test]
    fn default_layer_set_leaves_overlays_alone() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(1, 0);
        rig.press(1, 3);
        rig.release(1, 3);
        assert_eq!(rig.processor.layer_state().default_layer(), 2);
        assert_eq!(rig.layers(), 0b10);

        // Layer 1 still covers (0, 0); (0, 1) falls to the new default.
        rig.press(0, 0);
        rig.press(0, 1);
        assert_eq!(rig.take(), [KeyDown(N1), KeyDown(N3)]);
    }

    #[test]
    fn mods_key_wraps_the_key_in_modifiers() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(2, 1);
        rig.release(2, 1);
        assert_eq!(
            rig.take(),
            [
                ModsDown(Mods::LSHIFT),
                KeyDown(Minus),
                KeyUp(Minus),
                ModsUp(Mods::LSHIFT),
            ]
        );
    }

    #[test]
    fn quick_release_taps() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(2, 0);
        rig.wait(150);
        assert!(rig.processor.is_undecided());
        rig.release(2, 0);
        assert_eq!(rig.take(), [KeyDown(Tab), KeyUp(Tab)]);
        assert!(!rig.processor.is_undecided());
    }

    #[test]
    fn long_press_holds() {
        let mut rig = Rig::new(Rollover::default());
        rig.press(2, 0);
        rig.wait(199);
        assert!(rig.take().is_empty());
        rig.wait(1);
        assert_eq!(rig.take(), [ModsDown(Mods::LALT)]);
        rig.press(0, 2);
        rig.release(0, 2);
        rig.release(2, 0);
        assert_eq!(
            rig.take(),
            [KeyDown(C), KeyUp(C), ModsUp(Mods::LALT)]
        );
    }

    #[test]
    fn other_press_forces_hold() {
        let mut rig = Rig::new(Rollover::HoldOnOtherKeyPress);
        rig.press(2, 0);
        rig.press(0, 0);
        rig.release(2, 0);
        rig.release(0, 0);
        assert_eq!(
            rig.take(),
            [
                ModsDown(Mods::LALT),
                KeyDown(A),
                ModsUp(Mods::LALT),
                KeyUp(A),
            ]
        );
    }

    #[test]
    fn rolled_key_stays_a_tap_when_only_tap_decides() {
        let mut rig = Rig::new(Rollover::HoldOnOtherKeyTap);
        rig.press(2, 0);
        rig.press(0, 0);
        assert!(rig.take().is_empty());
        rig.release(2, 0);
        rig.release(0, 0);
        assert_eq!(
            rig.take(),
            [KeyDown(Tab), KeyUp(Tab), KeyDown(A), KeyUp(A)]
        );
    }

    #[test]
    fn nested_tap_forces_hold() {
        let mut rig = Rig::new(Rollover::HoldOnOtherKeyTap);
        rig.press(2, 0);
        rig.press(0, 0);
        rig.release(0, 0);
        rig.release(2, 0);
        assert_eq!(
            rig.take(),
            [
                ModsDown(Mods::LALT),
                KeyDown(A),
                KeyUp(A),
                ModsUp(Mods::LALT),
            ]
        );
    }

    #[test]
    fn timeout_replays_held_back_keys_after_the_modifiers() {
        let mut rig = Rig::new(Rollover::HoldOnOtherKeyTap);
        rig.press(2, 0);
        rig.press(0, 3);
        rig.wait(200);
        assert_eq!(rig.take(), [ModsDown(Mods::LALT), KeyDown(D)]);
    }

    #[test]
    fn keys_down_before_the_wait_release_straight_through() {
        let mut rig = Rig::new(Rollover::HoldOnOtherKeyTap);
        rig.press(0, 1);
        rig.press(2, 0);
        rig.release(0, 1);
        assert!(rig.processor.is_undecided());
        rig.release(2, 0);
        assert_eq!(
            rig.take(),
            [KeyDown(B), KeyUp(B), KeyDown(Tab), KeyUp(Tab)]
        );
    }

    #[test]
    fn full_pending_buffer_forces_hold() {
        static WIDE: [Option<Layer<1, 10>>; 1] =
            [Some([[Fn0, A, B, C, D, E, F, G, H, I]])];
        static FNS: [Action; 1] = [Action::ModsTapKey(Mods::LCTRL, Escape)];
        let keymap = Keymap::new(&WIDE, &FNS);
        let config = Config {
            rollover: Rollover::HoldOnOtherKeyTap,
            ..Config::DEFAULT
        };
        let mut processor = Processor::<1, 10>::new(&config);
        let mut events = Events::new();

        processor.process(&keymap, KeyEvent::press(0, 0), &mut events);
        for col in 1..10 {
            processor.process(&keymap, KeyEvent::press(0, col), &mut events);
        }

        assert!(!processor.is_undecided());
        assert_eq!(
            events,
            [
                ModsDown(Mods::LCTRL),
                KeyDown(A),
                KeyDown(B),
                KeyDown(C),
                KeyDown(D),
                KeyDown(E),
                KeyDown(F),
                KeyDown(G),
                KeyDown(H),
                KeyDown(I),
            ]
        );
    }
}
