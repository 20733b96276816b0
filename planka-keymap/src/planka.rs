//! The Planka keymap.
//!
//! Five rows of fourteen columns. The bottom row has two positions without a
//! switch (columns 5 and 8), filled with `XXX`.
//!
//! Layers 0 to 2 are the base layouts picked with `DefaultLayerSet`; layers 4
//! to 6 are overlays toggled through bit operations on layer group 1 so that
//! holding fn1 and fn2 together shows a third layer. Layer 3 does not exist.

use crate::action::{Action, On};
use crate::keycode::Keycode::{self, *};
use crate::keycode::Mods;
use crate::layer::{Keymap, Layer};
use crate::{COLS, ROWS};

/// Number of layer slots, including the missing layer 3.
pub const NUM_LAYERS: usize = 8;

/// Fall through to the layer below.
const ___: Keycode = Trans;
/// Position does nothing.
const XXX: Keycode = No;

/// Shorthand aliases for readability.
const ESC: Keycode = Escape;
const BSPC: Keycode = Backspace;
const ENT: Keycode = Enter;
const SPC: Keycode = Space;
const DEL: Keycode = Delete;
const LBRC: Keycode = LBracket;
const RBRC: Keycode = RBracket;
const MINS: Keycode = Minus;
const EQL: Keycode = Equal;
const SCLN: Keycode = Semicolon;
const QUOT: Keycode = Quote;
const COMM: Keycode = Comma;
const SLSH: Keycode = Slash;
const GRV: Keycode = Grave;
const LCTL: Keycode = LCtrl;
const RCTL: Keycode = RCtrl;
const LSFT: Keycode = LShift;
const RSFT: Keycode = RShift;
const LGUI: Keycode = LGui;
const RGHT: Keycode = Right;
const PGUP: Keycode = PageUp;
const PGDN: Keycode = PageDown;
const INS: Keycode = Insert;
const PSCR: Keycode = PrintScreen;
const SLCK: Keycode = ScrollLock;
const PAUS: Keycode = Pause;
const CAPS: Keycode = CapsLock;
const MUTE: Keycode = AudioMute;
const VOLU: Keycode = AudioVolUp;
const VOLD: Keycode = AudioVolDown;
const MPLY: Keycode = MediaPlayPause;
const MPRV: Keycode = MediaPrevTrack;
const MNXT: Keycode = MediaNextTrack;
const MSTP: Keycode = MediaStop;
const PWR: Keycode = SystemPower;
const SLEP: Keycode = SystemSleep;
const WAKE: Keycode = SystemWake;
const KSLS: Keycode = KpSlash;
const KAST: Keycode = KpAsterisk;
const KMNS: Keycode = KpMinus;
const KPLS: Keycode = KpPlus;
const KDOT: Keycode = KpDot;

/// Keymap layers, `[row][col]`.
#[rustfmt::skip]
pub static LAYERS: [Option<Layer<ROWS, COLS>>; NUM_LAYERS] = [
    // Layer 0: native QWERTY
    Some([
        [ESC,  N1,   N2,   N3,   N4,   N5,   Home, RAlt, N6,   N7,   N8,   N9,   N0,   BSPC],
        [Fn10, Q,    W,    E,    R,    T,    LBRC, RBRC, Y,    U,    I,    O,    P,    Fn11],
        [RCTL, A,    S,    D,    F,    G,    MINS, EQL,  H,    J,    K,    L,    SCLN, ENT ],
        [LSFT, Z,    X,    C,    V,    B,    QUOT, DEL,  N,    M,    COMM, Dot,  SLSH, RSFT],
        [LCTL, Fn6,  LGUI, LAlt, Fn1,  XXX,  SPC,  ENT,  XXX,  Fn2,  Left, Down, Up,   RGHT],
    ]),
    // Layer 1: Colemak
    Some([
        [ESC,  N1,   N2,   N3,   N4,   N5,   Home, RAlt, N6,   N7,   N8,   N9,   N0,   BSPC],
        [Fn10, Q,    W,    F,    P,    G,    LBRC, RBRC, J,    L,    U,    Y,    SCLN, Fn11],
        [RCTL, A,    R,    S,    T,    D,    MINS, EQL,  H,    N,    E,    I,    O,    ENT ],
        [LSFT, Z,    X,    C,    V,    B,    QUOT, DEL,  K,    M,    COMM, Dot,  SLSH, RSFT],
        [LCTL, Fn6,  LGUI, LAlt, Fn1,  XXX,  SPC,  ENT,  XXX,  Fn2,  Left, Down, Up,   RGHT],
    ]),
    // Layer 2: Dvorak
    Some([
        [ESC,  N1,   N2,   N3,   N4,   N5,   Home, RAlt, N6,   N7,   N8,   N9,   N0,   BSPC],
        [Fn10, QUOT, COMM, Dot,  P,    Y,    LBRC, RBRC, F,    G,    C,    R,    L,    Fn11],
        [RCTL, A,    O,    E,    U,    I,    MINS, EQL,  D,    H,    T,    N,    S,    ENT ],
        [LSFT, SCLN, Q,    J,    K,    X,    QUOT, DEL,  B,    M,    W,    V,    Z,    RSFT],
        [LCTL, Fn6,  LGUI, LAlt, Fn1,  XXX,  SPC,  ENT,  XXX,  Fn2,  Left, Down, Up,   RGHT],
    ]),
    None,
    // Layer 4: fn1, numpad and shifted symbols
    Some([
        [___,  ___,  ___,  ___,  ___,  ___,  ___,  ___,  ___,  Kp7,  Kp8,  Kp9,  KSLS, ___ ],
        [___,  ___,  ___,  ___,  ___,  ___,  ___,  ___,  ___,  Kp4,  Kp5,  Kp6,  KAST, ___ ],
        [___,  MINS, EQL,  Fn20, Fn21, ___,  ___,  ___,  ___,  Kp1,  Kp2,  Kp3,  KMNS, ___ ],
        [___,  Undo, Again,GRV,  Fn22, ___,  ___,  ___,  ___,  Kp0,  XXX,  KDOT, KPLS, ___ ],
        [___,  ___,  ___,  ___,  Fn1,  XXX,  ___,  BSPC, XXX,  Fn3,  Home, PGDN, PGUP, End ],
    ]),
    // Layer 5: fn2, function keys, editing and media
    Some([
        [F13,  F14,  F15,  F16,  F17,  F18,  XXX,  XXX,  F19,  F20,  F21,  F22,  F23,  F24 ],
        [F1,   F2,   F3,   F4,   F5,   F6,   XXX,  XXX,  F7,   F8,   F9,   F10,  F11,  F12 ],
        [___,  LBRC, RBRC, Fn23, Fn24, XXX,  XXX,  XXX,  GRV,  Fn22, XXX,  XXX,  XXX,  ___ ],
        [___,  DEL,  Cut,  Copy, Paste,Menu, XXX,  XXX,  CAPS, INS,  PSCR, SLCK, PAUS, ___ ],
        [___,  ___,  ___,  ___,  Fn3,  XXX,  DEL,  ___,  XXX,  Fn2,  MUTE, VOLD, VOLU, MPLY],
    ]),
    // Layer 6: fn1+fn2, layout select, international keys and power
    Some([
        [Fn7,  Fn8,  Fn9,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  PWR ],
        [Int1, Int2, Int3, Int4, Int5, Int6, XXX,  XXX,  Lang1,Lang2,Lang3,Lang4,Lang5,SLEP],
        [Int7, Int8, Int9, XXX,  Undo, XXX,  XXX,  XXX,  Lang6,Again,Lang7,Lang8,Lang9,XXX ],
        [___,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  WAKE],
        [___,  ___,  ___,  ___,  Fn4,  XXX,  ___,  ___,  XXX,  Fn5,  MPRV, MPLY, MSTP, MNXT],
    ]),
    // Layer 7: media, held with Fn6
    Some([
        [Fn7,  Fn8,  Fn9,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  PWR ],
        [XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  SLEP],
        [XXX,  XXX,  XXX,  XXX,  Undo, XXX,  XXX,  XXX,  XXX,  Again,XXX,  XXX,  XXX,  XXX ],
        [___,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  XXX,  WAKE],
        [___,  ___,  ___,  ___,  Fn4,  XXX,  ___,  ___,  XXX,  Fn5,  MPRV, MPLY, MSTP, MNXT],
    ]),
];

/// Actions behind `Fn0`..`Fn24`. Unused slots do nothing.
pub static FN_ACTIONS: [Action; 25] = [
    Action::NO,
    // fn1 and fn2 toggle layers 4 and 5 on both edges, so they act as
    // momentary keys. Pressed together they add layer 6, and each one's
    // release takes its own layer back out of group 1.
    Action::layer_bit_xor(1, 0b0001, On::Both),
    Action::layer_bit_xor(1, 0b0010, On::Both),
    Action::layer_bit_or(1, 0b0100, On::Both),
    Action::layer_bit_and(1, 0b1010, On::Both),
    Action::layer_bit_and(1, 0b1001, On::Both),
    Action::LayerMomentary(7),
    Action::DefaultLayerSet(0),
    Action::DefaultLayerSet(1),
    Action::DefaultLayerSet(2),
    Action::ModsTapKey(Mods::LALT, Tab),
    Action::ModsTapKey(Mods::LALT, Backslash),
    Action::NO,
    Action::NO,
    Action::NO,
    Action::NO,
    Action::NO,
    Action::NO,
    Action::NO,
    Action::NO,
    Action::ModsKey(Mods::LSHIFT, Minus),
    Action::ModsKey(Mods::LSHIFT, Equal),
    Action::ModsKey(Mods::LSHIFT, Grave),
    Action::ModsKey(Mods::LSHIFT, LBracket),
    Action::ModsKey(Mods::LSHIFT, RBracket),
];

pub static KEYMAP: Keymap<'static, ROWS, COLS> = Keymap::new(&LAYERS, &FN_ACTIONS);

/// Human-readable layer names, indexed like [`LAYERS`].
pub fn layer_name(layer: usize) -> Option<&'static str> {
    const NAMES: [&str; NUM_LAYERS] = [
        "QWERTY", "Colemak", "Dvorak", "", "Fn1", "Fn2", "Fn1+Fn2", "Media",
    ];
    NAMES.get(layer).copied().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerState;

    #[test]
    fn fn_keys_all_have_actions() {
        for (layer, keys) in LAYERS.iter().enumerate() {
            let Some(keys) = keys else { continue };
            for (row, cols) in keys.iter().enumerate() {
                for (col, kc) in cols.iter().enumerate() {
                    if let Some(index) = kc.fn_index() {
                        assert_ne!(
                            FN_ACTIONS[index],
                            Action::NO,
                            "layer {layer} ({row}, {col})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn missing_switches_are_unmapped_on_every_layer() {
        for keys in LAYERS.iter().flatten() {
            assert_eq!(keys[4][5], No);
            assert_eq!(keys[4][8], No);
        }
    }

    #[test]
    fn layer_three_is_a_hole() {
        assert!(LAYERS[3].is_none());
        assert_eq!(layer_name(3), None);
        assert_eq!(layer_name(2), Some("Dvorak"));
        assert_eq!(layer_name(9), None);
    }

    #[test]
    fn fn1_overlay_is_a_numpad() {
        let fn1 = LayerState::with(1 << 4, 0);
        assert_eq!(KEYMAP.resolve(0, 10, &fn1), Action::Key(Kp8));
        assert_eq!(KEYMAP.resolve(0, 1, &fn1), Action::Key(N1));
        assert_eq!(
            KEYMAP.resolve(2, 3, &fn1),
            Action::ModsKey(Mods::LSHIFT, Minus)
        );
    }

    #[test]
    fn base_layouts() {
        let at = |default| KEYMAP.resolve(1, 1, &LayerState::with(0, default));
        assert_eq!(at(0), Action::Key(Q));
        assert_eq!(at(1), Action::Key(Q));
        assert_eq!(at(2), Action::Key(Quote));
        assert_eq!(
            KEYMAP.resolve(1, 0, &LayerState::new()),
            Action::ModsTapKey(Mods::LALT, Tab)
        );
    }
}
