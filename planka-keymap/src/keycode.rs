//! Keycodes and modifier sets.
//!
//! The keycode space follows the classic TMK layout: `0x00`/`0x01` are the
//! "no key" and "transparent" markers, `0x04..=0xA4` are USB HID keyboard
//! page usages, `0xA5..=0xAF` are system/consumer controls that travel on
//! other HID pages, `0xC0..=0xDF` reference entries of the fn table and
//! `0xE0..=0xE7` are the eight modifiers.

use bitflags::bitflags;

bitflags! {
    /// HID modifier byte (bit 0 = LCtrl, bit 7 = RGui).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u8 {
        const LCTRL = 1 << 0;
        const LSHIFT = 1 << 1;
        const LALT = 1 << 2;
        const LGUI = 1 << 3;
        const RCTRL = 1 << 4;
        const RSHIFT = 1 << 5;
        const RALT = 1 << 6;
        const RGUI = 1 << 7;
    }
}

/// Keycodes, see USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Keycode {
    /// No key: the position does nothing.
    No = 0x00,
    /// Transparent: fall through to the layer below.
    Trans = 0x01,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    NonUsHash = 0x32,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Keypad
    NumLock = 0x53,
    KpSlash = 0x54,
    KpAsterisk = 0x55,
    KpMinus = 0x56,
    KpPlus = 0x57,
    KpEnter = 0x58,
    Kp1 = 0x59,
    Kp2 = 0x5A,
    Kp3 = 0x5B,
    Kp4 = 0x5C,
    Kp5 = 0x5D,
    Kp6 = 0x5E,
    Kp7 = 0x5F,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,
    /// Non-US \ and | (ISO key left of Z)
    NonUsBackslash = 0x64,
    Application = 0x65,
    KpEqual = 0x67,

    // Extended function keys
    F13 = 0x68,
    F14 = 0x69,
    F15 = 0x6A,
    F16 = 0x6B,
    F17 = 0x6C,
    F18 = 0x6D,
    F19 = 0x6E,
    F20 = 0x6F,
    F21 = 0x70,
    F22 = 0x71,
    F23 = 0x72,
    F24 = 0x73,

    // Editing
    Menu = 0x76,
    Again = 0x79,
    Undo = 0x7A,
    Cut = 0x7B,
    Copy = 0x7C,
    Paste = 0x7D,

    // International
    Int1 = 0x87,
    Int2 = 0x88,
    Int3 = 0x89,
    Int4 = 0x8A,
    Int5 = 0x8B,
    Int6 = 0x8C,
    Int7 = 0x8D,
    Int8 = 0x8E,
    Int9 = 0x8F,
    Lang1 = 0x90,
    Lang2 = 0x91,
    Lang3 = 0x92,
    Lang4 = 0x93,
    Lang5 = 0x94,
    Lang6 = 0x95,
    Lang7 = 0x96,
    Lang8 = 0x97,
    Lang9 = 0x98,

    // System control (Generic Desktop page)
    SystemPower = 0xA5,
    SystemSleep = 0xA6,
    SystemWake = 0xA7,

    // Consumer control
    AudioMute = 0xA8,
    AudioVolUp = 0xA9,
    AudioVolDown = 0xAA,
    MediaNextTrack = 0xAB,
    MediaPrevTrack = 0xAC,
    MediaStop = 0xAD,
    MediaPlayPause = 0xAE,
    MediaSelect = 0xAF,

    // Fn table references
    Fn0 = 0xC0,
    Fn1 = 0xC1,
    Fn2 = 0xC2,
    Fn3 = 0xC3,
    Fn4 = 0xC4,
    Fn5 = 0xC5,
    Fn6 = 0xC6,
    Fn7 = 0xC7,
    Fn8 = 0xC8,
    Fn9 = 0xC9,
    Fn10 = 0xCA,
    Fn11 = 0xCB,
    Fn12 = 0xCC,
    Fn13 = 0xCD,
    Fn14 = 0xCE,
    Fn15 = 0xCF,
    Fn16 = 0xD0,
    Fn17 = 0xD1,
    Fn18 = 0xD2,
    Fn19 = 0xD3,
    Fn20 = 0xD4,
    Fn21 = 0xD5,
    Fn22 = 0xD6,
    Fn23 = 0xD7,
    Fn24 = 0xD8,
    Fn25 = 0xD9,
    Fn26 = 0xDA,
    Fn27 = 0xDB,
    Fn28 = 0xDC,
    Fn29 = 0xDD,
    Fn30 = 0xDE,
    Fn31 = 0xDF,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

impl Keycode {
    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        let v = self as u8;
        (0xE0..=0xE7).contains(&v)
    }

    /// Modifier set for a modifier keycode, empty otherwise.
    pub fn modifier_bit(self) -> Mods {
        if self.is_modifier() {
            Mods::from_bits_truncate(1 << (self as u8 - 0xE0))
        } else {
            Mods::empty()
        }
    }

    /// Check if this is a transparent key.
    pub fn is_transparent(self) -> bool {
        self == Keycode::Trans
    }

    /// Index into the fn table for `Fn0`..`Fn31`.
    pub fn fn_index(self) -> Option<usize> {
        let v = self as u8;
        (0xC0..=0xDF).contains(&v).then(|| (v - 0xC0) as usize)
    }

    /// Check if this keycode goes into the keyboard page report
    /// (key array or modifier byte).
    pub fn is_keyboard(self) -> bool {
        let v = self as u8;
        (0x04..=0xA4).contains(&v) || self.is_modifier()
    }

    /// Display name for use in layout visualizations.
    pub fn display_name(self) -> &'static str {
        use Keycode::*;
        match self {
            No => "",
            Trans => "",
            A => "A",
            B => "B",
            C => "C",
            D => "D",
            E => "E",
            F => "F",
            G => "G",
            H => "H",
            I => "I",
            J => "J",
            K => "K",
            L => "L",
            M => "M",
            N => "N",
            O => "O",
            P => "P",
            Q => "Q",
            R => "R",
            S => "S",
            T => "T",
            U => "U",
            V => "V",
            W => "W",
            X => "X",
            Y => "Y",
            Z => "Z",
            N1 => "1",
            N2 => "2",
            N3 => "3",
            N4 => "4",
            N5 => "5",
            N6 => "6",
            N7 => "7",
            N8 => "8",
            N9 => "9",
            N0 => "0",
            Enter => "Ent",
            Escape => "Esc",
            Backspace => "Bksp",
            Tab => "Tab",
            Space => "Spc",
            Minus => "-",
            Equal => "=",
            LBracket => "[",
            RBracket => "]",
            Backslash => "\\",
            NonUsHash => "#",
            Semicolon => ";",
            Quote => "'",
            Grave => "`",
            Comma => ",",
            Dot => ".",
            Slash => "/",
            CapsLock => "Caps",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            PrintScreen => "PScr",
            ScrollLock => "ScrL",
            Pause => "Paus",
            Insert => "Ins",
            Home => "Home",
            PageUp => "PgUp",
            Delete => "Del",
            End => "End",
            PageDown => "PgDn",
            Right => "\u{2192}",
            Left => "\u{2190}",
            Down => "\u{2193}",
            Up => "\u{2191}",
            NumLock => "NmLk",
            KpSlash => "P/",
            KpAsterisk => "P*",
            KpMinus => "P-",
            KpPlus => "P+",
            KpEnter => "PEnt",
            Kp1 => "P1",
            Kp2 => "P2",
            Kp3 => "P3",
            Kp4 => "P4",
            Kp5 => "P5",
            Kp6 => "P6",
            Kp7 => "P7",
            Kp8 => "P8",
            Kp9 => "P9",
            Kp0 => "P0",
            KpDot => "P.",
            NonUsBackslash => "<>",
            Application => "App",
            KpEqual => "P=",
            F13 => "F13",
            F14 => "F14",
            F15 => "F15",
            F16 => "F16",
            F17 => "F17",
            F18 => "F18",
            F19 => "F19",
            F20 => "F20",
            F21 => "F21",
            F22 => "F22",
            F23 => "F23",
            F24 => "F24",
            Menu => "Menu",
            Again => "Agn",
            Undo => "Undo",
            Cut => "Cut",
            Copy => "Copy",
            Paste => "Pst",
            Int1 => "Int1",
            Int2 => "Int2",
            Int3 => "Int3",
            Int4 => "Int4",
            Int5 => "Int5",
            Int6 => "Int6",
            Int7 => "Int7",
            Int8 => "Int8",
            Int9 => "Int9",
            Lang1 => "Lng1",
            Lang2 => "Lng2",
            Lang3 => "Lng3",
            Lang4 => "Lng4",
            Lang5 => "Lng5",
            Lang6 => "Lng6",
            Lang7 => "Lng7",
            Lang8 => "Lng8",
            Lang9 => "Lng9",
            SystemPower => "Pwr",
            SystemSleep => "Slep",
            SystemWake => "Wake",
            AudioMute => "Mute",
            AudioVolUp => "Vol+",
            AudioVolDown => "Vol-",
            MediaNextTrack => "Next",
            MediaPrevTrack => "Prev",
            MediaStop => "Stop",
            MediaPlayPause => "Play",
            MediaSelect => "Sel",
            Fn0 => "Fn0",
            Fn1 => "Fn1",
            Fn2 => "Fn2",
            Fn3 => "Fn3",
            Fn4 => "Fn4",
            Fn5 => "Fn5",
            Fn6 => "Fn6",
            Fn7 => "Fn7",
            Fn8 => "Fn8",
            Fn9 => "Fn9",
            Fn10 => "Fn10",
            Fn11 => "Fn11",
            Fn12 => "Fn12",
            Fn13 => "Fn13",
            Fn14 => "Fn14",
            Fn15 => "Fn15",
            Fn16 => "Fn16",
            Fn17 => "Fn17",
            Fn18 => "Fn18",
            Fn19 => "Fn19",
            Fn20 => "Fn20",
            Fn21 => "Fn21",
            Fn22 => "Fn22",
            Fn23 => "Fn23",
            Fn24 => "Fn24",
            Fn25 => "Fn25",
            Fn26 => "Fn26",
            Fn27 => "Fn27",
            Fn28 => "Fn28",
            Fn29 => "Fn29",
            Fn30 => "Fn30",
            Fn31 => "Fn31",
            LCtrl => "Ctrl",
            LShift => "Shft",
            LAlt => "Alt",
            LGui => "Gui",
            RCtrl => "RCtl",
            RShift => "RSft",
            RAlt => "RAlt",
            RGui => "RGui",
        }
    }
}
