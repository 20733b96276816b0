//! Boot keyboard reports built from the event stream.

use log::debug;

use crate::keycode::{Keycode, Mods};
use crate::process::{EventSink, HidEvent};

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; 6],
        }
    }

    pub fn as_bytes(&self) -> [u8; 8] {
        let [k0, k1, k2, k3, k4, k5] = self.keys;
        [self.modifiers, self.reserved, k0, k1, k2, k3, k4, k5]
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// Keeps the current report up to date as events come in.
///
/// Modifiers are reference counted per bit, so a modifier pressed by two
/// sources (a `ModsKey` and a plain `LShift`, say) stays down until both
/// are released. Key slots are counted the same way, so a keycode mapped
/// to two positions stays in the report while either is held. Keys beyond
/// six are dropped; usages outside the keyboard
/// page (media, power) have no place in a boot report and are ignored.
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    keys: [u8; 6],
    holds: [u8; 6],
    mods: [u8; 8],
}

impl ReportBuilder {
    pub const fn new() -> Self {
        Self {
            keys: [0; 6],
            holds: [0; 6],
            mods: [0; 8],
        }
    }

    pub fn report(&self) -> KeyboardReport {
        let mut modifiers = 0;
        for (bit, count) in self.mods.iter().enumerate() {
            if *count > 0 {
                modifiers |= 1 << bit;
            }
        }
        KeyboardReport {
            modifiers,
            reserved: 0,
            keys: self.keys,
        }
    }

    fn mods_down(&mut self, mods: Mods) {
        for (bit, count) in self.mods.iter_mut().enumerate() {
            if mods.bits() & (1 << bit) != 0 {
                *count = count.saturating_add(1);
            }
        }
    }

    fn mods_up(&mut self, mods: Mods) {
        for (bit, count) in self.mods.iter_mut().enumerate() {
            if mods.bits() & (1 << bit) != 0 {
                *count = count.saturating_sub(1);
            }
        }
    }

    fn key_down(&mut self, kc: Keycode) {
        if kc.is_modifier() {
            self.mods_down(kc.modifier_bit());
            return;
        }
        if !kc.is_keyboard() {
            debug!("{:?} is not a keyboard usage", kc);
            return;
        }
        let code = kc as u8;
        if let Some(slot) = self.keys.iter().position(|&key| key == code) {
            self.holds[slot] = self.holds[slot].saturating_add(1);
            return;
        }
        match self.keys.iter().position(|&key| key == 0) {
            Some(slot) => {
                self.keys[slot] = code;
                self.holds[slot] = 1;
            }
            None => debug!("report full, dropping {:?}", kc),
        }
    }

    fn key_up(&mut self, kc: Keycode) {
        if kc.is_modifier() {
            self.mods_up(kc.modifier_bit());
            return;
        }
        let code = kc as u8;
        if let Some(slot) = self.keys.iter().position(|&key| key == code) {
            self.holds[slot] = self.holds[slot].saturating_sub(1);
            if self.holds[slot] == 0 {
                self.keys[slot] = 0;
            }
        }
    }
}

impl EventSink for ReportBuilder {
    fn emit(&mut self, event: HidEvent) {
        match event {
            HidEvent::KeyDown(kc) => self.key_down(kc),
            HidEvent::KeyUp(kc) => self.key_up(kc),
            HidEvent::ModsDown(mods) => self.mods_down(mods),
            HidEvent::ModsUp(mods) => self.mods_up(mods),
        }
    }
}
