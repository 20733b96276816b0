//! What a key position does once it has been resolved through the layers.

use crate::keycode::{Keycode, Mods};

/// Bitwise operation applied to the active-layer bitmask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOp {
    Xor,
    Or,
    And,
}

impl BitOp {
    /// Apply to `state` with the 4-bit operand `bits` in group `part`
    /// (layers `4 * part ..= 4 * part + 3`).
    ///
    /// `And` only masks the addressed group: `bits` lists the layers of that
    /// group to keep, every other group is left alone.
    pub fn apply(self, state: u32, part: u8, bits: u8) -> u32 {
        let shift = 4 * u32::from(part & 0x07);
        let mask = u32::from(bits & 0x0F) << shift;
        match self {
            BitOp::Xor => state ^ mask,
            BitOp::Or => state | mask,
            BitOp::And => state & (mask | !(0x0F << shift)),
        }
    }
}

/// Which edges of a key a layer bit operation runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum On {
    Press,
    Release,
    Both,
}

impl On {
    pub fn on_press(self) -> bool {
        matches!(self, On::Press | On::Both)
    }

    pub fn on_release(self) -> bool {
        matches!(self, On::Release | On::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Defer to the layer below.
    Transparent,
    /// Plain keycode, modifiers included.
    Key(Keycode),
    /// Bitwise update of the active-layer bitmask.
    LayerBitOp { op: BitOp, part: u8, bits: u8, on: On },
    /// Layer active while the key is held.
    LayerMomentary(u8),
    /// Replace the default (base) layer.
    DefaultLayerSet(u8),
    /// Modifiers and a key pressed together.
    ModsKey(Mods, Keycode),
    /// Key when tapped, modifiers when held.
    ModsTapKey(Mods, Keycode),
}

impl Action {
    /// The position does nothing.
    pub const NO: Action = Action::Key(Keycode::No);

    pub const fn layer_bit_xor(part: u8, bits: u8, on: On) -> Self {
        Action::LayerBitOp { op: BitOp::Xor, part, bits, on }
    }

    pub const fn layer_bit_or(part: u8, bits: u8, on: On) -> Self {
        Action::LayerBitOp { op: BitOp::Or, part, bits, on }
    }

    pub const fn layer_bit_and(part: u8, bits: u8, on: On) -> Self {
        Action::LayerBitOp { op: BitOp::And, part, bits, on }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(BitOp::Xor, 0b0000_0000, 1, 0b0001 => 0b0001_0000 ; "xor sets a clear bit")]
    #[test_case(BitOp::Xor, 0b0001_0000, 1, 0b0001 => 0b0000_0000 ; "xor clears a set bit")]
    #[test_case(BitOp::Or, 0b0001_0000, 1, 0b0100 => 0b0101_0000 ; "or adds")]
    #[test_case(BitOp::And, 0b0111_0000, 1, 0b1010 => 0b0010_0000 ; "and keeps listed layers of the group")]
    #[test_case(BitOp::And, 0b0111_0110, 1, 0b1001 => 0b0001_0110 ; "and leaves other groups alone")]
    #[test_case(BitOp::Or, 0, 0, 0b0100 => 0b0100 ; "part zero addresses layers 0 to 3")]
    fn bit_ops(op: BitOp, state: u32, part: u8, bits: u8) -> u32 {
        op.apply(state, part, bits)
    }

    #[test]
    fn edges() {
        assert!(On::Both.on_press() && On::Both.on_release());
        assert!(On::Press.on_press() && !On::Press.on_release());
        assert!(!On::Release.on_press() && On::Release.on_release());
    }
}
