//! Layer stack and action resolution.
//!
//! Layers are plain keycode tables. `Trans` falls through to the layer
//! below, `FnN` is looked up in the fn table. Which overlays take part is an
//! active-layer bitmask; underneath all of them sits the default layer.

use log::debug;

use crate::action::{Action, BitOp};
use crate::keycode::Keycode;

/// Keycode table for one layer, `[row][col]`.
pub type Layer<const ROWS: usize, const COLS: usize> = [[Keycode; COLS]; ROWS];

/// Number of layers the bitmask can address.
pub const MAX_LAYERS: usize = 32;

/// Active overlays and the selected base layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerState {
    layers: u32,
    default_layer: u8,
}

impl LayerState {
    pub const fn new() -> Self {
        Self {
            layers: 0,
            default_layer: 0,
        }
    }

    /// State with the given overlays active on top of `default_layer`.
    pub const fn with(layers: u32, default_layer: u8) -> Self {
        Self {
            layers,
            default_layer,
        }
    }

    /// Active-layer bitmask (bit n = layer n).
    pub fn bits(&self) -> u32 {
        self.layers
    }

    pub fn default_layer(&self) -> u8 {
        self.default_layer
    }

    pub fn is_on(&self, layer: u8) -> bool {
        usize::from(layer) < MAX_LAYERS && self.layers & (1 << layer) != 0
    }

    pub(crate) fn on(&mut self, layer: u8) {
        if usize::from(layer) < MAX_LAYERS {
            self.set(self.layers | 1 << layer);
        }
    }

    pub(crate) fn off(&mut self, layer: u8) {
        if usize::from(layer) < MAX_LAYERS {
            self.set(self.layers & !(1 << layer));
        }
    }

    pub(crate) fn apply(&mut self, op: BitOp, part: u8, bits: u8) {
        self.set(op.apply(self.layers, part, bits));
    }

    pub(crate) fn set_default(&mut self, layer: u8) {
        debug!("default layer: {}", layer);
        self.default_layer = layer;
    }

    fn set(&mut self, layers: u32) {
        if layers != self.layers {
            debug!("layer state: {:08X}", layers);
            self.layers = layers;
        }
    }
}

/// The static keymap: layers (holes allowed) plus the fn table.
#[derive(Clone, Copy)]
pub struct Keymap<'a, const ROWS: usize, const COLS: usize> {
    layers: &'a [Option<Layer<ROWS, COLS>>],
    fn_actions: &'a [Action],
}

impl<'a, const ROWS: usize, const COLS: usize> Keymap<'a, ROWS, COLS> {
    pub const fn new(layers: &'a [Option<Layer<ROWS, COLS>>], fn_actions: &'a [Action]) -> Self {
        Self { layers, fn_actions }
    }

    pub fn layers(&self) -> &'a [Option<Layer<ROWS, COLS>>] {
        self.layers
    }

    /// Raw keycode at a position; missing layers read as `Trans`.
    pub fn keycode(&self, layer: usize, row: usize, col: usize) -> Keycode {
        match self.layers.get(layer) {
            Some(Some(keys)) => keys[row][col],
            _ => Keycode::Trans,
        }
    }

    /// Action of one layer at a position, without falling through.
    pub fn action_for_key(&self, layer: usize, row: usize, col: usize) -> Action {
        let kc = self.keycode(layer, row, col);
        if kc.is_transparent() {
            Action::Transparent
        } else if let Some(index) = kc.fn_index() {
            self.fn_actions.get(index).copied().unwrap_or(Action::NO)
        } else {
            Action::Key(kc)
        }
    }

    /// Resolve a position: active overlays from the highest layer down,
    /// then the default layer. Nothing but transparency resolves to
    /// [`Action::NO`].
    pub fn resolve(&self, row: usize, col: usize, state: &LayerState) -> Action {
        let active = state.bits();
        for layer in (0..MAX_LAYERS).rev() {
            if active & (1 << layer) == 0 {
                continue;
            }
            let action = self.action_for_key(layer, row, col);
            if action != Action::Transparent {
                return action;
            }
        }

        match self.action_for_key(usize::from(state.default_layer()), row, col) {
            Action::Transparent => Action::NO,
            action => action,
        }
    }

    /// Keycode shown for a position of `layer`: its own keycode, or the
    /// default layer's where it is `Trans`.
    pub fn lookup(&self, layer: usize, default_layer: usize, row: usize, col: usize) -> Keycode {
        match self.keycode(layer, row, col) {
            Keycode::Trans => self.keycode(default_layer, row, col),
            kc => kc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::Keycode::*;
    use crate::keycode::Mods;

    const ___: Keycode = Trans;

    #[rustfmt::skip]
    static LAYERS: [Option<Layer<2, 2>>; 5] = [
        Some([[A, B], [C, Q]]),
        Some([[___, ___], [___, ___]]),
        Some([[E, F], [G, H]]),
        None,
        Some([[Fn0, ___], [___, Kp8]]),
    ];

    static FN_ACTIONS: [Action; 1] = [Action::ModsKey(Mods::LSHIFT, N1)];

    fn keymap() -> Keymap<'static, 2, 2> {
        Keymap::new(&LAYERS, &FN_ACTIONS)
    }

    #[test]
    fn highest_active_overlay_wins() {
        let state = LayerState::with(1 << 4 | 1 << 1, 0);
        assert_eq!(keymap().resolve(1, 1, &state), Action::Key(Kp8));
    }

    #[test]
    fn transparent_overlays_fall_to_default_layer() {
        let state = LayerState::with(1 << 4 | 1 << 1, 0);
        assert_eq!(keymap().resolve(1, 0, &state), Action::Key(C));
    }

    #[test]
    fn default_layer_only_matters_where_no_overlay_hits() {
        let state = LayerState::with(1 << 4, 2);
        assert_eq!(keymap().resolve(1, 1, &state), Action::Key(Kp8));
        assert_eq!(keymap().resolve(0, 1, &state), Action::Key(F));
        assert_eq!(state.bits(), 1 << 4);
    }

    #[test]
    fn fn_keys_go_through_the_fn_table() {
        let state = LayerState::with(1 << 4, 0);
        assert_eq!(
            keymap().resolve(0, 0, &state),
            Action::ModsKey(Mods::LSHIFT, N1)
        );
    }

    #[test]
    fn missing_layers_and_fn_entries() {
        static SPARSE: [Option<Layer<1, 2>>; 1] = [Some([[Fn5, ___]])];
        let keymap = Keymap::new(&SPARSE, &[]);

        assert_eq!(keymap.action_for_key(7, 0, 0), Action::Transparent);
        assert_eq!(keymap.resolve(0, 0, &LayerState::with(1 << 3, 0)), Action::NO);
        assert_eq!(keymap.resolve(0, 1, &LayerState::new()), Action::NO);
    }

    #[test]
    fn resolution_is_deterministic() {
        let state = LayerState::with(0b10110, 2);
        let first = keymap().resolve(0, 1, &state);
        for _ in 0..10 {
            assert_eq!(keymap().resolve(0, 1, &state), first);
        }
    }

    #[test]
    fn lookup_falls_through_for_display() {
        assert_eq!(keymap().lookup(1, 0, 0, 1), B);
        assert_eq!(keymap().lookup(4, 2, 1, 0), G);
        assert_eq!(keymap().lookup(4, 2, 1, 1), Kp8);
    }

    #[test]
    fn state_mutations() {
        let mut state = LayerState::new();
        state.on(4);
        state.on(6);
        state.off(4);
        assert!(state.is_on(6) && !state.is_on(4));

        state.apply(BitOp::Xor, 1, 0b0001);
        assert_eq!(state.bits(), 0b0101_0000);

        state.set_default(1);
        assert_eq!(state.default_layer(), 1);
        assert_eq!(state.bits(), 0b0101_0000);

        state.on(40);
        assert!(!state.is_on(40));
    }
}
