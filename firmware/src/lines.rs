//! Matrix lines of the Planka Rev.A board.
//!
//! Rows are read on PD2, PD3, PD4, PD5 and PD7 (inputs with pull-ups).
//! Columns are driven low one at a time and left floating (Hi-Z) otherwise.

use avr_device::atmega32u4::Peripherals;
use planka_keymap::{LineDriver, MatrixRow, COLS, ROWS};

#[derive(Clone, Copy)]
enum Port {
    B,
    C,
    D,
    E,
    F,
}

/// Column pins, column 0 first.
const COL_PINS: [(Port, u8); COLS] = [
    (Port::E, 6),
    (Port::B, 0),
    (Port::B, 1),
    (Port::B, 2),
    (Port::D, 1),
    (Port::D, 0),
    (Port::B, 3),
    (Port::B, 7),
    (Port::B, 6),
    (Port::B, 5),
    (Port::B, 4),
    (Port::C, 6),
    (Port::C, 7),
    (Port::F, 7),
];

/// PIND bit of each row, row 0 first.
const ROW_BITS: [u8; ROWS] = [2, 3, 4, 5, 7];
const ROW_MASK: u8 = 0b1011_1100;

pub struct PlankaLines<'a> {
    dp: &'a Peripherals,
}

impl<'a> PlankaLines<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }

    fn ddr(&self, port: Port, f: impl Fn(u8) -> u8) {
        let dp = self.dp;
        match port {
            Port::B => dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::C => dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::D => dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::E => dp.PORTE.ddre.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::F => dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
        }
    }

    fn port(&self, port: Port, f: impl Fn(u8) -> u8) {
        let dp = self.dp;
        match port {
            Port::B => dp.PORTB.portb.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::C => dp.PORTC.portc.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::D => dp.PORTD.portd.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::E => dp.PORTE.porte.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::F => dp.PORTF.portf.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
        }
    }
}

impl LineDriver for PlankaLines<'_> {
    fn init(&mut self) {
        self.ddr(Port::D, |bits| bits & !ROW_MASK);
        self.port(Port::D, |bits| bits | ROW_MASK);
        for col in 0..COLS {
            self.release(col);
        }
    }

    fn select(&mut self, col: usize) {
        let (port, bit) = COL_PINS[col];
        // Output low
        self.ddr(port, |bits| bits | 1 << bit);
        self.port(port, |bits| bits & !(1 << bit));
    }

    fn release(&mut self, col: usize) {
        let (port, bit) = COL_PINS[col];
        // Input, no pull-up
        self.ddr(port, |bits| bits & !(1 << bit));
        self.port(port, |bits| bits & !(1 << bit));
    }

    fn read(&mut self, row: usize) -> bool {
        self.dp.PORTD.pind.read().bits() & 1 << ROW_BITS[row] != 0
    }

    fn read_rows(&mut self, rows: usize) -> MatrixRow {
        let pind = self.dp.PORTD.pind.read().bits();
        let mut levels = 0;
        for (row, &bit) in ROW_BITS.iter().enumerate().take(rows) {
            if pind & 1 << bit != 0 {
                levels |= 1 << row;
            }
        }
        levels
    }
}
