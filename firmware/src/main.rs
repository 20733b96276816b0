//! Planka keyboard firmware for ATmega32U4.
//!
//! Scans the 5×14 matrix through the shared keyboard core once per
//! millisecond and sends the resulting boot keyboard report over USB.

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod lines;
mod usb;

use avr_device::atmega32u4::Peripherals;
use embedded_hal::delay::DelayNs;
use planka_keymap::planka::KEYMAP;
use planka_keymap::{Config, Debounce, Keyboard, ReportBuilder};

use lines::PlankaLines;
use usb::UsbKeyboard;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Busy-wait delay, calibrated for 16MHz.
#[derive(Clone, Copy)]
struct BusyWait;

impl DelayNs for BusyWait {
    fn delay_ns(&mut self, ns: u32) {
        // One loop iteration is about 4 cycles, 250ns
        for _ in 0..ns.div_ceil(250) {
            unsafe { core::arch::asm!("nop") };
        }
    }
}

#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Clock prescaler = 1
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    let mut usb = UsbKeyboard::new();
    usb.init(&dp);

    let mut keyboard = Keyboard::new(PlankaLines::new(&dp), BusyWait, KEYMAP, &Config::DEFAULT);
    keyboard.init();

    let mut report = ReportBuilder::new();
    let mut delay = BusyWait;

    loop {
        usb.poll(&dp);

        let status = avr_device::interrupt::free(|_| keyboard.task(&mut report));
        usb.send_report(&dp, &report.report());

        // A settling scan has already waited its millisecond.
        if status != Debounce::Settling {
            delay.delay_ms(1);
        }
    }
}
