//! USB HID boot keyboard on the ATmega32U4's USB controller.
//!
//! Polled from the main loop; no USB interrupts are used. EP0 handles the
//! standard and HID class requests, EP1 carries 8-byte keyboard reports.

use avr_device::atmega32u4::Peripherals;
use planka_keymap::KeyboardReport;

const EP0_SIZE: u8 = 64;
const EP1_SIZE: u8 = 8;

static HID_REPORT_DESCRIPTOR: [u8; 64] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224)
    0x29, 0xE7, //   Usage Maximum (231)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,    // bDeviceClass
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    0xEB, 0xFE, // idVendor (0xFEEB)
    0x32, 0x32, // idProduct (0x3232)
    0x01, 0x00, // bcdDevice (1.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    9, 2, 34, 0, // configuration, wTotalLength 34
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    9, 4, // interface
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    1,    // bInterfaceSubClass (Boot)
    1,    // bInterfaceProtocol (Keyboard)
    0,    // iInterface
    9, 0x21, // HID
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    HID_REPORT_DESCRIPTOR.len() as u8, 0,
    7, 5, // endpoint
    0x81, // EP1 IN
    0x03, // interrupt
    EP1_SIZE, 0,
    10,   // bInterval (ms)
];

static LANGUAGES: [u8; 4] = [4, 3, 0x09, 0x04];

static MANUFACTURER: [u8; 14] = [
    14, 3, b'P', 0, b'l', 0, b'a', 0, b'n', 0, b'k', 0, b'a', 0,
];

static PRODUCT: [u8; 18] = [
    18, 3, b'K', 0, b'e', 0, b'y', 0, b'b', 0, b'o', 0, b'a', 0, b'r', 0, b'd', 0,
];

/// An 8-byte SETUP packet.
struct Setup {
    request_type: u8,
    request: u8,
    value: u16,
    length: u16,
}

impl Setup {
    fn descriptor_type(&self) -> u8 {
        (self.value >> 8) as u8
    }

    fn descriptor_index(&self) -> u8 {
        self.value as u8
    }
}

pub struct UsbKeyboard {
    configured: bool,
    protocol: u8,
    idle: u8,
    last_report: KeyboardReport,
}

impl UsbKeyboard {
    pub const fn new() -> Self {
        Self {
            configured: false,
            protocol: 1,
            idle: 0,
            last_report: KeyboardReport::empty(),
        }
    }

    pub fn init(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        usb.uhwcon.write(|w| w.uvrege().set_bit());
        usb.usbcon.write(|w| w.usbe().set_bit().otgpade().set_bit());

        // 16MHz crystal, PLL to 48MHz
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());
        usb.udcon.modify(|_, w| w.detach().clear_bit());
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Handle bus resets and control requests. Call every loop iteration.
    pub fn poll(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        if usb.udint.read().eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0(dp);
            self.configured = false;
        }

        select_endpoint(dp, 0);
        if usb.ueintx.read().rxstpi().bit_is_set() {
            self.handle_setup(dp);
        }
    }

    /// Send `report` on EP1 unless it equals the last one sent.
    pub fn send_report(&mut self, dp: &Peripherals, report: &KeyboardReport) {
        if !self.configured || *report == self.last_report {
            return;
        }

        let usb = &dp.USB_DEVICE;
        select_endpoint(dp, 1);

        let mut timeout: u16 = 0xFFFF;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return;
            }
        }

        for byte in report.as_bytes() {
            usb.uedatx.write(|w| w.bits(byte));
        }
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());

        self.last_report = *report;
    }

    fn configure_ep0(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;
        select_endpoint(dp, 0);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;
        select_endpoint(dp, 1);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
    }

    fn read_setup(dp: &Peripherals) -> Setup {
        let usb = &dp.USB_DEVICE;
        let mut bytes = [0u8; 8];
        for byte in bytes.iter_mut() {
            *byte = usb.uedatx.read().bits();
        }
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        Setup {
            request_type: bytes[0],
            request: bytes[1],
            value: u16::from_le_bytes([bytes[2], bytes[3]]),
            length: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    fn handle_setup(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;
        let setup = Self::read_setup(dp);

        match (setup.request_type, setup.request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => {
                let desc: &[u8] = match (setup.descriptor_type(), setup.descriptor_index()) {
                    (1, _) => &DEVICE_DESCRIPTOR,
                    (2, _) => &CONFIG_DESCRIPTOR,
                    (3, 0) => &LANGUAGES,
                    (3, 1) => &MANUFACTURER,
                    (3, 2) => &PRODUCT,
                    _ => return stall(dp),
                };
                send_control(dp, desc, setup.length);
            }

            // SET_ADDRESS
            (0x00, 0x05) => {
                send_zlp(dp);
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(setup.value as u8 & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                send_zlp(dp);
                self.configure_ep1(dp);
                self.configured = setup.value != 0;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => send_control(dp, &[u8::from(self.configured)], setup.length),

            // HID report descriptor
            (0x81, 0x06) if setup.descriptor_type() == 0x22 => {
                send_control(dp, &HID_REPORT_DESCRIPTOR, setup.length);
            }

            // GET_REPORT
            (0xA1, 0x01) => send_control(dp, &self.last_report.as_bytes(), setup.length),

            // GET_IDLE
            (0xA1, 0x02) => send_control(dp, &[self.idle], setup.length),

            // GET_PROTOCOL
            (0xA1, 0x03) => send_control(dp, &[self.protocol], setup.length),

            // SET_REPORT: the board has no lock LEDs, so the byte is dropped
            (0x21, 0x09) => {
                while usb.ueintx.read().rxouti().bit_is_clear() {}
                let _ = usb.uedatx.read().bits();
                usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
                send_zlp(dp);
            }

            // SET_IDLE
            (0x21, 0x0A) => {
                self.idle = (setup.value >> 8) as u8;
                send_zlp(dp);
            }

            // SET_PROTOCOL
            (0x21, 0x0B) => {
                self.protocol = setup.value as u8;
                send_zlp(dp);
            }

            _ => stall(dp),
        }
    }
}

fn select_endpoint(dp: &Peripherals, ep: u8) {
    dp.USB_DEVICE.uenum.write(|w| w.bits(ep & 0x07));
}

fn send_zlp(dp: &Peripherals) {
    dp.USB_DEVICE.ueintx.modify(|_, w| w.txini().clear_bit());
}

fn stall(dp: &Peripherals) {
    dp.USB_DEVICE.ueconx.modify(|_, w| w.stallrq().set_bit());
}

/// IN data stage in EP0-sized chunks, then wait for the host's status ZLP.
fn send_control(dp: &Peripherals, data: &[u8], max_length: u16) {
    let usb = &dp.USB_DEVICE;
    let len = core::cmp::min(data.len(), usize::from(max_length));
    let mut sent = 0;

    while sent < len {
        while usb.ueintx.read().txini().bit_is_clear() {}

        let end = core::cmp::min(sent + usize::from(EP0_SIZE), len);
        for &byte in &data[sent..end] {
            usb.uedatx.write(|w| w.bits(byte));
        }
        usb.ueintx.modify(|_, w| w.txini().clear_bit());
        sent = end;
    }

    while usb.ueintx.read().rxouti().bit_is_clear() {}
    usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
}
