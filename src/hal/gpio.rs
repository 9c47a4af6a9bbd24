//! GPIO pin primitives for the BCM283x register block
//!
//! All operations are in-place modifications of the mapped register
//! window. Offsets are word indices into the window, matching the
//! peripheral datasheet layout.

use std::thread;
use std::time::Duration;

use super::mmio::GpioMem;

/// GPIO function select words (10 pins per word, 3 bits per pin)
const GPFSEL0: usize = 0;

/// GPIO pin output set words
const GPSET0: usize = 7;

/// GPIO pin output clear words
const GPCLR0: usize = 10;

/// GPIO pin level words
const GPLEV0: usize = 13;

/// GPIO pull-up/down control word
const GPPUD: usize = 37;

/// GPIO pull-up/down clock words
const GPPUDCLK0: usize = 38;

/// Hold time for each half of the pull-up/down sequence. The peripheral
/// prescribes a minimum of 150 core cycles; 20 µs clears that on every
/// clocking the chip supports.
const PUD_SETTLE: Duration = Duration::from_micros(20);

/// GPIO pin function modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioFunction {
    /// Input (high impedance)
    Input = 0b000,
    /// Output
    Output = 0b001,
    /// Alternate function 0
    Alt0 = 0b100,
    /// Alternate function 1
    Alt1 = 0b101,
    /// Alternate function 2
    Alt2 = 0b110,
    /// Alternate function 3
    Alt3 = 0b111,
    /// Alternate function 4
    Alt4 = 0b011,
    /// Alternate function 5
    Alt5 = 0b010,
}

/// GPIO pull-up/down control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioPull {
    /// No pull resistor
    Off = 0b00,
    /// Pull-down resistor
    Down = 0b01,
    /// Pull-up resistor
    Up = 0b10,
}

/// Pin-level access to the GPIO block through the mapped window.
///
/// Pins 0..=27 (the 40-pin header) are supported; callers supply
/// already-validated pin numbers.
#[derive(Clone, Copy)]
pub struct GpioController {
    mem: GpioMem,
}

impl GpioController {
    /// Create a controller over an existing register window.
    pub fn new(mem: GpioMem) -> Self {
        Self { mem }
    }

    /// Set the function of a single pin, preserving its neighbours in the
    /// same function-select word.
    pub fn set_function(&self, pin: u8, function: GpioFunction) {
        debug_assert!(pin <= 27);
        let reg = GPFSEL0 + usize::from(pin) / 10;
        let shift = (u32::from(pin) % 10) * 3;

        let current = self.mem.read_word(reg);
        let value = (current & !(0b111 << shift)) | ((function as u32) << shift);
        self.mem.write_word(reg, value);
    }

    /// Read the 3-bit function field of a single pin.
    pub fn get_function(&self, pin: u8) -> u32 {
        debug_assert!(pin <= 27);
        let reg = GPFSEL0 + usize::from(pin) / 10;
        let shift = (u32::from(pin) % 10) * 3;

        (self.mem.read_word(reg) >> shift) & 0b111
    }

    /// Drive a single output pin high or low.
    pub fn write_level(&self, pin: u8, high: bool) {
        debug_assert!(pin <= 27);
        let bank = usize::from(pin) / 32;
        let bit = 1u32 << (u32::from(pin) & 31);

        if high {
            self.mem.write_word(GPSET0 + bank, bit);
        } else {
            self.mem.write_word(GPCLR0 + bank, bit);
        }
    }

    /// Read the level of a single pin.
    pub fn read_level(&self, pin: u8) -> bool {
        debug_assert!(pin <= 27);
        let bank = usize::from(pin) / 32;
        let bit = 1u32 << (u32::from(pin) & 31);

        self.mem.read_word(GPLEV0 + bank) & bit != 0
    }

    /// Configure the pull resistor of a single pin.
    ///
    /// The mode-then-clock sequence with a pause on either side is
    /// prescribed by the peripheral and must not be shortened.
    pub fn set_pull(&self, pin: u8, pull: GpioPull) {
        debug_assert!(pin <= 27);
        let bank = usize::from(pin) / 32;
        let bit = 1u32 << (u32::from(pin) & 31);

        self.mem.write_word(GPPUD, pull as u32);
        thread::sleep(PUD_SETTLE);
        self.mem.write_word(GPPUDCLK0 + bank, bit);
        thread::sleep(PUD_SETTLE);
        self.mem.write_word(GPPUD, 0);
        self.mem.write_word(GPPUDCLK0 + bank, 0);
    }

    /// Snapshot the function-select words covering pins 0..=29.
    pub fn function_snapshot(&self) -> [u32; 3] {
        [
            self.mem.read_word(GPFSEL0),
            self.mem.read_word(GPFSEL0 + 1),
            self.mem.read_word(GPFSEL0 + 2),
        ]
    }

    /// Stage a function change for one pin in a snapshot without touching
    /// the hardware.
    pub fn stage_function(snapshot: &mut [u32; 3], pin: u8, function: GpioFunction) {
        debug_assert!(pin <= 27);
        let reg = usize::from(pin) / 10;
        let shift = (u32::from(pin) % 10) * 3;

        snapshot[reg] = (snapshot[reg] & !(0b111 << shift)) | ((function as u32) << shift);
    }

    /// Commit a staged snapshot in three word writes.
    ///
    /// Direction changes for a whole group of pins land together; the bus
    /// is never observable with only part of the group switched.
    pub fn commit_functions(&self, snapshot: &[u32; 3]) {
        self.mem.write_word(GPFSEL0, snapshot[0]);
        self.mem.write_word(GPFSEL0 + 1, snapshot[1]);
        self.mem.write_word(GPFSEL0 + 2, snapshot[2]);
    }

    /// Raise every pin whose bit is set in `mask` (bank 0).
    pub fn set_mask(&self, mask: u32) {
        self.mem.write_word(GPSET0, mask);
    }

    /// Lower every pin whose bit is set in `mask` (bank 0).
    pub fn clear_mask(&self, mask: u32) {
        self.mem.write_word(GPCLR0, mask);
    }

    /// Read the bank-0 level word covering pins 0..=31.
    pub fn level_word(&self) -> u32 {
        self.mem.read_word(GPLEV0)
    }
}
