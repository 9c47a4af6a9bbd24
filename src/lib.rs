//! # Parallel bus driver
//!
//! A bit-banged 6800/8080 parallel bus driver for the Raspberry Pi GPIO
//! header, aimed at the controller chips on small character and graphic
//! LCD modules.
//!
//! The driver provides:
//! - Both classical parallel protocols: 6800 (Motorola, enable-pulsed)
//!   and 8080 (Intel, read/write-strobed)
//! - 8-bit and 4-bit (nibble-paired) bus widths
//! - Optional read support when the read/write line is wired
//! - Arbitrary GPIO pins 0..=27, with microsecond-scale pulse shaping
//!   paced against the monotonic clock
//!
//! Data lines idle in input mode so the host and the controller can
//! never drive the bus at the same time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use parallel_bus_driver::{ChipConfig, ParallelDriver, Protocol};
//!
//! // HD44780-class module on a 4-bit 6800 bus, write-only
//! let config = ChipConfig::four_bit([26, 19, 13, 6], 21, 20, None, Protocol::Motorola6800);
//! let mut lcd = ParallelDriver::new(config)?;
//!
//! lcd.write_command(0x01); // clear display
//! lcd.write_data(b"hello");
//! # Ok::<(), parallel_bus_driver::ParallelError>(())
//! ```
//!
//! Transfers busy-wait between signal edges and make no thread-safety
//! guarantees; callers serialise bus access externally.

#![warn(missing_docs, clippy::all, clippy::pedantic)]

pub mod hal;

// Re-export the driver and its configuration types
pub use parallel::{BusTimings, ChipConfig, ParallelDriver, ParallelError, Protocol};

// Re-export HAL components for auxiliary pins (backlight, reset, ...)
pub use hal::{
    gpio::{GpioController, GpioFunction, GpioPull},
    mmio::{gpio_mem, GpioMem},
    timer::EdgeTimer,
};

mod parallel;
