//! Hardware access layer for the BCM283x GPIO block
//!
//! This module provides the low-level pieces the bus engine is built from:
//! the memory-mapped register window, single-pin primitives, and the edge
//! scheduler used to pace strobe waveforms.

pub mod gpio;
pub mod mmio;
pub mod timer;

/// Unprivileged GPIO memory device exposed by the Raspberry Pi kernel.
pub const GPIO_MEM_DEVICE: &str = "/dev/gpiomem";

/// Length in bytes of the mapped GPIO register block.
pub const GPIO_MEM_LEN: usize = 0xB4;

/// Number of 32-bit words in the register block.
pub const GPIO_MEM_WORDS: usize = GPIO_MEM_LEN / 4;
