//! 6800/8080 parallel bus driver
//!
//! This module implements the bit-banged transfer engine: one
//! [`ParallelDriver`] per attached controller chip, driving the shared
//! GPIO register window through the pin primitives, with every signal
//! edge paced by the edge timer.

use std::fmt;
use std::io;

use crate::hal::gpio::{GpioController, GpioFunction};
use crate::hal::mmio::{self, GpioMem};
use crate::hal::timer::EdgeTimer;

/// Highest GPIO pin usable on the 40-pin header.
const MAX_PIN: u8 = 27;

/// Bus protocol selection.
///
/// The two protocols differ in strobe polarity and in the register-select
/// convention; both are supported in 8-bit and 4-bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Motorola-style bus: a latching enable pulse on EN, a separate
    /// read/write select on RW.
    Motorola6800,
    /// Intel-style bus: separate active-low write (WR) and read (RD)
    /// strobes.
    Intel8080,
}

/// Per-transfer timing constants, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTimings {
    /// Delay after mode and strobe direction are asserted, before the
    /// first edge.
    pub setup_ns: u32,
    /// Half-period of the data strobe, and the gap between nibbles in
    /// 4-bit mode.
    pub clock_ns: u32,
    /// Delay between asserting the read strobe and sampling the data
    /// lines.
    pub read_ns: u32,
    /// Controller processing time between full bytes.
    pub process_ns: u32,
    /// Minimum hold time for the controller's output enable after a read
    /// strobe.
    pub hold_ns: u32,
}

impl Default for BusTimings {
    /// Conservative character-LCD timings, generous enough for an
    /// HD44780-class controller on loose wiring.
    fn default() -> Self {
        Self {
            setup_ns: 60,
            clock_ns: 600,
            read_ns: 200,
            process_ns: 60_000,
            hold_ns: 0,
        }
    }
}

/// Pin assignment and protocol selection for one attached chip.
///
/// `d7..=d4` plus the register-select and strobe lines are always wired.
/// `d3..=d0` are wired together for 8-bit operation or all left `None`
/// for 4-bit (nibble-paired) operation; `rwrd` left `None` makes the bus
/// write-only. Any optional pin outside the usable range is treated as
/// unwired.
#[derive(Debug, Clone, Copy)]
pub struct ChipConfig {
    /// Data line 7 (most significant).
    pub d7: u8,
    /// Data line 6.
    pub d6: u8,
    /// Data line 5.
    pub d5: u8,
    /// Data line 4.
    pub d4: u8,
    /// Data line 3, `None` in 4-bit mode.
    pub d3: Option<u8>,
    /// Data line 2, `None` in 4-bit mode.
    pub d2: Option<u8>,
    /// Data line 1, `None` in 4-bit mode.
    pub d1: Option<u8>,
    /// Data line 0, `None` in 4-bit mode.
    pub d0: Option<u8>,
    /// Register-select (6800) / command-data (8080) line.
    pub rscd: u8,
    /// Enable (6800) / write-strobe (8080) line.
    pub enwr: u8,
    /// Read/write select (6800) / read-strobe (8080) line, `None` for a
    /// write-only bus.
    pub rwrd: Option<u8>,
    /// Bus protocol.
    pub protocol: Protocol,
    /// Per-transfer timing constants.
    pub timings: BusTimings,
}

impl ChipConfig {
    /// Configuration for a full-width bus, data lines given `d7` first.
    pub fn eight_bit(data: [u8; 8], rscd: u8, enwr: u8, rwrd: Option<u8>, protocol: Protocol) -> Self {
        Self {
            d7: data[0],
            d6: data[1],
            d5: data[2],
            d4: data[3],
            d3: Some(data[4]),
            d2: Some(data[5]),
            d1: Some(data[6]),
            d0: Some(data[7]),
            rscd,
            enwr,
            rwrd,
            protocol,
            timings: BusTimings::default(),
        }
    }

    /// Configuration for a nibble-paired bus on the upper four data
    /// lines, given `d7` first.
    pub fn four_bit(data: [u8; 4], rscd: u8, enwr: u8, rwrd: Option<u8>, protocol: Protocol) -> Self {
        Self {
            d7: data[0],
            d6: data[1],
            d5: data[2],
            d4: data[3],
            d3: None,
            d2: None,
            d1: None,
            d0: None,
            rscd,
            enwr,
            rwrd,
            protocol,
            timings: BusTimings::default(),
        }
    }
}

/// Parallel bus driver errors
#[derive(Debug)]
pub enum ParallelError {
    /// The GPIO memory device could not be opened or mapped.
    Gpio(io::Error),
    /// A read was requested on a bus with no read/write line wired.
    ReadUnsupported,
    /// A required pin lies outside the usable GPIO range.
    InvalidPin(u8),
}

impl fmt::Display for ParallelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(err) => write!(f, "GPIO register window unavailable: {err}"),
            Self::ReadUnsupported => write!(f, "bus is write-only, no read/write line wired"),
            Self::InvalidPin(pin) => write!(f, "pin {pin} outside usable GPIO range 0..=27"),
        }
    }
}

impl std::error::Error for ParallelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpio(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParallelError {
    fn from(err: io::Error) -> Self {
        Self::Gpio(err)
    }
}

/// Transfer mode, selecting the register-select line level.
#[derive(Clone, Copy)]
enum TransferMode {
    Command,
    Data,
}

/// Normalised pin assignments, immutable after construction.
///
/// Data lines are also reachable by index (`d7` at position 0) so the
/// engine can compose masks most-significant-bit first.
struct PinMap {
    data: [Option<u8>; 8],
    rscd: u8,
    enwr: u8,
    rwrd: Option<u8>,
}

impl PinMap {
    fn from_config(config: &ChipConfig) -> Result<Self, ParallelError> {
        for pin in [config.d7, config.d6, config.d5, config.d4, config.rscd, config.enwr] {
            if pin > MAX_PIN {
                return Err(ParallelError::InvalidPin(pin));
            }
        }
        let wired = |pin: Option<u8>| pin.filter(|&p| p <= MAX_PIN);

        Ok(Self {
            data: [
                Some(config.d7),
                Some(config.d6),
                Some(config.d5),
                Some(config.d4),
                wired(config.d3),
                wired(config.d2),
                wired(config.d1),
                wired(config.d0),
            ],
            rscd: config.rscd,
            enwr: config.enwr,
            rwrd: wired(config.rwrd),
        })
    }

    /// Bits transferred per strobe: 4 when `d0` is unwired, 8 otherwise.
    fn bits_per_cycle(&self) -> usize {
        if self.data[7].is_none() {
            4
        } else {
            8
        }
    }
}

/// Driver for one controller chip attached to the parallel bus.
///
/// Construction programs the safe idle state: every wired data line is an
/// input (high impedance) and every control line an output, so the bus is
/// never driven from both ends. Transfers are uninterruptible and rely on
/// busy-wait timing; the driver makes no thread-safety guarantees, and
/// transfers sharing pins or a driver must be serialised by the caller.
pub struct ParallelDriver {
    gpio: GpioController,
    timer: EdgeTimer,
    pins: PinMap,
    protocol: Protocol,
    timings: BusTimings,
}

impl ParallelDriver {
    /// Set up communication with one attached chip.
    ///
    /// Maps the process-wide GPIO register window on first use, programs
    /// the control-line idle levels for the chosen protocol, and commits
    /// the safe pin directions in one staged write. The function-select
    /// snapshot is taken once here; the driver assumes it is the sole
    /// owner of its pins from this point on.
    ///
    /// # Errors
    ///
    /// [`ParallelError::Gpio`] when the GPIO memory device cannot be
    /// opened or mapped (no partial state is left behind), or
    /// [`ParallelError::InvalidPin`] when a required pin is out of range.
    pub fn new(config: ChipConfig) -> Result<Self, ParallelError> {
        let mem = mmio::gpio_mem()?;
        Self::init_with(config, mem)
    }

    fn init_with(config: ChipConfig, mem: GpioMem) -> Result<Self, ParallelError> {
        let pins = PinMap::from_config(&config)?;
        let gpio = GpioController::new(mem);

        log::info!(
            "parallel bus up: {:?}, {}-bit, rscd={} enwr={} rwrd={:?}",
            config.protocol,
            pins.bits_per_cycle(),
            pins.rscd,
            pins.enwr,
            pins.rwrd,
        );

        let mut snapshot = gpio.function_snapshot();

        // Control lines settle on their idle levels before they become
        // outputs: 6800 idles with write mode selected and enable low,
        // 8080 idles with both strobes released high.
        match config.protocol {
            Protocol::Motorola6800 => {
                if let Some(rwrd) = pins.rwrd {
                    gpio.write_level(rwrd, false);
                }
                gpio.write_level(pins.enwr, false);
            }
            Protocol::Intel8080 => {
                if let Some(rwrd) = pins.rwrd {
                    gpio.write_level(rwrd, true);
                }
                gpio.write_level(pins.enwr, true);
            }
        }

        // Data lines high-impedance, control lines driven.
        for &pin in pins.data.iter().flatten() {
            GpioController::stage_function(&mut snapshot, pin, GpioFunction::Input);
        }
        GpioController::stage_function(&mut snapshot, pins.rscd, GpioFunction::Output);
        GpioController::stage_function(&mut snapshot, pins.enwr, GpioFunction::Output);
        if let Some(rwrd) = pins.rwrd {
            GpioController::stage_function(&mut snapshot, rwrd, GpioFunction::Output);
        }
        gpio.commit_functions(&snapshot);

        Ok(Self {
            gpio,
            timer: EdgeTimer::new(),
            pins,
            protocol: config.protocol,
            timings: config.timings,
        })
    }

    /// Whether the bus has a read/write line wired.
    pub fn can_read(&self) -> bool {
        self.pins.rwrd.is_some()
    }

    /// Write a single command byte.
    pub fn write_command(&mut self, command: u8) {
        log::trace!("write command {command:#04x}");
        let (clr, set) = self.mode_masks(TransferMode::Command);
        self.write_parallel(&[command], clr, set);
    }

    /// Write a buffer of data bytes.
    pub fn write_data(&mut self, data: &[u8]) {
        log::trace!("write {} data byte(s)", data.len());
        let (clr, set) = self.mode_masks(TransferMode::Data);
        self.write_parallel(data, clr, set);
    }

    /// Read the chip's status/address register.
    ///
    /// # Errors
    ///
    /// [`ParallelError::ReadUnsupported`] on a write-only bus; no pin is
    /// touched in that case.
    pub fn read_register(&mut self) -> Result<u8, ParallelError> {
        log::trace!("read register");
        let (clr, set) = self.mode_masks(TransferMode::Command);
        let mut value = [0u8; 1];
        self.read_parallel(&mut value, clr, set)?;
        Ok(value[0])
    }

    /// Read a buffer of data bytes.
    ///
    /// # Errors
    ///
    /// [`ParallelError::ReadUnsupported`] on a write-only bus; no pin is
    /// touched in that case.
    pub fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), ParallelError> {
        log::trace!("read {} data byte(s)", buffer.len());
        let (clr, set) = self.mode_masks(TransferMode::Data);
        self.read_parallel(buffer, clr, set)
    }

    /// Clear/set masks putting the register-select line into `mode`.
    ///
    /// The two protocols invert the convention: 6800 selects data with
    /// RS high, 8080 selects data with CD low.
    fn mode_masks(&self, mode: TransferMode) -> (u32, u32) {
        let rscd = 1u32 << self.pins.rscd;
        let high = match (self.protocol, mode) {
            (Protocol::Motorola6800, TransferMode::Data)
            | (Protocol::Intel8080, TransferMode::Command) => true,
            (Protocol::Motorola6800, TransferMode::Command)
            | (Protocol::Intel8080, TransferMode::Data) => false,
        };
        if high {
            (0, rscd)
        } else {
            (rscd, 0)
        }
    }

    /// Consume the next `bits_per_cycle` bits of `datum`, most
    /// significant first, into clear/set masks over the data pins.
    fn data_masks(&self, datum: &mut u8) -> (u32, u32) {
        let bpc = self.pins.bits_per_cycle();
        let mut clr = 0u32;
        let mut set = 0u32;
        for &pin in self.pins.data[..bpc].iter().flatten() {
            if *datum & 0x80 != 0 {
                set |= 1 << pin;
            } else {
                clr |= 1 << pin;
            }
            *datum <<= 1;
        }
        (clr, set)
    }

    /// Emit `data` on the bus; `mode_clr`/`mode_set` carry the
    /// register-select level and are committed with the direction switch.
    fn write_parallel(&mut self, data: &[u8], mode_clr: u32, mode_set: u32) {
        let bpc = self.pins.bits_per_cycle();
        let timings = self.timings;

        // Host data lines become outputs in one staged commit, at a
        // scheduled edge rather than ahead of it.
        let mut snapshot = self.gpio.function_snapshot();
        for &pin in self.pins.data[..bpc].iter().flatten() {
            GpioController::stage_function(&mut snapshot, pin, GpioFunction::Output);
        }
        self.timer.wait();
        self.gpio.commit_functions(&snapshot);
        self.gpio.clear_mask(mode_clr);
        self.gpio.set_mask(mode_set);
        self.timer.advance();
        self.timer.set_delay(timings.setup_ns);

        let strobe = 1u32 << self.pins.enwr;

        for &byte in data {
            let mut datum = byte;
            for phase in (1..=8 / bpc).rev() {
                let (mut clr, mut set) = match self.protocol {
                    Protocol::Motorola6800 => (0, strobe),
                    Protocol::Intel8080 => (strobe, 0),
                };
                let (data_clr, data_set) = self.data_masks(&mut datum);
                clr |= data_clr;
                set |= data_set;

                self.timer.wait();
                // The active strobe edge lands last, after the data
                // lines have settled: 6800 raises EN in the set word,
                // 8080 drops WR in the clear word.
                match self.protocol {
                    Protocol::Motorola6800 => {
                        self.gpio.clear_mask(clr);
                        self.gpio.set_mask(set);
                    }
                    Protocol::Intel8080 => {
                        self.gpio.set_mask(set);
                        self.gpio.clear_mask(clr);
                    }
                }
                self.timer.advance();
                self.timer.set_delay(timings.clock_ns);

                self.timer.wait();
                match self.protocol {
                    Protocol::Motorola6800 => self.gpio.clear_mask(strobe),
                    Protocol::Intel8080 => self.gpio.set_mask(strobe),
                }
                self.timer.advance();
                self.timer.set_delay(if phase == 1 {
                    timings.process_ns
                } else {
                    timings.clock_ns
                });
            }
        }

        // Back to high impedance immediately, without waiting out the
        // pending delay.
        for &pin in self.pins.data[..bpc].iter().flatten() {
            GpioController::stage_function(&mut snapshot, pin, GpioFunction::Input);
        }
        self.gpio.commit_functions(&snapshot);
    }

    /// Fill `buffer` from the bus; `mode_clr`/`mode_set` carry the
    /// register-select level.
    fn read_parallel(
        &mut self,
        buffer: &mut [u8],
        mode_clr: u32,
        mode_set: u32,
    ) -> Result<(), ParallelError> {
        let Some(rwrd) = self.pins.rwrd else {
            return Err(ParallelError::ReadUnsupported);
        };
        let bpc = self.pins.bits_per_cycle();
        let timings = self.timings;

        let mut set = mode_set;
        // 6800 hands the data lines to the controller by raising RW; as
        // late as possible so it does not start driving early.
        if self.protocol == Protocol::Motorola6800 {
            set |= 1 << rwrd;
        }
        self.timer.wait();
        self.gpio.clear_mask(mode_clr);
        self.gpio.set_mask(set);
        self.timer.advance();
        self.timer.set_delay(timings.setup_ns);

        let strobe = match self.protocol {
            Protocol::Motorola6800 => 1u32 << self.pins.enwr,
            Protocol::Intel8080 => 1u32 << rwrd,
        };

        for slot in buffer.iter_mut() {
            let mut value = 0u8;
            for phase in (1..=8 / bpc).rev() {
                self.timer.wait();
                match self.protocol {
                    Protocol::Motorola6800 => self.gpio.set_mask(strobe),
                    Protocol::Intel8080 => self.gpio.clear_mask(strobe),
                }
                self.timer.advance();
                self.timer.set_delay(timings.read_ns);

                self.timer.wait();
                let levels = self.gpio.level_word();
                // The sample is instantaneous; the schedule is not
                // refreshed, so the deassert edge keeps its original
                // target and the strobe stays up for read + clock.
                self.timer.set_delay(timings.clock_ns);
                for &pin in self.pins.data[..bpc].iter().flatten() {
                    value <<= 1;
                    if levels & (1 << pin) != 0 {
                        value |= 1;
                    }
                }

                self.timer.wait();
                match self.protocol {
                    Protocol::Motorola6800 => self.gpio.clear_mask(strobe),
                    Protocol::Intel8080 => self.gpio.set_mask(strobe),
                }
                self.timer.advance();
                let gap = if phase == 1 {
                    timings.process_ns
                } else {
                    timings.clock_ns
                };
                self.timer.set_delay(gap.max(timings.hold_ns));
            }
            *slot = value;
        }

        // Take the data lines back immediately so the controller stops
        // driving them.
        if self.protocol == Protocol::Motorola6800 {
            self.gpio.clear_mask(1 << rwrd);
        }
        Ok(())
    }
}

impl Drop for ParallelDriver {
    fn drop(&mut self) {
        // Pin directions are left as they are: data lines already sit in
        // the safe input state.
        log::info!("parallel bus released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::GPIO_MEM_WORDS;
    use std::time::{Duration, Instant};

    const GPFSEL0: usize = 0;
    const GPSET0: usize = 7;
    const GPCLR0: usize = 10;
    const GPLEV0: usize = 13;

    // d7..d0
    const DATA: [u8; 8] = [21, 20, 16, 12, 25, 24, 23, 18];
    const RSCD: u8 = 2;
    const ENWR: u8 = 3;
    const RWRD: u8 = 4;

    fn test_timings() -> BusTimings {
        BusTimings {
            setup_ns: 60,
            clock_ns: 300,
            read_ns: 300,
            process_ns: 10_000,
            hold_ns: 10,
        }
    }

    fn config_8bit(protocol: Protocol) -> ChipConfig {
        let mut config = ChipConfig::eight_bit(DATA, RSCD, ENWR, Some(RWRD), protocol);
        config.timings = test_timings();
        config
    }

    fn config_4bit(protocol: Protocol) -> ChipConfig {
        let mut config =
            ChipConfig::four_bit([DATA[0], DATA[1], DATA[2], DATA[3]], RSCD, ENWR, Some(RWRD), protocol);
        config.timings = test_timings();
        config
    }

    fn driver(config: ChipConfig, words: &mut [u32; GPIO_MEM_WORDS]) -> ParallelDriver {
        ParallelDriver::init_with(config, GpioMem::from_ptr(words.as_mut_ptr())).unwrap()
    }

    fn function_of(words: &[u32; GPIO_MEM_WORDS], pin: u8) -> u32 {
        (words[GPFSEL0 + usize::from(pin) / 10] >> ((u32::from(pin) % 10) * 3)) & 0b111
    }

    fn data_bits(byte: u8, pins: &[u8]) -> u32 {
        let mut mask = 0;
        for (i, &pin) in pins.iter().enumerate() {
            if byte & (0x80 >> i) != 0 {
                mask |= 1 << pin;
            }
        }
        mask
    }

    #[test]
    fn pin_28_is_normalised_to_unwired() {
        let mut config = config_8bit(Protocol::Motorola6800);
        config.d0 = Some(28);
        config.rwrd = Some(28);

        let pins = PinMap::from_config(&config).unwrap();
        assert_eq!(pins.data[7], None);
        assert_eq!(pins.rwrd, None);

        // 27 itself is accepted
        let mut config = config_8bit(Protocol::Motorola6800);
        config.d0 = Some(27);
        let pins = PinMap::from_config(&config).unwrap();
        assert_eq!(pins.data[7], Some(27));
        assert_eq!(pins.bits_per_cycle(), 8);
    }

    #[test]
    fn required_pin_out_of_range_is_rejected() {
        let mut config = config_8bit(Protocol::Motorola6800);
        config.rscd = 28;

        let err = PinMap::from_config(&config).map(|_| ()).unwrap_err();
        assert!(matches!(err, ParallelError::InvalidPin(28)));
    }

    #[test]
    fn init_sets_safe_directions_and_idle_levels() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let _bus = driver(config_8bit(Protocol::Motorola6800), &mut words);

        for pin in DATA {
            assert_eq!(function_of(&words, pin), 0, "data pin {pin} must be input");
        }
        for pin in [RSCD, ENWR, RWRD] {
            assert_eq!(function_of(&words, pin), 1, "control pin {pin} must be output");
        }

        // 6800 idles enable low (the last clear written) and never sets
        assert_eq!(words[GPCLR0], 1 << ENWR);
        assert_eq!(words[GPSET0], 0);
    }

    #[test]
    fn init_8080_idles_strobes_high() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let _bus = driver(config_8bit(Protocol::Intel8080), &mut words);

        assert_eq!(words[GPSET0], 1 << ENWR);
        assert_eq!(words[GPCLR0], 0);
    }

    #[test]
    fn write_restores_inputs_and_ends_with_strobe_drop() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut bus = driver(config_8bit(Protocol::Motorola6800), &mut words);

        bus.write_command(0x3c);

        for pin in DATA {
            assert_eq!(function_of(&words, pin), 0, "data pin {pin} back to input");
        }
        // final phase: set word carried the enable plus the high data
        // bits of 0x3c, then the enable was cleared on its own
        assert_eq!(words[GPSET0], (1 << ENWR) | data_bits(0x3c, &DATA));
        assert_eq!(words[GPCLR0], 1 << ENWR);
    }

    #[test]
    fn write_8080_ends_with_strobe_release() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut bus = driver(config_8bit(Protocol::Intel8080), &mut words);

        bus.write_data(&[0xa5]);

        // final phase: clear word carried WR plus the low data bits,
        // then WR was set back high on its own
        assert_eq!(words[GPCLR0], (1 << ENWR) | data_bits(!0xa5, &DATA));
        assert_eq!(words[GPSET0], 1 << ENWR);
    }

    #[test]
    fn four_bit_write_sends_low_nibble_last() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut bus = driver(config_4bit(Protocol::Motorola6800), &mut words);

        bus.write_command(0x3c);

        // last phase on the wire is the low nibble 0xc on d7..d4
        let upper = [DATA[0], DATA[1], DATA[2], DATA[3]];
        assert_eq!(words[GPSET0], (1 << ENWR) | data_bits(0xc0, &upper));
        for pin in upper {
            assert_eq!(function_of(&words, pin), 0);
        }
    }

    #[test]
    fn nibbles_leave_most_significant_first() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let bus = driver(config_4bit(Protocol::Motorola6800), &mut words);

        let mut datum = 0x3c;
        let (clr, set) = bus.data_masks(&mut datum);
        // first phase carries the high nibble 0x3
        let upper = [DATA[0], DATA[1], DATA[2], DATA[3]];
        assert_eq!(set, data_bits(0x30, &upper));
        assert_eq!(clr, data_bits(!0x30, &upper));
        assert_eq!(datum, 0xc0);

        let (_, set) = bus.data_masks(&mut datum);
        assert_eq!(set, data_bits(0xc0, &upper));
    }

    #[test]
    fn read_register_assembles_bits_from_the_level_word() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        words[GPLEV0] = data_bits(0xa5, &DATA);
        let mut bus = driver(config_8bit(Protocol::Motorola6800), &mut words);

        assert_eq!(bus.read_register().unwrap(), 0xa5);
        // the controller was released from the bus at the end
        assert_eq!(words[GPCLR0], 1 << RWRD);
    }

    #[test]
    fn read_data_fills_the_buffer_in_order() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        words[GPLEV0] = data_bits(0x5a, &DATA);
        let mut bus = driver(config_8bit(Protocol::Intel8080), &mut words);

        let mut buffer = [0u8; 2];
        bus.read_data(&mut buffer).unwrap();
        assert_eq!(buffer, [0x5a, 0x5a]);
        // 8080 releases the read strobe high at the end of each phase
        assert_eq!(words[GPSET0], 1 << RWRD);
    }

    #[test]
    fn four_bit_read_packs_the_first_nibble_high() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let upper = [DATA[0], DATA[1], DATA[2], DATA[3]];
        // 0b1010 on d7..d4; both nibble samples see the same levels
        words[GPLEV0] = data_bits(0xa0, &upper);
        let mut bus = driver(config_4bit(Protocol::Motorola6800), &mut words);

        assert_eq!(bus.read_register().unwrap(), 0xaa);
    }

    #[test]
    fn write_only_bus_rejects_reads_without_side_effects() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut bus = driver(
            ChipConfig {
                rwrd: None,
                ..config_8bit(Protocol::Motorola6800)
            },
            &mut words,
        );
        let before = words;

        assert!(matches!(bus.read_register(), Err(ParallelError::ReadUnsupported)));
        let mut buffer = [0u8; 4];
        assert!(matches!(
            bus.read_data(&mut buffer),
            Err(ParallelError::ReadUnsupported)
        ));
        assert!(!bus.can_read());
        assert_eq!(words, before, "no pin may toggle on a rejected read");
    }

    #[test]
    fn zero_length_transfers_only_touch_directions_and_mode() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut bus = driver(config_8bit(Protocol::Motorola6800), &mut words);

        bus.write_data(&[]);
        let mut empty: [u8; 0] = [];
        bus.read_data(&mut empty).unwrap();

        for pin in DATA {
            assert_eq!(function_of(&words, pin), 0);
        }
        // the empty read ended by handing the bus back to write mode
        assert_eq!(words[GPCLR0], 1 << RWRD);
    }

    #[test]
    fn consecutive_writes_pace_the_bus() {
        let mut words = [0u32; GPIO_MEM_WORDS];
        let mut config = config_8bit(Protocol::Motorola6800);
        config.timings.process_ns = 2_000_000;
        let mut bus = driver(config, &mut words);

        let start = Instant::now();
        bus.write_command(0x00);
        bus.write_command(0x00);

        // the second transfer must wait out the first one's processing
        // gap before its direction switch
        assert!(start.elapsed() >= Duration::from_nanos(2_000_000));
    }
}
