//! HD44780 character LCD bring-up over a 4-bit 6800 bus.
//!
//! Wiring for this demo (BCM numbering): D7..D4 on GPIO 26/19/13/6,
//! RS on 21, EN on 20, RW grounded (write-only). Adjust to taste.

use std::thread;
use std::time::Duration;

use parallel_bus_driver::{ChipConfig, ParallelDriver, Protocol};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChipConfig::four_bit([26, 19, 13, 6], 21, 20, None, Protocol::Motorola6800);
    let mut lcd = ParallelDriver::new(config)?;

    // Three 8-bit function-sets force a known state regardless of how
    // the module powered up, the fourth drops it into 4-bit mode.
    lcd.write_command(0x33);
    lcd.write_command(0x32);

    // 4-bit, two lines, 5x8 font; display on; left-to-right entry
    lcd.write_command(0x28);
    lcd.write_command(0x0c);
    lcd.write_command(0x06);

    // clear needs more than the usual processing gap
    lcd.write_command(0x01);
    thread::sleep(Duration::from_millis(2));

    lcd.write_data(b"hello, world");

    // second row
    lcd.write_command(0x80 | 0x40);
    lcd.write_data(b"4-bit 6800 bus");

    Ok(())
}
