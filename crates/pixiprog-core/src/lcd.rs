//! LCD / VFD display control
//!
//! The display hangs off the GPIO3 bank; putting that bank into mode 2 routes
//! it to the display driver, after which every display command or data byte
//! is a single write to the LCD register. Bit 9 of the written word is the
//! RS flag: clear for controller commands, set for display data.

use crate::error::Result;
use crate::transport::{regs, RegisterTransport};

/// GPIO3 bank mode that drives the LCD/VFD directly
const BANK_MODE_LCD: u16 = 2;

/// RS flag: the low byte is display data rather than a controller command
const RS_DATA: u16 = 0x0200;

/// Controller commands (HD44780-style)
mod cmd {
    pub const FUNCTION_SET: u16 = 0x0030;
    pub const CLEAR: u16 = 0x0001;
    pub const HOME: u16 = 0x0002;
    pub const ENTRY_MODE: u16 = 0x0006;
    pub const DISPLAY_ON: u16 = 0x000C;
    pub const DISPLAY_ON_CURSOR: u16 = 0x000F;
    pub const SET_ADDRESS: u16 = 0x0080;
}

/// Text shown after a display init
const GREETING: &str = "Welcome to the PiXi-200!";

/// Route the GPIO3 bank to the display driver
pub fn select_display_mode<T: RegisterTransport + ?Sized>(transport: &mut T) -> Result<()> {
    transport.write_register(regs::GPIO3A_MODE, BANK_MODE_LCD)?;
    transport.write_register(regs::GPIO3B_MODE, BANK_MODE_LCD)?;
    Ok(())
}

fn command<T: RegisterTransport + ?Sized>(transport: &mut T, word: u16) -> Result<()> {
    transport.write_register(regs::LCD, word)?;
    Ok(())
}

/// Initialize the display and show the greeting.
///
/// With `cursor` set the cursor is left visible and blinking.
pub fn init<T: RegisterTransport + ?Sized>(transport: &mut T, cursor: bool) -> Result<()> {
    select_display_mode(transport)?;
    command(transport, cmd::FUNCTION_SET)?;
    // Brightness starts low on a plain init, full when the cursor is shown.
    command(transport, RS_DATA | if cursor { 0 } else { 3 })?;
    command(transport, cmd::CLEAR)?;
    command(transport, cmd::HOME)?;
    command(transport, cmd::ENTRY_MODE)?;
    command(
        transport,
        if cursor {
            cmd::DISPLAY_ON_CURSOR
        } else {
            cmd::DISPLAY_ON
        },
    )?;
    write_text(transport, GREETING)
}

/// Set display brightness, 0 (full) to 3 (dimmest)
pub fn brightness<T: RegisterTransport + ?Sized>(transport: &mut T, level: u8) -> Result<()> {
    select_display_mode(transport)?;
    command(transport, cmd::FUNCTION_SET)?;
    command(transport, RS_DATA | u16::from(level & 0x03))
}

/// Move the display cursor to column `x`, row `y`
pub fn goto_xy<T: RegisterTransport + ?Sized>(transport: &mut T, x: u8, y: u8) -> Result<()> {
    command(
        transport,
        cmd::SET_ADDRESS | (u16::from(y & 0x3F) << 6) | u16::from(x & 0x3F),
    )
}

/// Send a text string to the display at the current cursor position
pub fn write_text<T: RegisterTransport + ?Sized>(transport: &mut T, text: &str) -> Result<()> {
    for byte in text.bytes() {
        command(transport, RS_DATA | u16::from(byte))?;
    }
    Ok(())
}

/// Move the cursor and write a string there
pub fn write_at<T: RegisterTransport + ?Sized>(
    transport: &mut T,
    x: u8,
    y: u8,
    text: &str,
) -> Result<()> {
    select_display_mode(transport)?;
    goto_xy(transport, x, y)?;
    write_text(transport, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::opcodes;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, u16)>,
    }

    impl RegisterTransport for Recorder {
        fn transfer(&mut self, address: u8, opcode: u8, data: u16) -> Result<u16> {
            assert_eq!(opcode, opcodes::WRITE);
            self.writes.push((address, data));
            Ok(data)
        }
    }

    #[test]
    fn write_at_sets_mode_then_address_then_data() {
        let mut rec = Recorder::default();
        write_at(&mut rec, 4, 1, "Hi").unwrap();
        assert_eq!(
            rec.writes,
            vec![
                (regs::GPIO3A_MODE, 2),
                (regs::GPIO3B_MODE, 2),
                (regs::LCD, 0x0080 | (1 << 6) | 4),
                (regs::LCD, 0x0200 | u16::from(b'H')),
                (regs::LCD, 0x0200 | u16::from(b'i')),
            ]
        );
    }

    #[test]
    fn brightness_masks_to_two_bits() {
        let mut rec = Recorder::default();
        brightness(&mut rec, 0xFF).unwrap();
        assert_eq!(rec.writes.last().unwrap(), &(regs::LCD, 0x0203));
    }

    #[test]
    fn init_ends_with_display_on_and_greeting() {
        let mut rec = Recorder::default();
        init(&mut rec, false).unwrap();
        // mode (2) + 6 controller words + greeting characters
        assert_eq!(rec.writes.len(), 2 + 6 + GREETING.len());
        assert_eq!(rec.writes[7], (regs::LCD, cmd::DISPLAY_ON));
    }
}
