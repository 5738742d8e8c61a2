//! Register transfer protocol
//!
//! Every register exchange with the PiXi-200 is one full-duplex 4-byte frame:
//!
//! ```text
//! tx: [ address, opcode, data_hi, data_lo ]
//! rx: [ .......  ......  resp_hi, resp_lo ]
//! ```
//!
//! The opcode selects read or write; the 16-bit response arrives in the last
//! two bytes of the same frame. Backends only have to move the frame; the
//! helpers here build it and unpack the response.

use crate::error::Result;
use core::fmt;

/// Frame opcodes
pub mod opcodes {
    /// Enable a 16-bit register write
    pub const WRITE: u8 = 0x40;
    /// Enable a 16-bit register read
    pub const READ: u8 = 0x80;
}

/// Register addresses used by this tool
pub mod regs {
    /// FPGA version identifier, low word
    pub const VERSION0: u8 = 0x00;
    /// FPGA version identifier, middle word
    pub const VERSION1: u8 = 0x01;
    /// FPGA version identifier, high word
    pub const VERSION2: u8 = 0x02;

    /// GPIO3 bank mode, lower byte (mode 2 = LCD/VFD drive)
    pub const GPIO3A_MODE: u8 = 0x2C;
    /// GPIO3 bank mode, upper byte
    pub const GPIO3B_MODE: u8 = 0x2D;

    /// LCD / VFD command and data register
    pub const LCD: u8 = 0x38;

    /// PWM sequencer step, channel 0-3
    pub const PWM_SEQ: [u8; 4] = [0x40, 0x41, 0x42, 0x43];
    /// Rear-right motor PWM command
    pub const PWM_RR: u8 = 0x44;
    /// Front-right motor PWM command
    pub const PWM_FR: u8 = 0x45;
    /// Rear-left motor PWM command
    pub const PWM_RL: u8 = 0x46;
    /// Front-left motor PWM command. Writing this register latches all four
    /// channels, so it must always be written last.
    pub const PWM_FL: u8 = 0x47;
    /// PWM sequencer enable (1) / disable (0)
    pub const PWM_SEQ_CTRL: u8 = 0x4F;

    /// Currently active demo build number, written by the demo bitstreams
    pub const DEMO_STATUS: u8 = 0xF8;
}

/// Trait for the register request/response primitive
pub trait RegisterTransport {
    /// Perform one 4-byte register exchange and return the 16-bit response
    fn transfer(&mut self, address: u8, opcode: u8, data: u16) -> Result<u16>;

    /// Read a 16-bit register
    fn read_register(&mut self, address: u8) -> Result<u16> {
        self.transfer(address, opcodes::READ, 0)
    }

    /// Write a 16-bit register, returning the value shifted back
    fn write_register(&mut self, address: u8, data: u16) -> Result<u16> {
        self.transfer(address, opcodes::WRITE, data)
    }
}

/// Wire frame length in bytes
pub const FRAME_LEN: usize = 4;

/// Pack a register exchange into the 4-byte wire frame
pub fn encode_frame(address: u8, opcode: u8, data: u16) -> [u8; FRAME_LEN] {
    [address, opcode, (data >> 8) as u8, data as u8]
}

/// Unpack the 16-bit response from a received 4-byte frame
pub fn decode_response(frame: &[u8; FRAME_LEN]) -> u16 {
    ((frame[2] as u16) << 8) | frame[3] as u16
}

/// FPGA version identifier read back after configuration
///
/// Three 16-bit words, read from registers 0x02, 0x01, 0x00 in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceVersion(pub [u16; 3]);

impl fmt::Display for DeviceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}{:04x}{:04x}", self.0[0], self.0[1], self.0[2])
    }
}

/// Read the device version identifier (three sequential register reads)
pub fn read_version<T: RegisterTransport + ?Sized>(transport: &mut T) -> Result<DeviceVersion> {
    let hi = transport.read_register(regs::VERSION2)?;
    let mid = transport.read_register(regs::VERSION1)?;
    let lo = transport.read_register(regs::VERSION0)?;
    Ok(DeviceVersion([hi, mid, lo]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout() {
        assert_eq!(
            encode_frame(0x38, opcodes::WRITE, 0x0241),
            [0x38, 0x40, 0x02, 0x41]
        );
        assert_eq!(encode_frame(0xF8, opcodes::READ, 0), [0xF8, 0x80, 0, 0]);
    }

    #[test]
    fn response_is_last_two_bytes() {
        assert_eq!(decode_response(&[0xAA, 0xBB, 0x12, 0x34]), 0x1234);
    }

    #[test]
    fn version_formats_as_48_bit_hex() {
        let v = DeviceVersion([0x0001, 0x0203, 0xBEEF]);
        assert_eq!(v.to_string(), "00010203beef");
    }
}
