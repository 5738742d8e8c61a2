//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use pixiprog_core::motor::Drive;
use std::path::PathBuf;

/// Parse a string as a hex (0x-prefixed) or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex (0x-prefixed) or decimal u16
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u16>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "pixiprog")]
#[command(author, version, about = "PiXi-200 FPGA configuration loader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration port backend (backend:key=value,...)
    #[arg(long, global = true, default_value = "linux_gpio:dev=/dev/gpiochip0")]
    pub gpio: String,

    /// Register transport backend (backend:key=value,...)
    #[arg(long, global = true, default_value = "linux_spi:dev=/dev/spidev0.0")]
    pub spi: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a configuration image into the FPGA
    Prog {
        /// Load this file instead of consulting the image table
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Read a 16-bit FPGA register
    Get {
        /// Register address (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        address: u8,
    },

    /// Write a 16-bit FPGA register
    Set {
        /// Register address (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        address: u8,

        /// Value to write (hex or decimal)
        #[arg(value_parser = parse_hex_u16)]
        data: u16,
    },

    /// LCD / VFD display control
    #[command(subcommand)]
    Lcd(LcdCommands),

    /// Drive the motor PWM channels
    Motor {
        /// Direction
        direction: Direction,

        /// Speed in percent
        #[arg(default_value_t = 50)]
        speed: u8,
    },

    /// Load and start the built-in motor demo sequence
    MotorDemo {
        /// Restart the sequencer without reloading the program
        #[arg(long)]
        no_load: bool,
    },
}

/// Display subcommands
#[derive(Subcommand)]
pub enum LcdCommands {
    /// Initialize the display and show the greeting
    Init {
        /// Leave the cursor visible
        #[arg(long)]
        cursor: bool,
    },

    /// Set brightness, 0 (full) to 3 (dimmest)
    Brightness { level: u8 },

    /// Write text at a display position
    Write {
        /// Column
        x: u8,
        /// Row
        y: u8,
        /// Text to show
        text: String,
    },
}

/// Motor direction argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    #[value(alias = "f")]
    Forward,
    #[value(alias = "b")]
    Backward,
    #[value(alias = "l")]
    Left,
    #[value(alias = "r")]
    Right,
    #[value(alias = "s")]
    Stop,
}

impl From<Direction> for Drive {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Forward => Drive::Forward,
            Direction::Backward => Drive::Backward,
            Direction::Left => Drive::Left,
            Direction::Right => Drive::Right,
            Direction::Stop => Drive::Stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_decimal_accepted() {
        assert_eq!(parse_hex_u8("0x38").unwrap(), 0x38);
        assert_eq!(parse_hex_u8("56").unwrap(), 56);
        assert_eq!(parse_hex_u16("0xF8F8").unwrap(), 0xF8F8);
        assert!(parse_hex_u8("0x100").is_err());
        assert!(parse_hex_u16("nope").is_err());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
