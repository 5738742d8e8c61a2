//! Linux spidev backend for the PiXi-200 register transport
//!
//! Talks to the PiXi-200 FPGA's register file through the kernel's
//! `/dev/spidevX.Y` interface. On a Raspberry Pi the PiXi sits on SPI bus 0,
//! chip select 0.
//!
//! # Example
//!
//! ```no_run
//! use pixiprog_linux_spi::{LinuxSpi, LinuxSpiConfig};
//! use pixiprog_core::transport::{RegisterTransport, regs};
//!
//! let mut spi = LinuxSpi::open_device("/dev/spidev0.0").unwrap();
//! let version = spi.read_register(regs::VERSION0).unwrap();
//! println!("{:04x}", version);
//! ```

mod device;
mod error;

pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};
