//! Linux GPIO backend for the PiXi-200 configuration port
//!
//! Drives the FPGA's slave-serial configuration pins (PROG, INIT, CCLK,
//! DATA) through the Linux GPIO character device using the `gpiocdev`
//! crate.
//!
//! # Example
//!
//! ```no_run
//! use pixiprog_linux_gpio::{LinuxGpioPort, LinuxGpioPortConfig};
//!
//! let config = LinuxGpioPortConfig::new("/dev/gpiochip0");
//! let port = LinuxGpioPort::open(&config).unwrap();
//! ```

mod device;
mod error;

pub use device::{parse_options, LinuxGpioPort, LinuxGpioPortConfig};
pub use error::{LinuxGpioError, Result};
