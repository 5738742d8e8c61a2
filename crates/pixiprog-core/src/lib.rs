//! pixiprog-core - Core library for PiXi-200 FPGA board control
//!
//! This crate contains the hardware-independent pieces of pixiprog: the
//! bit-serial configuration loader, the register-transfer protocol helpers,
//! and the capability traits that backends implement.
//!
//! # Architecture
//!
//! Two small traits form the seam between algorithms and hardware:
//!
//! - [`port::ConfigPort`] - the four FPGA configuration lines (program-enable,
//!   init, clock, data) plus a delay primitive
//! - [`transport::RegisterTransport`] - the 4-byte request/response register
//!   exchange used for status and version reads and for all register-level
//!   operations (LCD, motor PWM)
//!
//! The loader in [`loader`] drives both and never touches a device file
//! directly, so it can run against the in-memory fakes from pixiprog-dummy.
//!
//! # Example
//!
//! ```ignore
//! use pixiprog_core::{loader, image::ImageTable};
//!
//! let table = ImageTable::pixi_defaults();
//! let version = loader::run(
//!     &mut port,
//!     &mut transport,
//!     &table,
//!     &loader::LoaderConfig::default(),
//!     &mut loader::NullProgress,
//! )?;
//! println!("FPGA version: {}", version);
//! ```

pub mod error;
pub mod image;
pub mod lcd;
pub mod loader;
pub mod motor;
pub mod port;
pub mod transport;

pub use error::{Error, Result};
