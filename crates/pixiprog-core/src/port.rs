//! Configuration port trait
//!
//! The FPGA is configured in Xilinx slave-serial fashion over four lines:
//! PROG (output, active-low reset into configuration mode), INIT (input,
//! asserted by the device when it is ready for data), CCLK (output, serial
//! clock) and DATA (output, serial data sampled on the rising CCLK edge).
//!
//! Backends claim the lines with the right directions when they open, so an
//! implementation of this trait is already direction-configured. All
//! operations are synchronous and must take effect immediately; the loader
//! relies on there being no buffering between a `set_*` call and the pin.

/// Trait for the four FPGA configuration lines
///
/// Implementations should log and swallow per-call I/O failures rather than
/// return them: a mid-transfer line error cannot be recovered from anyway,
/// and the post-load version check catches a failed configuration.
pub trait ConfigPort {
    /// Drive the PROG (program-enable) line
    fn set_prog(&mut self, high: bool);

    /// Drive the CCLK (configuration clock) line
    fn set_cclk(&mut self, high: bool);

    /// Drive the DATA line
    fn set_data(&mut self, high: bool);

    /// Read the INIT (ready) line
    fn read_init(&mut self) -> bool;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}
