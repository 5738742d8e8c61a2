//! Bit-serial FPGA configuration loader
//!
//! The load is one linear sequence: read the demo status register, pick and
//! read the image, pulse PROG low to drop the device into configuration
//! mode, wait (bounded) for INIT, shift every byte out MSB-first on the
//! rising CCLK edge, run eight extra flush clocks, and finally read back the
//! version registers as a sanity check.
//!
//! Image selection and reading happen *before* the PROG pulse: if no
//! candidate file exists, the device is left untouched beyond line-direction
//! setup. The transfer itself is never retried; any failure is terminal.

use crate::error::{Error, Result};
use crate::image::{self, ImageTable};
use crate::port::ConfigPort;
use crate::transport::{self, DeviceVersion, RegisterTransport};
use std::path::Path;

/// Timing and bounds for the configuration sequence
///
/// Defaults are the values the hardware was characterized with; there is no
/// reason to change them outside of tests.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Width of the PROG low pulse, in microseconds
    pub reset_pulse_us: u32,
    /// Sleep between INIT polls, in microseconds
    pub poll_interval_us: u32,
    /// Maximum number of INIT polls before giving up
    pub poll_iterations: u32,
    /// Post-transfer settling time before the version read, in microseconds
    pub settle_us: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            reset_pulse_us: 1_000,
            poll_interval_us: 1_000,
            poll_iterations: 100,
            settle_us: 100_000,
        }
    }
}

/// Progress notifications from the transfer loop
///
/// `advance` fires exactly once per 10% decile of cumulative bytes sent,
/// regardless of how the transfer is chunked internally.
pub trait LoadProgress {
    /// The transfer is starting; `total_bytes` is the image length
    fn begin(&mut self, total_bytes: usize) {
        let _ = total_bytes;
    }

    /// A 10% decile boundary was crossed
    fn advance(&mut self, percent: u32, bytes_sent: usize) {
        let _ = (percent, bytes_sent);
    }

    /// The transfer (including flush clocks) finished
    fn complete(&mut self) {}
}

/// Progress sink that discards all notifications
pub struct NullProgress;

impl LoadProgress for NullProgress {}

/// Decile tracker: reports each 10% threshold exactly once
struct DecileTicker {
    total: usize,
    emitted: u32,
}

impl DecileTicker {
    fn new(total: usize) -> Self {
        Self { total, emitted: 0 }
    }

    fn update(&mut self, sent: usize, progress: &mut dyn LoadProgress) {
        if self.total == 0 {
            return;
        }
        while self.emitted < 10 && sent * 10 >= (self.emitted as usize + 1) * self.total {
            self.emitted += 1;
            progress.advance(self.emitted * 10, sent);
        }
    }
}

/// Run the full configuration sequence and return the device version.
///
/// The demo status register is read first (it only steers image selection),
/// then the image is selected and loaded into memory, and only then is the
/// device reset and programmed.
pub fn run<P, T>(
    port: &mut P,
    transport: &mut T,
    images: &ImageTable,
    cfg: &LoaderConfig,
    progress: &mut dyn LoadProgress,
) -> Result<DeviceVersion>
where
    P: ConfigPort + ?Sized,
    T: RegisterTransport + ?Sized,
{
    let status = transport.read_register(transport::regs::DEMO_STATUS)?;
    log::debug!("demo status register: 0x{:04x}", status);

    let path = images
        .select(status, Path::exists)
        .ok_or(Error::ConfigurationNotFound)?;
    log::info!("loading {}", path.display());

    let image = image::read_image(path)?;

    transfer(port, &image, cfg, progress)?;

    // Let the device finish its startup sequence before talking registers.
    port.delay_us(cfg.settle_us);

    let version = transport::read_version(transport)?;
    progress.complete();
    Ok(version)
}

/// Reset the device and clock the image out bit-serially.
///
/// Issues exactly `8 * image.len()` data clock pulses plus 8 trailing flush
/// pulses. Fails with [`Error::HardwareNotReady`] before any data clock if
/// INIT never asserts.
pub fn transfer<P: ConfigPort + ?Sized>(
    port: &mut P,
    image: &[u8],
    cfg: &LoaderConfig,
    progress: &mut dyn LoadProgress,
) -> Result<()> {
    // Reset into configuration mode: PROG low, hold, back high.
    log::debug!("pulsing PROG low for {} us", cfg.reset_pulse_us);
    port.set_prog(false);
    port.delay_us(cfg.reset_pulse_us);
    port.set_prog(true);

    log::debug!("waiting for INIT");
    let mut ready = false;
    for _ in 0..cfg.poll_iterations {
        if port.read_init() {
            ready = true;
            break;
        }
        port.delay_us(cfg.poll_interval_us);
    }
    if !ready {
        return Err(Error::HardwareNotReady);
    }

    log::info!("device ready, sending {} bytes", image.len());
    progress.begin(image.len());

    let mut ticker = DecileTicker::new(image.len());
    for (index, &byte) in image.iter().enumerate() {
        shift_out_byte(port, byte);
        ticker.update(index + 1, progress);
    }

    // The device pipeline needs a few more clocks after the last data bit.
    run_clock(port, 8);
    Ok(())
}

/// Shift one byte out MSB-first; DATA is valid before each rising CCLK edge
fn shift_out_byte<P: ConfigPort + ?Sized>(port: &mut P, byte: u8) {
    for i in (0..8).rev() {
        port.set_cclk(false);
        port.set_data((byte >> i) & 1 != 0);
        port.set_cclk(true);
    }
}

/// Run CCLK for a number of cycles without changing DATA
fn run_clock<P: ConfigPort + ?Sized>(port: &mut P, cycles: usize) {
    for _ in 0..cycles {
        port.set_cclk(false);
        port.set_cclk(true);
    }
}
