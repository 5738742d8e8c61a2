//! Linux GPIO configuration port implementation
//!
//! Implements the `ConfigPort` trait over the Linux GPIO character device
//! (gpiocdev). PROG, CCLK and DATA are claimed as outputs, INIT as input,
//! with PROG idling high so the FPGA is not reset by merely opening the
//! port. The deprecated sysfs interface is not used.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use pixiprog_core::port::ConfigPort;

/// GPIO line indices
#[derive(Debug, Clone, Copy)]
enum Line {
    Prog = 0,
    Init = 1,
    Cclk = 2,
    Data = 3,
}

/// Number of GPIO lines we use
const NUM_LINES: usize = 4;

/// Default BCM line offsets for the PiXi-200 header
mod defaults {
    use super::Offset;

    pub const PROG: Offset = 25;
    pub const INIT: Offset = 27;
    pub const CCLK: Offset = 17;
    pub const DATA: Offset = 18;
}

/// Configuration for opening a Linux GPIO configuration port
#[derive(Debug, Clone)]
pub struct LinuxGpioPortConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// PROG (program-enable) line offset
    pub prog: Offset,
    /// INIT (ready) line offset
    pub init: Offset,
    /// CCLK (configuration clock) line offset
    pub cclk: Offset,
    /// DATA line offset
    pub data: Offset,
}

impl Default for LinuxGpioPortConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            prog: defaults::PROG,
            init: defaults::INIT,
            cclk: defaults::CCLK,
            data: defaults::DATA,
        }
    }
}

impl LinuxGpioPortConfig {
    /// Create a configuration for the given device path with the default
    /// PiXi-200 line offsets
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Override the line offsets
    pub fn with_lines(mut self, prog: Offset, init: Offset, cclk: Offset, data: Offset) -> Self {
        self.prog = prog;
        self.init = init;
        self.cclk = cclk;
        self.data = data;
        self
    }
}

/// Linux GPIO configuration port
///
/// Holds one line request covering all four lines; directions are fixed for
/// the lifetime of the port.
pub struct LinuxGpioPort {
    request: Request,
    offsets: [Offset; NUM_LINES],
}

impl LinuxGpioPort {
    /// Open a Linux GPIO configuration port with the given configuration
    pub fn open(config: &LinuxGpioPortConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!("linux_gpio: Opening device {}", config.device);

        let mut offsets = [0u32; NUM_LINES];
        offsets[Line::Prog as usize] = config.prog;
        offsets[Line::Init as usize] = config.init;
        offsets[Line::Cclk as usize] = config.cclk;
        offsets[Line::Data as usize] = config.data;

        // Initial state: PROG=1 (not resetting), CCLK=0, DATA=0, INIT=input
        let mut req_config = Config::default();
        req_config.with_line(config.prog).as_output(Value::Active);
        req_config.with_line(config.cclk).as_output(Value::Inactive);
        req_config.with_line(config.data).as_output(Value::Inactive);
        req_config.with_line(config.init).as_input();

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer("pixiprog")
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)?;

        log::info!(
            "linux_gpio: Opened {} (prog={}, init={}, cclk={}, data={})",
            config.device,
            config.prog,
            config.init,
            config.cclk,
            config.data
        );

        Ok(Self { request, offsets })
    }

    fn set_line(&mut self, line: Line, high: bool) {
        let value = if high { Value::Active } else { Value::Inactive };
        if let Err(e) = self.request.set_value(self.offsets[line as usize], value) {
            log::error!("Failed to set {:?}: {}", line, e);
        }
    }
}

impl ConfigPort for LinuxGpioPort {
    fn set_prog(&mut self, high: bool) {
        self.set_line(Line::Prog, high);
    }

    fn set_cclk(&mut self, high: bool) {
        self.set_line(Line::Cclk, high);
    }

    fn set_data(&mut self, high: bool) {
        self.set_line(Line::Data, high);
    }

    fn read_init(&mut self) -> bool {
        match self.request.value(self.offsets[Line::Init as usize]) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("Failed to read INIT: {}", e);
                false
            }
        }
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

/// Parse port options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `prog=N` - PROG line offset (default 25)
/// - `init=N` - INIT line offset (default 27)
/// - `cclk=N` - CCLK line offset (default 17)
/// - `data=N` - DATA line offset (default 18)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioPortConfig> {
    let mut config = LinuxGpioPortConfig::default();
    let mut gpiochip: Option<u32> = None;

    let parse_offset = |name: &str, value: &str| -> Result<Offset> {
        value.parse().map_err(|_| {
            LinuxGpioError::InvalidParameter(format!("Invalid {} value: {}", name, value))
        })
    };

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("Invalid gpiochip value: {}", value))
                })?);
            }
            "prog" => config.prog = parse_offset("prog", value)?,
            "init" => config.init = parse_offset("init", value)?,
            "cclk" => config.cclk = parse_offset("cclk", value)?,
            "data" => config.data = parse_offset("data", value)?,
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        match gpiochip {
            Some(n) => config.device = format!("/dev/gpiochip{}", n),
            None => return Err(LinuxGpioError::NoDevice),
        }
    } else if gpiochip.is_some() {
        return Err(LinuxGpioError::InvalidParameter(
            "Only one of 'dev' or 'gpiochip' can be specified".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_only_device_given() {
        let config = parse_options(&[("dev", "/dev/gpiochip0")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.prog, defaults::PROG);
        assert_eq!(config.init, defaults::INIT);
        assert_eq!(config.cclk, defaults::CCLK);
        assert_eq!(config.data, defaults::DATA);
    }

    #[test]
    fn gpiochip_number_expands_to_path() {
        let config = parse_options(&[("gpiochip", "4"), ("prog", "5")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip4");
        assert_eq!(config.prog, 5);
    }

    #[test]
    fn device_required() {
        assert!(matches!(
            parse_options(&[("prog", "5")]),
            Err(LinuxGpioError::NoDevice)
        ));
    }

    #[test]
    fn dev_and_gpiochip_conflict() {
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("gpiochip", "1")]),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn bad_offset_rejected() {
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("cclk", "nope")]),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }
}
