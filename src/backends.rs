//! Backend registration and dispatch
//!
//! Backend strings have the form `name` or `name:key=value,key=value`. The
//! configuration port and register transport are selected independently, so
//! one side can run against the dummy emulator while the other talks to real
//! hardware.

use pixiprog_core::error::{Error, Result};
use pixiprog_core::port::ConfigPort;
use pixiprog_core::transport::RegisterTransport;

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open a configuration port from a backend string
#[allow(unused_variables)]
pub fn open_port(spec: &str) -> Result<Box<dyn ConfigPort>> {
    let (name, options) = parse_backend_string(spec);

    match name {
        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" | "gpiod" => {
            let config = pixiprog_linux_gpio::parse_options(&options)
                .map_err(|e| Error::Port(e.to_string()))?;
            let port = pixiprog_linux_gpio::LinuxGpioPort::open(&config)
                .map_err(|e| Error::Port(e.to_string()))?;
            Ok(Box::new(port))
        }

        #[cfg(feature = "dummy")]
        "dummy" => Ok(Box::new(pixiprog_dummy::FakePort::new())),

        _ => Err(Error::Port(format!("Unknown port backend: {}", name))),
    }
}

/// Open a register transport from a backend string
#[allow(unused_variables)]
pub fn open_transport(spec: &str) -> Result<Box<dyn RegisterTransport>> {
    let (name, options) = parse_backend_string(spec);

    match name {
        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => {
            let config = pixiprog_linux_spi::parse_options(&options)
                .map_err(|e| Error::Transport(e.to_string()))?;
            let spi = pixiprog_linux_spi::LinuxSpi::open(&config)
                .map_err(|e| Error::Transport(e.to_string()))?;
            Ok(Box::new(spi))
        }

        #[cfg(feature = "dummy")]
        "dummy" => Ok(Box::new(pixiprog_dummy::FakeFpga::new())),

        _ => Err(Error::Transport(format!(
            "Unknown transport backend: {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_string_splits_options() {
        let (name, opts) = parse_backend_string("linux_gpio:dev=/dev/gpiochip0,prog=5");
        assert_eq!(name, "linux_gpio");
        assert_eq!(opts, vec![("dev", "/dev/gpiochip0"), ("prog", "5")]);
    }

    #[test]
    fn bare_name_has_no_options() {
        let (name, opts) = parse_backend_string("dummy");
        assert_eq!(name, "dummy");
        assert!(opts.is_empty());
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(open_port("sysfs").is_err());
        assert!(open_transport("i2c").is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn dummy_backends_open() {
        assert!(open_port("dummy").is_ok());
        assert!(open_transport("dummy").is_ok());
    }
}
