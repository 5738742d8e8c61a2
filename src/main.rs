//! pixiprog - PiXi-200 FPGA configuration loader
//!
//! Loads a bitstream into the PiXi-200's Spartan FPGA over its bit-serial
//! configuration interface and talks to the configured device's register
//! file over SPI. The two hardware seams are independent trait objects:
//!
//! - **ConfigPort** - the four configuration lines (PROG, INIT, CCLK, DATA),
//!   normally driven through the Linux GPIO character device
//! - **RegisterTransport** - the 4-byte register frame, normally carried
//!   over /dev/spidev
//!
//! Both can be pointed at the in-memory dummy backend for bench-less runs.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use pixiprog_core::Result;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Prog { file } => {
            let mut port = backends::open_port(&cli.gpio)?;
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::prog::run(port.as_mut(), transport.as_mut(), file.as_deref())
        }
        Commands::Get { address } => {
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::reg::get(transport.as_mut(), address)
        }
        Commands::Set { address, data } => {
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::reg::set(transport.as_mut(), address, data)
        }
        Commands::Lcd(subcmd) => {
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::lcd::run(transport.as_mut(), subcmd)
        }
        Commands::Motor { direction, speed } => {
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::motor::run(transport.as_mut(), direction.into(), speed)
        }
        Commands::MotorDemo { no_load } => {
            let mut transport = backends::open_transport(&cli.spi)?;
            commands::motor::demo(transport.as_mut(), !no_load)
        }
    }
}
