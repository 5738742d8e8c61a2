//! Motor command implementations

use pixiprog_core::motor::{self, Drive};
use pixiprog_core::transport::RegisterTransport;
use pixiprog_core::Result;

pub fn run(transport: &mut dyn RegisterTransport, drive: Drive, speed: u8) -> Result<()> {
    motor::drive(transport, drive, speed)
}

pub fn demo(transport: &mut dyn RegisterTransport, load: bool) -> Result<()> {
    motor::run_demo(transport, load)
}
