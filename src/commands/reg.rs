//! Raw register access commands

use pixiprog_core::transport::RegisterTransport;
use pixiprog_core::Result;

/// Read a register and print its value in hex
pub fn get(transport: &mut dyn RegisterTransport, address: u8) -> Result<()> {
    let value = transport.read_register(address)?;
    println!("{:04x}", value);
    Ok(())
}

/// Write a register
pub fn set(transport: &mut dyn RegisterTransport, address: u8, data: u16) -> Result<()> {
    let echoed = transport.write_register(address, data)?;
    log::debug!("wrote 0x{:04x} to 0x{:02x}, echo 0x{:04x}", data, address, echoed);
    Ok(())
}
