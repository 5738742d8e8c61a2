//! Display command implementations

use crate::cli::LcdCommands;
use pixiprog_core::lcd;
use pixiprog_core::transport::RegisterTransport;
use pixiprog_core::Result;

pub fn run(transport: &mut dyn RegisterTransport, command: LcdCommands) -> Result<()> {
    match command {
        LcdCommands::Init { cursor } => lcd::init(transport, cursor),
        LcdCommands::Brightness { level } => lcd::brightness(transport, level),
        LcdCommands::Write { x, y, text } => lcd::write_at(transport, x, y, &text),
    }
}
