//! In-memory PiXi-200 emulator for testing
//!
//! Provides a fake configuration port and a fake register file so the loader
//! and register commands can be exercised without hardware. The fake port
//! records every line operation and samples DATA on each rising CCLK edge,
//! the same way the FPGA does, so tests can check exactly what would have
//! been shifted into the device.

use pixiprog_core::error::Result;
use pixiprog_core::port::ConfigPort;
use pixiprog_core::transport::{opcodes, regs, RegisterTransport};

use std::collections::HashMap;

/// One recorded configuration-line operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortEvent {
    Prog(bool),
    Cclk(bool),
    Data(bool),
    Delay(u32),
}

/// Fake configuration port
///
/// Line levels start at the idle state (PROG high, CCLK and DATA low). INIT
/// behaviour is controlled by `ready_after`: `None` means INIT never
/// asserts, `Some(n)` means the first `n` polls read low and every poll
/// after that reads high.
pub struct FakePort {
    /// Every line operation, in order
    pub events: Vec<PortEvent>,
    /// DATA level sampled at each rising CCLK edge
    pub sampled: Vec<bool>,
    /// Number of rising CCLK edges seen
    pub clock_pulses: usize,
    /// Number of INIT polls seen
    pub init_polls: usize,
    /// INIT asserts after this many polls (None = never)
    pub ready_after: Option<usize>,
    cclk: bool,
    data: bool,
}

impl FakePort {
    /// A port whose INIT asserts on the first poll
    pub fn new() -> Self {
        Self::ready_after(0)
    }

    /// A port whose INIT reads low for the first `polls` polls
    pub fn ready_after(polls: usize) -> Self {
        Self {
            events: Vec::new(),
            sampled: Vec::new(),
            clock_pulses: 0,
            init_polls: 0,
            ready_after: Some(polls),
            cclk: false,
            data: false,
        }
    }

    /// A port whose INIT never asserts
    pub fn never_ready() -> Self {
        Self {
            ready_after: None,
            ..Self::new()
        }
    }

    /// Reassemble the sampled bit stream into bytes, MSB-first.
    ///
    /// Trailing flush clocks repeat the last DATA level; pass the image
    /// length to cut them off.
    pub fn shifted_bytes(&self, len: usize) -> Vec<u8> {
        self.sampled
            .chunks(8)
            .take(len)
            .map(|bits| bits.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
            .collect()
    }
}

impl Default for FakePort {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for FakePort {
    fn set_prog(&mut self, high: bool) {
        self.events.push(PortEvent::Prog(high));
    }

    fn set_cclk(&mut self, high: bool) {
        self.events.push(PortEvent::Cclk(high));
        if high && !self.cclk {
            // Rising edge: the device samples DATA here.
            self.clock_pulses += 1;
            self.sampled.push(self.data);
        }
        self.cclk = high;
    }

    fn set_data(&mut self, high: bool) {
        self.events.push(PortEvent::Data(high));
        self.data = high;
    }

    fn read_init(&mut self) -> bool {
        self.init_polls += 1;
        self.ready_after.map_or(false, |n| self.init_polls > n)
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(PortEvent::Delay(us));
    }
}

/// Fake register file
///
/// Registers read as whatever was last stored (or zero), and every exchange
/// is logged so tests can assert on access order.
pub struct FakeFpga {
    registers: HashMap<u8, u16>,
    /// Addresses read, in order
    pub reads: Vec<u8>,
    /// Writes performed, in order
    pub writes: Vec<(u8, u16)>,
}

impl FakeFpga {
    pub fn new() -> Self {
        Self {
            registers: HashMap::new(),
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Preload a register value
    pub fn set_register(&mut self, address: u8, value: u16) -> &mut Self {
        self.registers.insert(address, value);
        self
    }

    /// Preload the three version registers (high, middle, low word)
    pub fn with_version(mut self, words: [u16; 3]) -> Self {
        self.set_register(regs::VERSION2, words[0]);
        self.set_register(regs::VERSION1, words[1]);
        self.set_register(regs::VERSION0, words[2]);
        self
    }

    /// Preload the demo status register
    pub fn with_demo_status(mut self, status: u16) -> Self {
        self.set_register(regs::DEMO_STATUS, status);
        self
    }
}

impl Default for FakeFpga {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterTransport for FakeFpga {
    fn transfer(&mut self, address: u8, opcode: u8, data: u16) -> Result<u16> {
        match opcode {
            opcodes::READ => {
                self.reads.push(address);
                let value = self.registers.get(&address).copied().unwrap_or(0);
                log::trace!("fake read 0x{:02x} -> 0x{:04x}", address, value);
                Ok(value)
            }
            _ => {
                self.writes.push((address, data));
                self.registers.insert(address, data);
                Ok(data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixiprog_core::error::Error;
    use pixiprog_core::image::ImageTable;
    use pixiprog_core::loader::{self, LoadProgress, LoaderConfig, NullProgress};

    use std::io::Write;
    use std::path::PathBuf;

    struct CollectingProgress {
        begun: Option<usize>,
        advances: Vec<(u32, usize)>,
        completed: bool,
    }

    impl CollectingProgress {
        fn new() -> Self {
            Self {
                begun: None,
                advances: Vec::new(),
                completed: false,
            }
        }
    }

    impl LoadProgress for CollectingProgress {
        fn begin(&mut self, total_bytes: usize) {
            self.begun = Some(total_bytes);
        }

        fn advance(&mut self, percent: u32, bytes_sent: usize) {
            self.advances.push((percent, bytes_sent));
        }

        fn complete(&mut self) {
            self.completed = true;
        }
    }

    fn write_temp_image(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pixiprog-test-{}-{}", std::process::id(), name));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn clock_count_is_eight_per_byte_plus_flush() {
        let mut port = FakePort::new();
        let image = [0u8; 5];
        loader::transfer(&mut port, &image, &LoaderConfig::default(), &mut NullProgress).unwrap();
        assert_eq!(port.clock_pulses, 8 * image.len() + 8);
    }

    #[test]
    fn bytes_shift_out_msb_first() {
        let mut port = FakePort::new();
        loader::transfer(&mut port, &[0xA5], &LoaderConfig::default(), &mut NullProgress).unwrap();
        assert_eq!(
            &port.sampled[..8],
            &[true, false, true, false, false, true, false, true]
        );
    }

    #[test]
    fn shifted_stream_reassembles_to_image() {
        let mut port = FakePort::new();
        let image = [0x00, 0xFF, 0x5A, 0x01, 0x80];
        loader::transfer(&mut port, &image, &LoaderConfig::default(), &mut NullProgress).unwrap();
        assert_eq!(port.shifted_bytes(image.len()), image);
    }

    #[test]
    fn init_timeout_polls_exactly_the_limit() {
        let mut port = FakePort::never_ready();
        let err = loader::transfer(
            &mut port,
            &[0xAA; 4],
            &LoaderConfig::default(),
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, Error::HardwareNotReady));
        assert_eq!(port.init_polls, 100);
        // No data was clocked out.
        assert_eq!(port.clock_pulses, 0);
    }

    #[test]
    fn missing_image_leaves_lines_untouched() {
        let mut port = FakePort::new();
        let mut fpga = FakeFpga::new();
        let images = ImageTable::single("/nonexistent/pixiprog-test/pixi.bin");
        let err = loader::run(
            &mut port,
            &mut fpga,
            &images,
            &LoaderConfig::default(),
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigurationNotFound));
        assert!(port.events.is_empty());
        assert_eq!(port.init_polls, 0);
    }

    #[test]
    fn hundred_byte_image_reports_ten_deciles() {
        let mut port = FakePort::new();
        let mut progress = CollectingProgress::new();
        let image = [0x3C; 100];
        loader::transfer(&mut port, &image, &LoaderConfig::default(), &mut progress).unwrap();
        assert_eq!(progress.begun, Some(100));
        let percents: Vec<u32> = progress.advances.iter().map(|&(p, _)| p).collect();
        assert_eq!(percents, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn full_load_sequence() {
        let path = write_temp_image("full-load", &[0x12, 0x34, 0x56]);

        let mut port = FakePort::ready_after(2);
        let mut fpga = FakeFpga::new()
            .with_version([0x0100, 0x0002, 0x0003])
            .with_demo_status(0);
        let mut progress = CollectingProgress::new();

        let images = ImageTable::single(&path);
        let version = loader::run(
            &mut port,
            &mut fpga,
            &images,
            &LoaderConfig::default(),
            &mut progress,
        )
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        // 3 data bytes plus the 8 flush clocks.
        assert_eq!(port.clock_pulses, 3 * 8 + 8);
        assert_eq!(port.shifted_bytes(3), vec![0x12, 0x34, 0x56]);

        // Two not-ready polls, then the ready one.
        assert_eq!(port.init_polls, 3);

        // PROG pulsed low once, then released.
        let prog: Vec<_> = port
            .events
            .iter()
            .filter(|e| matches!(e, PortEvent::Prog(_)))
            .collect();
        assert_eq!(prog, vec![&PortEvent::Prog(false), &PortEvent::Prog(true)]);

        // Status read, then exactly the three version registers.
        assert_eq!(
            fpga.reads,
            vec![regs::DEMO_STATUS, regs::VERSION2, regs::VERSION1, regs::VERSION0]
        );

        assert_eq!(version.to_string(), "010000020003");
        assert!(progress.completed);
    }

    #[test]
    fn register_commands_run_against_fake() {
        use pixiprog_core::{lcd, motor};

        let mut fpga = FakeFpga::new();
        motor::drive(&mut fpga, motor::Drive::Forward, 50).unwrap();
        // The front-left channel latches the bank; it must be the final write.
        assert_eq!(fpga.writes.last().unwrap().0, regs::PWM_FL);

        let mut fpga = FakeFpga::new();
        lcd::write_at(&mut fpga, 0, 0, "ok").unwrap();
        assert_eq!(fpga.writes[0], (regs::GPIO3A_MODE, 2));
        assert_eq!(fpga.writes.last().unwrap().0, regs::LCD);
    }

    #[test]
    fn demo_status_steers_selection() {
        let demo1 = write_temp_image("demo1", &[0xAA]);
        let demo2 = write_temp_image("demo2", &[0xBB]);

        let mut port = FakePort::new();
        let mut fpga = FakeFpga::new().with_demo_status(1);
        let images = ImageTable::new(
            "/nonexistent/pixiprog-test/pixi.bin",
            vec![demo1.clone(), demo2.clone()],
        );
        loader::run(
            &mut port,
            &mut fpga,
            &images,
            &LoaderConfig::default(),
            &mut NullProgress,
        )
        .unwrap();
        std::fs::remove_file(&demo1).unwrap();
        std::fs::remove_file(&demo2).unwrap();

        // Status 1 selects demo slot 1, whose content is 0xBB.
        assert_eq!(port.shifted_bytes(1), vec![0xBB]);
    }
}
