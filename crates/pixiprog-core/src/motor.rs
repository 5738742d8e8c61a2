//! Motor PWM control
//!
//! Four PWM channels drive the demo rover's wheel motors (front/rear,
//! left/right). Each channel command word is a 10-bit duty cycle with bit 15
//! selecting reverse rotation. The hardware latches all four channels when
//! the front-left register is written, so that write always goes last.

use crate::error::Result;
use crate::transport::{regs, RegisterTransport};

/// Reverse-rotation flag in a channel command word
const REVERSE: u16 = 0x8000;

/// Drive command for the four-wheel platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

/// Map a 0-100 speed percentage onto the 10-bit duty cycle
pub fn duty_from_percent(speed: u8) -> u16 {
    let speed = u32::from(speed.min(100));
    (speed * 1023 / 100) as u16 & 0x03FF
}

/// Per-channel command words, in hardware write order (FL latched last)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWords {
    pub fl: u16,
    pub fr: u16,
    pub rl: u16,
    pub rr: u16,
}

/// Compute the four channel words for a drive command.
///
/// The left and right motor pairs are mounted mirrored, so "forward" is
/// normal rotation on one side and reversed on the other.
pub fn channel_words(drive: Drive, speed: u8) -> ChannelWords {
    let pwm = duty_from_percent(speed);
    match drive {
        Drive::Forward => ChannelWords {
            fl: pwm,
            fr: pwm,
            rl: REVERSE | pwm,
            rr: REVERSE | pwm,
        },
        Drive::Backward => ChannelWords {
            fl: REVERSE | pwm,
            fr: REVERSE | pwm,
            rl: pwm,
            rr: pwm,
        },
        Drive::Left => ChannelWords {
            fl: REVERSE | pwm,
            fr: pwm,
            rl: pwm,
            rr: REVERSE | pwm,
        },
        Drive::Right => ChannelWords {
            fl: pwm,
            fr: REVERSE | pwm,
            rl: REVERSE | pwm,
            rr: pwm,
        },
        Drive::Stop => ChannelWords {
            fl: 0,
            fr: 0,
            rl: REVERSE,
            rr: REVERSE,
        },
    }
}

/// Apply a drive command to the hardware
pub fn drive<T: RegisterTransport + ?Sized>(
    transport: &mut T,
    command: Drive,
    speed: u8,
) -> Result<()> {
    let words = channel_words(command, speed);
    log::debug!("motor {:?} at {}%: {:04x?}", command, speed, words);

    transport.write_register(regs::PWM_FR, words.fr)?;
    transport.write_register(regs::PWM_RL, words.rl)?;
    transport.write_register(regs::PWM_RR, words.rr)?;
    // FL latches all four channels; must be last.
    transport.write_register(regs::PWM_FL, words.fl)?;
    Ok(())
}

/// Built-in demo sequence: 16 steps of (FL, FR, RL, RR) command words
pub const DEMO_SEQUENCE: [[u16; 4]; 16] = [
    [0x0066, 0x0066, 0x0066, 0x0066], // forward, 10%
    [0x0132, 0x0132, 0x0132, 0x0132], // forward, 30%
    [0x01FE, 0x01FE, 0x01FE, 0x01FE], // forward, 50%
    [0x0132, 0x0132, 0x0132, 0x0132], // forward, 30%
    [0x0066, 0x0066, 0x0066, 0x0066], // forward, 10%
    [0x8066, 0x0066, 0x8066, 0x0066], // left turn, 10%
    [0x8066, 0x8066, 0x8066, 0x8066], // reverse, 10%
    [0x8066, 0x0066, 0x8066, 0x0066], // left turn, 10%
    [0x0066, 0x0066, 0x0066, 0x0066], // forward, 10%
    [0x0066, 0x0066, 0x0066, 0x0066], // forward, 10%
    [0x8066, 0x0066, 0x0066, 0x0066], // left turn, 10%
    [0x0066, 0x0066, 0x0066, 0x0066], // forward, 10%
    [0x0066, 0x8066, 0x0066, 0x8066], // right turn, 10%
    [0x0066, 0x8066, 0x0066, 0x8066], // right turn, 10%
    [0x0066, 0x8066, 0x0066, 0x8066], // right turn, 10%
    [0x8066, 0x8066, 0x8066, 0x8066], // reverse, 10%
];

/// Load the demo sequence into the PWM sequencer and start it.
///
/// With `load` false the sequencer is restarted with whatever program it
/// already holds.
pub fn run_demo<T: RegisterTransport + ?Sized>(transport: &mut T, load: bool) -> Result<()> {
    transport.write_register(regs::PWM_SEQ_CTRL, 0)?;

    if load {
        for step in &DEMO_SEQUENCE {
            for (channel, &word) in regs::PWM_SEQ.iter().zip(step.iter()) {
                transport.write_register(*channel, word)?;
            }
        }
    }

    transport.write_register(regs::PWM_SEQ_CTRL, 1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::opcodes;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, u16)>,
    }

    impl RegisterTransport for Recorder {
        fn transfer(&mut self, address: u8, opcode: u8, data: u16) -> Result<u16> {
            assert_eq!(opcode, opcodes::WRITE);
            self.writes.push((address, data));
            Ok(data)
        }
    }

    #[test]
    fn duty_scaling() {
        assert_eq!(duty_from_percent(0), 0);
        assert_eq!(duty_from_percent(50), 511);
        assert_eq!(duty_from_percent(100), 1023);
        // Out of range clamps rather than wrapping.
        assert_eq!(duty_from_percent(200), 1023);
    }

    #[test]
    fn forward_reverses_rear_pair() {
        let w = channel_words(Drive::Forward, 10);
        let pwm = duty_from_percent(10);
        assert_eq!(w.fl, pwm);
        assert_eq!(w.fr, pwm);
        assert_eq!(w.rl, 0x8000 | pwm);
        assert_eq!(w.rr, 0x8000 | pwm);
    }

    #[test]
    fn latch_register_written_last() {
        let mut rec = Recorder::default();
        drive(&mut rec, Drive::Left, 30).unwrap();
        assert_eq!(rec.writes.len(), 4);
        assert_eq!(rec.writes.last().unwrap().0, regs::PWM_FL);
    }

    #[test]
    fn demo_brackets_steps_with_sequencer_toggle() {
        let mut rec = Recorder::default();
        run_demo(&mut rec, true).unwrap();
        assert_eq!(rec.writes.first().unwrap(), &(regs::PWM_SEQ_CTRL, 0));
        assert_eq!(rec.writes.last().unwrap(), &(regs::PWM_SEQ_CTRL, 1));
        // 16 steps x 4 channels between the two control writes
        assert_eq!(rec.writes.len(), 2 + 16 * 4);
    }

    #[test]
    fn demo_restart_without_reload() {
        let mut rec = Recorder::default();
        run_demo(&mut rec, false).unwrap();
        assert_eq!(
            rec.writes,
            vec![(regs::PWM_SEQ_CTRL, 0), (regs::PWM_SEQ_CTRL, 1)]
        );
    }
}
