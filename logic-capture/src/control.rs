//! Seams to the hardware and transport around the acquisition core.
//!
//! Timer setup, GPIO, the millisecond tick and the serial port all live
//! outside this crate. Board code implements these traits; tests use mocks.

use crate::sampler::TimerPlan;

/// Periodic interrupt source that paces sampling.
pub trait SampleTimer {
    /// Clock feeding the timer's counter, in Hz.
    fn base_clock_hz(&self) -> u32;

    /// Start interrupting at the rate described by `plan`.
    fn arm(&mut self, plan: &TimerPlan);

    /// Stop interrupting. Must be safe to call when already disarmed.
    fn disarm(&mut self);
}

/// Synchronous read of the probed input lines.
///
/// Called once per timer interrupt, so it must not block.
pub trait ProbePort {
    /// Current state of all lines, line *i* in bit *i*.
    fn read_lines(&mut self) -> u8;
}

/// A closure reading the GPIO input data register directly.
impl<F: FnMut() -> u8> ProbePort for F {
    fn read_lines(&mut self) -> u8 {
        self()
    }
}

/// Free-running millisecond counter. Wraps at `u32::MAX`.
pub trait MillisClock {
    fn now_ms(&self) -> u32;
}

impl<F: Fn() -> u32> MillisClock for F {
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Destination for output bytes: compressor output, or the serial link.
pub trait ByteSink {
    fn emit(&mut self, byte: u8);

    fn emit_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.emit(b);
        }
    }
}

impl<F: FnMut(u8)> ByteSink for F {
    fn emit(&mut self, byte: u8) {
        self(byte)
    }
}
