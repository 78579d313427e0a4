//! Timer period planning.
//!
//! The sampling timer counts its base clock and interrupts every `reload`
//! ticks. Integer division means the achieved rate is only approximately
//! the requested one at high rates; the host uses
//! [`effective_rate_hz`](TimerPlan::effective_rate_hz) to scale timestamps.

/// Reload value for a sampling timer plus the rates it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerPlan {
    base_clock_hz: u32,
    requested_hz: u32,
    reload: u32,
}

impl TimerPlan {
    /// Plan a timer interrupting at `sample_rate_hz` from a `base_clock_hz`
    /// counter clock. The reload is `base / rate`, never less than one tick.
    pub fn new(base_clock_hz: u32, sample_rate_hz: u32) -> Self {
        let reload = base_clock_hz
            .checked_div(sample_rate_hz)
            .unwrap_or(base_clock_hz)
            .max(1);
        TimerPlan {
            base_clock_hz,
            requested_hz: sample_rate_hz,
            reload,
        }
    }

    /// Counter ticks between interrupts.
    pub fn reload(&self) -> u32 {
        self.reload
    }

    pub fn base_clock_hz(&self) -> u32 {
        self.base_clock_hz
    }

    pub fn requested_hz(&self) -> u32 {
        self.requested_hz
    }

    /// Interrupt rate the timer actually achieves.
    pub fn effective_rate_hz(&self) -> f32 {
        self.base_clock_hz as f32 / self.reload as f32
    }

    /// Deviation of the achieved rate from the requested one, in parts per
    /// million.
    pub fn rate_error_ppm(&self) -> f32 {
        if self.requested_hz == 0 {
            return 0.0;
        }
        let requested = self.requested_hz as f32;
        let error = libm::fabsf(self.effective_rate_hz() - requested) / requested;
        libm::roundf(error * 1_000_000.0)
    }

    /// Interrupts expected over a window of `duration_ms`.
    pub fn interrupts_in(&self, duration_ms: u32) -> u64 {
        let rate = self.effective_rate_hz() as f64;
        libm::floor(rate * duration_ms as f64 / 1000.0) as u64
    }
}
