//! Timer-driven sampling of the probed input lines.
//!
//! [`PeriodicSampler`] owns the sampling timer, the probe port and the
//! [`SampleEncoder`]. It is the only producer into the [`SampleQueue`].
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! static QUEUE: SampleQueue = SampleQueue::new();
//!
//! // Main loop, at session start:
//! let plan = sampler.arm(&config);
//!
//! // Timer ISR:
//! sampler.on_interrupt(&QUEUE);
//!
//! // Main loop, when the window has elapsed:
//! sampler.disarm();
//! sampler.finish(&QUEUE);
//! ```
//!
//! The interrupt path reads the port once, updates the encoder and enqueues
//! at most eight bytes. It never waits: a full queue drops bytes and raises
//! the queue's overflow flag.

mod pins;
mod timer;

#[cfg(feature = "hal")]
pub use pins::ProbePins;
pub use pins::UpperByte;
pub use timer::TimerPlan;

use crate::config::SamplingConfig;
use crate::control::{ProbePort, SampleTimer};
use crate::encoder::SampleEncoder;
use crate::error::QueueOverflow;
use crate::queue::SampleQueue;

/// Interrupt-side half of a capture: timer, input lines and encoder.
pub struct PeriodicSampler<T, P> {
    timer: T,
    port: P,
    encoder: SampleEncoder,
    armed: bool,
}

impl<T, P> PeriodicSampler<T, P>
where
    T: SampleTimer,
    P: ProbePort,
{
    pub fn new(timer: T, port: P) -> Self {
        PeriodicSampler {
            timer,
            port,
            encoder: SampleEncoder::new(),
            armed: false,
        }
    }

    /// Reset the encoder for `config` and start the timer at its rate.
    ///
    /// The queue must be cleared by the caller before arming.
    pub fn arm(&mut self, config: &SamplingConfig) -> TimerPlan {
        self.encoder.reset(config);
        let plan = TimerPlan::new(self.timer.base_clock_hz(), config.sample_rate_hz);
        debug!(
            "sampler: arming at {=u32} Hz, reload {=u32}, {=u8} samples/byte, ~{=u64} interrupts",
            config.sample_rate_hz,
            plan.reload(),
            config.samples_per_byte(),
            plan.interrupts_in(config.session_duration_ms)
        );
        self.timer.arm(&plan);
        self.armed = true;
        plan
    }

    /// Stop the timer. Already queued data is left alone.
    pub fn disarm(&mut self) {
        self.timer.disarm();
        self.armed = false;
    }

    /// Timer interrupt handler: count, read the lines, encode.
    ///
    /// Interrupts arriving after [`disarm()`](Self::disarm) are ignored.
    #[inline]
    pub fn on_interrupt<const N: usize>(&mut self, queue: &SampleQueue<N>) {
        if !self.armed {
            return;
        }
        let raw = self.port.read_lines();
        // A dropped byte is recorded by the queue's sticky flag.
        let _ = self.encoder.push_sample(raw, queue);
    }

    /// Encode a sample obtained elsewhere, counting it as one interrupt.
    #[inline]
    pub fn push_sample<const N: usize>(
        &mut self,
        raw: u8,
        queue: &SampleQueue<N>,
    ) -> Result<(), QueueOverflow> {
        self.encoder.push_sample(raw, queue)
    }

    /// Close the encoded stream after the timer has been disarmed.
    ///
    /// In transition-only mode this queues the synthetic final sample.
    pub fn finish<const N: usize>(&mut self, queue: &SampleQueue<N>) -> Result<(), QueueOverflow> {
        self.encoder.push_final_sample(queue)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn encoder(&self) -> &SampleEncoder {
        &self.encoder
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Give the timer and port back to the board code.
    pub fn release(self) -> (T, P) {
        (self.timer, self.port)
    }
}
