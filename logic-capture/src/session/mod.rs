//! Capture sessions: the context object tying the pipeline together.
//!
//! A [`Session`] holds the committed configuration, the sampler, the
//! compressor and a borrowed [`SampleQueue`]. Its lifecycle is:
//!
//! ```text
//! Idle ──start_session──► Sampling ──poll (window elapsed)──► Draining
//!                                   └─stop_session──────────►    │
//!   ▲                                                            │ queue empty,
//!   └──────────── start_session ◄── Closed ◄─────────────────────┘ compressor flushed
//! ```
//!
//! ## Interrupt and main loop
//!
//! Once a session has started, [`split()`](Session::split) it. The
//! [`SamplerHandle`] goes to the timer interrupt and the [`Drain`] stays in
//! the main loop; neither needs a lock, and a long drain never holds off
//! the interrupt.
//!
//! ```ignore
//! link.begin(&mut session)?;
//! let (sampler, mut drain) = session.split();
//! // Timer ISR:
//! sampler.on_timer_interrupt();
//! // Main loop:
//! while link.service(&mut drain) != SessionState::Closed {}
//! ```
//!
//! The `Session` methods of the same names run both halves in turn, for
//! callers that drive everything from one context.

mod halves;
mod link;


pub use halves::{Drain, SamplerHandle};
pub use link::CaptureLink;

use core::sync::atomic::{AtomicU8, Ordering};

use crate::compress::StreamCompressor;
use crate::config::SamplingConfig;
use crate::constants::{DEFAULT_HASH_SIZE, QSIZE};
use crate::control::{MillisClock, ProbePort, SampleTimer};
use crate::error::{CaptureError, QueueOverflow};
use crate::queue::SampleQueue;
use crate::sampler::{PeriodicSampler, TimerPlan};

use halves::{Output, IDLE, RUNNING};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No session has run yet.
    Idle,
    /// Timer armed, samples flowing into the queue.
    Sampling,
    /// Stop requested, queue still being drained.
    Draining,
    /// All output delivered.
    Closed,
}

impl SessionState {
    /// Sampling or draining: configuration is locked.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Sampling | SessionState::Draining)
    }
}

/// Counters for the current (or last) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionStats {
    /// Timer interrupts taken.
    pub interrupts: u32,
    /// Bytes taken out of the sample queue.
    pub bytes_drained: u32,
    /// Bytes handed out by `pop_output_byte`.
    pub bytes_output: u32,
    /// Wrapping sum of the drained bytes.
    pub input_checksum: u32,
    pub overflowed: bool,
}

/// One capture context. See the [module docs](self).
pub struct Session<'q, T, P, C, const N: usize = QSIZE, const H: usize = DEFAULT_HASH_SIZE> {
    queue: &'q SampleQueue<N>,
    sampler: PeriodicSampler<T, P>,
    /// Shared with the interrupt side while split.
    phase: AtomicU8,
    /// Last committed configuration.
    config: SamplingConfig,
    output: Output<C, H>,
}

impl<'q, T, P, C, const N: usize, const H: usize> Session<'q, T, P, C, N, H>
where
    T: SampleTimer,
    P: ProbePort,
    C: MillisClock,
{
    /// Create an idle session with the power-on configuration.
    pub fn new(queue: &'q SampleQueue<N>, timer: T, port: P, clock: C) -> Self {
        Session {
            queue,
            sampler: PeriodicSampler::new(timer, port),
            phase: AtomicU8::new(IDLE),
            config: SamplingConfig::DEFAULT,
            output: Output {
                clock,
                active: SamplingConfig::DEFAULT,
                compressor: StreamCompressor::new(),
                pending: SampleQueue::new(),
                state: SessionState::Idle,
                started_at_ms: 0,
                stats: SessionStats::default(),
            },
        }
    }

    /// Validate and commit the configuration for the next session.
    ///
    /// Rejected while a session is sampling or draining.
    pub fn configure(&mut self, config: SamplingConfig) -> Result<(), CaptureError> {
        if self.output.state.is_active() {
            return Err(CaptureError::SessionActive);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Start sampling with the committed configuration.
    ///
    /// The compressor is set up first, so a compressor failure leaves the
    /// timer untouched and the session in its previous state.
    pub fn start_session(&mut self) -> Result<TimerPlan, CaptureError> {
        if self.output.state.is_active() {
            return Err(CaptureError::SessionActive);
        }
        let config = self.config;
        config.validate()?;
        if config.compression_enabled {
            self.output.compressor.init(config.code_width)?;
        }

        let out = &mut self.output;
        out.active = config;
        self.queue.clear();
        out.pending.clear();
        out.stats = SessionStats::default();
        out.started_at_ms = out.clock.now_ms();
        let plan = self.sampler.arm(&config);
        self.phase.store(RUNNING, Ordering::Release);
        out.state = SessionState::Sampling;
        info!(
            "session: start, {=u8} ch, {=u32} Hz, {=u32} ms, compression {=bool}",
            config.channel_count,
            config.sample_rate_hz,
            config.session_duration_ms,
            config.compression_enabled
        );
        Ok(plan)
    }

    /// Hand out the interrupt half and the main-loop half.
    ///
    /// The two share only the sample queue and an atomic phase word.
    pub fn split(&mut self) -> (SamplerHandle<'_, T, P, N>, Drain<'_, C, N, H>) {
        let queue = self.queue;
        (
            SamplerHandle {
                sampler: &mut self.sampler,
                queue,
                phase: &self.phase,
            },
            Drain {
                output: &mut self.output,
                queue,
                phase: &self.phase,
            },
        )
    }

    /// Timer interrupt entry point: sample the probe lines.
    #[inline]
    pub fn on_timer_interrupt(&mut self) {
        self.split().0.on_timer_interrupt();
    }

    /// Feed a sample read elsewhere. Ignored unless sampling.
    #[inline]
    pub fn push_sample(&mut self, raw: u8) -> Result<(), QueueOverflow> {
        self.split().0.push_sample(raw)
    }

    /// End the window once its duration has elapsed. Returns the state
    /// after the check.
    pub fn poll(&mut self) -> SessionState {
        let (mut sampler, mut drain) = self.split();
        let state = drain.poll();
        sampler.acknowledge_stop();
        state
    }

    /// Stop sampling now. Queued data is kept and drained normally.
    ///
    /// In transition-only mode the closing sample is queued here.
    pub fn stop_session(&mut self) {
        let (mut sampler, mut drain) = self.split();
        drain.stop_session();
        sampler.acknowledge_stop();
    }

    /// Next byte for the transport, compressed when enabled.
    ///
    /// See [`Drain::pop_output_byte`].
    pub fn pop_output_byte(&mut self) -> Option<u8> {
        self.split().1.pop_output_byte()
    }

    /// Sticky overflow flag of the current session.
    pub fn is_overflowed(&self) -> bool {
        self.queue.is_overflowed()
    }

    pub fn state(&self) -> SessionState {
        self.output.state
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            interrupts: self.sampler.encoder().interrupt_count(),
            overflowed: self.queue.is_overflowed(),
            ..self.output.stats
        }
    }

    /// Committed configuration for the next session.
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Configuration of the running or last session.
    pub fn active_config(&self) -> &SamplingConfig {
        &self.output.active
    }

    pub fn sampler(&self) -> &PeriodicSampler<T, P> {
        &self.sampler
    }

    pub fn compressor(&self) -> &StreamCompressor<H> {
        &self.output.compressor
    }

    /// Give the hardware back. Stops the timer first if still armed.
    pub fn release(mut self) -> (T, P, C) {
        if self.sampler.is_armed() {
            self.sampler.disarm();
        }
        let (timer, port) = self.sampler.release();
        (timer, port, self.output.clock)
    }
}
