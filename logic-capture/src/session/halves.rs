//! Interrupt and main-loop halves of a running session.
//!
//! [`Session::split`](super::Session::split) hands out a [`SamplerHandle`]
//! for the timer interrupt and a [`Drain`] for the main loop. They share the
//! sample queue and one atomic phase word, nothing else:
//!
//! ```text
//!            main loop                         timer interrupt
//!  RUNNING ──Drain::stop_session──► STOP_REQUESTED ──SamplerHandle──► STOPPED
//!                                                  (disarm, final sample)
//! ```
//!
//! The drain flushes the compressor only after it has seen `STOPPED`, so the
//! closing sample is always inside the stream.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::compress::StreamCompressor;
use crate::config::SamplingConfig;
use crate::control::{ByteSink, MillisClock, ProbePort, SampleTimer};
use crate::error::QueueOverflow;
use crate::queue::SampleQueue;
use crate::sampler::PeriodicSampler;

use super::{SessionState, SessionStats};

pub(super) const IDLE: u8 = 0;
pub(super) const RUNNING: u8 = 1;
pub(super) const STOP_REQUESTED: u8 = 2;
pub(super) const STOPPED: u8 = 3;

/// Staging ring for compressor output. One input byte or a flush yields
/// at most five bytes.
pub(super) const PENDING: usize = 8;

/// Main-loop state of a session.
pub(super) struct Output<C, const H: usize> {
    pub(super) clock: C,
    /// Snapshot used by the running session.
    pub(super) active: SamplingConfig,
    pub(super) compressor: StreamCompressor<H>,
    pub(super) pending: SampleQueue<PENDING>,
    pub(super) state: SessionState,
    pub(super) started_at_ms: u32,
    pub(super) stats: SessionStats,
}

/// Interrupt-side half: owns the timer, the probe lines and the encoder.
pub struct SamplerHandle<'s, T, P, const N: usize> {
    pub(super) sampler: &'s mut PeriodicSampler<T, P>,
    pub(super) queue: &'s SampleQueue<N>,
    pub(super) phase: &'s AtomicU8,
}

impl<T, P, const N: usize> SamplerHandle<'_, T, P, N>
where
    T: SampleTimer,
    P: ProbePort,
{
    /// Timer interrupt entry point.
    ///
    /// Samples while the session runs. The first interrupt after the main
    /// loop asked to stop disarms the timer and queues the closing sample
    /// instead of sampling.
    #[inline]
    pub fn on_timer_interrupt(&mut self) {
        match self.phase.load(Ordering::Acquire) {
            RUNNING => self.sampler.on_interrupt(self.queue),
            STOP_REQUESTED => self.complete_stop(),
            _ => {}
        }
    }

    /// Feed a sample read elsewhere. Ignored unless sampling.
    #[inline]
    pub fn push_sample(&mut self, raw: u8) -> Result<(), QueueOverflow> {
        if self.phase.load(Ordering::Acquire) != RUNNING {
            return Ok(());
        }
        self.sampler.push_sample(raw, self.queue)
    }

    /// Finish a pending stop without waiting for the next interrupt.
    ///
    /// Returns whether a stop was pending.
    pub fn acknowledge_stop(&mut self) -> bool {
        if self.phase.load(Ordering::Acquire) != STOP_REQUESTED {
            return false;
        }
        self.complete_stop();
        true
    }

    fn complete_stop(&mut self) {
        self.sampler.disarm();
        // Overflow is recorded by the queue's sticky flag.
        let _ = self.sampler.finish(self.queue);
        self.phase.store(STOPPED, Ordering::Release);
        info!(
            "session: stop after {=u32} interrupts",
            self.sampler.encoder().interrupt_count()
        );
    }

    /// Still taking samples.
    pub fn is_sampling(&self) -> bool {
        self.phase.load(Ordering::Acquire) == RUNNING
    }

    pub fn interrupt_count(&self) -> u32 {
        self.sampler.encoder().interrupt_count()
    }
}

/// Main-loop half: owns the clock, the compressor and the session state.
pub struct Drain<'s, C, const N: usize, const H: usize> {
    pub(super) output: &'s mut Output<C, H>,
    pub(super) queue: &'s SampleQueue<N>,
    pub(super) phase: &'s AtomicU8,
}

impl<C, const N: usize, const H: usize> Drain<'_, C, N, H>
where
    C: MillisClock,
{
    /// End the window once its duration has elapsed. Returns the state
    /// after the check.
    pub fn poll(&mut self) -> SessionState {
        if self.output.state == SessionState::Sampling {
            let elapsed = self
                .output
                .clock
                .now_ms()
                .wrapping_sub(self.output.started_at_ms);
            if elapsed > self.output.active.session_duration_ms {
                self.stop_session();
            }
        }
        self.output.state
    }

    /// Ask the interrupt side to stop. Queued data is kept and drained.
    ///
    /// The timer is disarmed, and in transition-only mode the closing
    /// sample queued, by the next [`SamplerHandle::on_timer_interrupt`] or
    /// [`SamplerHandle::acknowledge_stop`].
    pub fn stop_session(&mut self) {
        if self.output.state != SessionState::Sampling {
            return;
        }
        let _ = self.phase.compare_exchange(
            RUNNING,
            STOP_REQUESTED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.output.state = SessionState::Draining;
    }

    /// Next byte for the transport, compressed when enabled.
    ///
    /// Returns `None` when nothing is ready. Once the interrupt side has
    /// stopped and the queue is empty the compressor is flushed, and the
    /// call after the last flushed byte closes the session.
    pub fn pop_output_byte(&mut self) -> Option<u8> {
        let mut unbounded = u32::MAX;
        self.next_output(&mut unbounded)
    }

    /// Forward ready bytes to `sink`, taking at most `max_bytes` from the
    /// sample queue. Returns the number taken.
    pub fn drain_into<S: ByteSink>(&mut self, sink: &mut S, max_bytes: u32) -> u32 {
        let mut budget = max_bytes;
        while let Some(byte) = self.next_output(&mut budget) {
            sink.emit(byte);
        }
        max_bytes - budget
    }

    fn next_output(&mut self, budget: &mut u32) -> Option<u8> {
        let out = &mut *self.output;
        loop {
            if let Some(byte) = out.pending.dequeue() {
                out.stats.bytes_output = out.stats.bytes_output.wrapping_add(1);
                return Some(byte);
            }
            if !out.state.is_active() || *budget == 0 {
                return None;
            }

            // Read before the queue: once STOPPED is seen, every byte the
            // interrupt side will ever queue is already visible.
            let producer_done = self.phase.load(Ordering::Acquire) == STOPPED;
            match self.queue.dequeue() {
                Some(byte) => {
                    *budget -= 1;
                    out.stats.bytes_drained = out.stats.bytes_drained.wrapping_add(1);
                    out.stats.input_checksum =
                        out.stats.input_checksum.wrapping_add(u32::from(byte));
                    if !out.active.compression_enabled {
                        out.stats.bytes_output = out.stats.bytes_output.wrapping_add(1);
                        return Some(byte);
                    }
                    out.compressor.compress_byte(byte, &mut out.pending);
                }
                None if !producer_done => return None,
                None if out.compressor.is_active() => {
                    out.compressor.flush(&mut out.pending);
                }
                None => {
                    self.close();
                    return None;
                }
            }
        }
    }

    fn close(&mut self) {
        self.output.state = SessionState::Closed;
        self.phase.store(IDLE, Ordering::Release);
        if self.queue.is_overflowed() {
            warn!("session: closed with sample queue overflow");
        } else {
            debug!(
                "session: closed, {=u32} bytes out",
                self.output.stats.bytes_output
            );
        }
    }

    pub fn state(&self) -> SessionState {
        self.output.state
    }

    /// Sticky overflow flag of the current session.
    pub fn is_overflowed(&self) -> bool {
        self.queue.is_overflowed()
    }

    /// Bytes taken out of the sample queue so far.
    pub fn bytes_drained(&self) -> u32 {
        self.output.stats.bytes_drained
    }

    pub fn active_config(&self) -> &SamplingConfig {
        &self.output.active
    }
}
