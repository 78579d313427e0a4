//! Serial framing around a session's output.

use crate::constants::{COMPRESSED_CLOSE, COMPRESSED_OPEN, LINK_BURST, OVERFLOW_REPORT};
use crate::control::{ByteSink, MillisClock, ProbePort, SampleTimer};
use crate::error::CaptureError;
use crate::sampler::TimerPlan;

use super::{Drain, Session, SessionState};

/// Main-loop driver writing a session's bytes to the serial link.
///
/// A compressed session is wrapped in `<cmp>` … `</cmp>`. A session that
/// overflowed is followed by `<err>Overflow</err>`.
///
/// ```ignore
/// let mut link = CaptureLink::new(uart);
/// link.begin(&mut session)?;
/// let (sampler, mut drain) = session.split();
/// while link.service(&mut drain) != SessionState::Closed {}
/// ```
pub struct CaptureLink<S> {
    sink: S,
    /// Most queue bytes taken per `service` call.
    burst: u32,
    compressed: bool,
    trailer_sent: bool,
}

impl<S: ByteSink> CaptureLink<S> {
    pub fn new(sink: S) -> Self {
        Self::with_burst(sink, LINK_BURST)
    }

    /// A link draining at most `burst` queue bytes per service pass.
    pub fn with_burst(sink: S, burst: u32) -> Self {
        CaptureLink {
            sink,
            burst: burst.max(1),
            compressed: false,
            trailer_sent: true,
        }
    }

    /// Start `session` and write the opening marker if it compresses.
    ///
    /// Nothing is written if the session fails to start.
    pub fn begin<T, P, C, const N: usize, const H: usize>(
        &mut self,
        session: &mut Session<'_, T, P, C, N, H>,
    ) -> Result<TimerPlan, CaptureError>
    where
        T: SampleTimer,
        P: ProbePort,
        C: MillisClock,
    {
        let plan = session.start_session()?;
        self.compressed = session.active_config().compression_enabled;
        self.trailer_sent = false;
        if self.compressed {
            self.sink.emit_all(COMPRESSED_OPEN);
        }
        Ok(plan)
    }

    /// One main-loop pass: check the window, forward ready bytes and, once
    /// the session has closed, write the trailer.
    ///
    /// At most `burst` bytes are taken from the sample queue per pass. Bytes
    /// the compressor already produced do not count against it.
    pub fn service<C, const N: usize, const H: usize>(
        &mut self,
        drain: &mut Drain<'_, C, N, H>,
    ) -> SessionState
    where
        C: MillisClock,
    {
        drain.poll();
        drain.drain_into(&mut self.sink, self.burst);

        let state = drain.state();
        if state == SessionState::Closed && !self.trailer_sent {
            if self.compressed {
                self.sink.emit_all(COMPRESSED_CLOSE);
            }
            if drain.is_overflowed() {
                warn!("link: reporting overflow to host");
                self.sink.emit_all(OVERFLOW_REPORT);
            }
            self.trailer_sent = true;
        }
        state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}
