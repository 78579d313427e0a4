//! # logic-capture
//!
//! A `no_std`, zero-allocation acquisition core for a small 8-channel logic
//! analyzer. A hardware timer samples up to eight input lines; samples are
//! encoded, buffered across the interrupt/main-loop boundary and optionally
//! LZW-compressed before they leave the device over a serial link.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Seams | [`control`] | `SampleTimer`, `ProbePort`, `MillisClock`, `ByteSink` traits |
//! | Buffer | [`queue`] | `SampleQueue` SPSC byte ring with sticky overflow |
//! | Encoding | [`encoder`] | Bit stacking and transition-only records |
//! | Interrupt | [`sampler`] | Timer planning, probe adapters, `PeriodicSampler` |
//! | Output | [`compress`] | `StreamCompressor` LZW coder, `CodePacker` |
//! | Driver | [`session`] | `Session` context object, its `SamplerHandle`/`Drain` halves, `CaptureLink` framing |
//!
//! ## Data flow
//!
//! ```text
//! timer ISR → PeriodicSampler → SampleEncoder → SampleQueue
//!                                                   │ main loop
//!                    serial ← CaptureLink ← [StreamCompressor] ←┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use logic_capture::prelude::*;
//!
//! static QUEUE: SampleQueue = SampleQueue::new();
//!
//! let mut session = Session::new(&QUEUE, timer, || gpiob.idr().read().bits() as u8, millis);
//! session.configure(SamplingConfig {
//!     channel_count: 2,
//!     sample_rate_hz: 100_000,
//!     mode: SamplingMode::TransitionOnly,
//!     ..SamplingConfig::DEFAULT
//! })?;
//!
//! let mut link = CaptureLink::new(|b| uart.write_byte(b));
//! link.begin(&mut session)?;
//! let (mut sampler, mut drain) = session.split();
//!
//! // In the timer ISR, no lock needed:
//! sampler.on_timer_interrupt();
//!
//! // In the main loop:
//! while link.service(&mut drain) != SessionState::Closed {}
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `hal` | yes | [`sampler::ProbePins`] over `embedded-hal` input pins |
//! | `defmt` | no | Logging of session lifecycle, compressor resets, overflow |
//!
//! ## Wire format
//!
//! - **Continuous:** raw samples, or `8 / channel_count` samples packed
//!   low-first per byte when four or fewer channels are active
//! - **Transition-only:** 4-byte records, see [`encoder`]
//! - **Compressed:** `<cmp>`, LZW codes MSB-first, `</cmp>`
//! - **Overflow:** `<err>Overflow</err>` after the session

#![no_std]

#[macro_use]
mod fmt;

pub mod constants;
pub mod error;
pub mod config;
pub mod control;
pub mod queue;
pub mod encoder;
pub mod sampler;
pub mod compress;
pub mod session;

/// The types most applications need.
pub mod prelude {
    pub use crate::config::{SamplingConfig, SamplingMode};
    pub use crate::control::{ByteSink, MillisClock, ProbePort, SampleTimer};
    pub use crate::error::{CaptureError, QueueOverflow};
    pub use crate::queue::SampleQueue;
    pub use crate::sampler::TimerPlan;
    pub use crate::session::{
        CaptureLink, Drain, SamplerHandle, Session, SessionState, SessionStats,
    };
}
