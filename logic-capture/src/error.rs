//! Error types for the acquisition core.
//!
//! Nothing here unwinds: the producer path runs in interrupt context, so every
//! failure is reported as a value.

use core::fmt;

/// An enqueue was attempted while the sample queue was full.
///
/// The byte is dropped and the queue's sticky overflow flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueOverflow;

/// A configuration value is outside its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel count must be 1–8.
    ChannelCount(u8),
    /// Sample rate must be 10 Hz – 10 MHz.
    SampleRate(u32),
    /// Session duration must be 10 ms – 100 s.
    Duration(u32),
    /// Compressor code width must be 9–15 bits.
    CodeWidth(u8),
}

/// The stream compressor could not be set up for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompressorInitError {
    /// Code width outside 9–15 bits.
    UnsupportedCodeWidth(u8),
    /// The statically sized hash table cannot hold the code space.
    TableTooSmall { required: usize, available: usize },
}

/// Errors surfaced by a capture [`Session`](crate::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Rejected configuration value.
    InvalidConfiguration(ConfigError),
    /// Compression was requested but the compressor failed to initialize.
    /// The session did not start.
    CompressorInit(CompressorInitError),
    /// Configuration or start was requested while a session is running or
    /// still draining.
    SessionActive,
    /// The sample queue saturated and dropped data.
    QueueOverflow,
}

impl fmt::Display for QueueOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sample queue overflow")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelCount(n) => write!(f, "invalid channel count: {n} (must be 1-8)"),
            Self::SampleRate(hz) => {
                write!(f, "invalid sample rate: {hz} Hz (must be 10-10000000)")
            }
            Self::Duration(ms) => {
                write!(f, "invalid session duration: {ms} ms (must be 10-100000)")
            }
            Self::CodeWidth(bits) => write!(f, "invalid code width: {bits} (must be 9-15)"),
        }
    }
}

impl fmt::Display for CompressorInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCodeWidth(bits) => {
                write!(f, "unsupported code width: {bits} bits")
            }
            Self::TableTooSmall {
                required,
                available,
            } => write!(
                f,
                "hash table too small: need {required} slots, have {available}"
            ),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(e) => write!(f, "invalid configuration: {e}"),
            Self::CompressorInit(e) => write!(f, "compressor init failed: {e}"),
            Self::SessionActive => f.write_str("a session is already active"),
            Self::QueueOverflow => f.write_str("sample queue overflow"),
        }
    }
}

impl From<ConfigError> for CaptureError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfiguration(e)
    }
}

impl From<CompressorInitError> for CaptureError {
    fn from(e: CompressorInitError) -> Self {
        Self::CompressorInit(e)
    }
}

impl From<QueueOverflow> for CaptureError {
    fn from(_: QueueOverflow) -> Self {
        Self::QueueOverflow
    }
}
