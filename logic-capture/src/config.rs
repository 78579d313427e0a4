//! Sampling configuration.
//!
//! The command layer owns a [`SamplingConfig`] and commits it through
//! [`Session::configure`](crate::session::Session::configure). Each session
//! works from the snapshot taken at its start.

use crate::constants::{
    DEFAULT_CODE_WIDTH, MAX_CHANNELS, MAX_CODE_WIDTH, MAX_SAMPLE_RATE_HZ, MAX_SESSION_MS,
    MIN_CHANNELS, MIN_CODE_WIDTH, MIN_SAMPLE_RATE_HZ, MIN_SESSION_MS,
};
use crate::error::ConfigError;

/// How raw samples are encoded into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingMode {
    /// Every sample is kept. Narrow captures pack several samples per byte.
    #[default]
    Continuous,
    /// Only changes are kept, as timestamped records.
    TransitionOnly,
}

/// Parameters for one sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingConfig {
    /// Number of active input lines (1–8).
    pub channel_count: u8,
    /// Timer interrupt frequency in Hz.
    pub sample_rate_hz: u32,
    /// Length of the sampling window in milliseconds.
    pub session_duration_ms: u32,
    pub mode: SamplingMode,
    pub compression_enabled: bool,
    /// Compressor code width in bits (9–15).
    pub code_width: u8,
}

impl SamplingConfig {
    /// Power-on defaults: 4 channels at 1 kHz for 1 s, continuous, uncompressed.
    pub const DEFAULT: Self = Self {
        channel_count: 4,
        sample_rate_hz: 1000,
        session_duration_ms: 1000,
        mode: SamplingMode::Continuous,
        compression_enabled: false,
        code_width: DEFAULT_CODE_WIDTH,
    };

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&self.channel_count) {
            return Err(ConfigError::ChannelCount(self.channel_count));
        }
        if !(MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&self.sample_rate_hz) {
            return Err(ConfigError::SampleRate(self.sample_rate_hz));
        }
        if !(MIN_SESSION_MS..=MAX_SESSION_MS).contains(&self.session_duration_ms) {
            return Err(ConfigError::Duration(self.session_duration_ms));
        }
        if !(MIN_CODE_WIDTH..=MAX_CODE_WIDTH).contains(&self.code_width) {
            return Err(ConfigError::CodeWidth(self.code_width));
        }
        Ok(())
    }

    /// Mask applied to each raw sample before it is stacked.
    ///
    /// Only the low `channel_count` bits survive when four or fewer channels
    /// are active; otherwise the whole byte is kept.
    pub fn stack_mask(&self) -> u8 {
        if self.channel_count <= 4 {
            ((1u16 << self.channel_count) - 1) as u8
        } else {
            0xFF
        }
    }

    /// Whether continuous mode packs more than one sample per byte.
    pub fn stacks_samples(&self) -> bool {
        self.mode == SamplingMode::Continuous && self.channel_count <= 4
    }

    /// Samples carried by one queued byte in continuous mode.
    pub fn samples_per_byte(&self) -> u8 {
        if self.stacks_samples() {
            8u8.div_ceil(self.channel_count.max(1))
        } else {
            1
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
