/// Capacity of the sample queue in bytes.
pub const QSIZE: usize = 4096;

// ── Transition-only wire format ────────────────────────────────────────────

/// Leads a 4-byte sample record: marker, timestamp (lo, hi), sample.
pub const SAMPLE_MARKER: u8 = 0xBF;

/// Leads a 4-byte rollover record: marker, rollover count (lo, hi), pad.
pub const ROLLOVER_MARKER: u8 = 0xBE;

/// Reserved for period records. Never emitted by the encoder.
pub const PERIOD_MARKER: u8 = 0xBD;

// ── Stream compressor ──────────────────────────────────────────────────────

/// Narrowest supported code width in bits.
pub const MIN_CODE_WIDTH: u8 = 9;

/// Widest supported code width in bits.
pub const MAX_CODE_WIDTH: u8 = 15;

/// Code width of the reference configuration.
pub const DEFAULT_CODE_WIDTH: u8 = 13;

/// Reserved code telling the decoder to discard its dictionary.
pub const CLEAR_CODE: u16 = 256;

/// First code assigned to a learned phrase.
pub const FIRST_CODE: u16 = 257;

/// Hash table sizes, indexed by `code_width - MIN_CODE_WIDTH`.
pub const HASH_PRIMES: [u16; 7] = [601, 1501, 2801, 5003, 9001, 18013, 35023];

/// Hash table capacity sized for [`DEFAULT_CODE_WIDTH`].
pub const DEFAULT_HASH_SIZE: usize = 9001;

// ── Configuration ranges (inclusive) ───────────────────────────────────────

pub const MIN_CHANNELS: u8 = 1;
pub const MAX_CHANNELS: u8 = 8;
pub const MIN_SAMPLE_RATE_HZ: u32 = 10;
pub const MAX_SAMPLE_RATE_HZ: u32 = 10_000_000;
pub const MIN_SESSION_MS: u32 = 10;
pub const MAX_SESSION_MS: u32 = 100_000;

// ── Link framing ───────────────────────────────────────────────────────────

/// Sent before the first byte of a compressed session.
pub const COMPRESSED_OPEN: &[u8] = b"<cmp>";

/// Sent after the last byte of a compressed session.
pub const COMPRESSED_CLOSE: &[u8] = b"</cmp>";

/// Sent after any session that dropped samples.
pub const OVERFLOW_REPORT: &[u8] = b"<err>Overflow</err>";

/// Sample queue bytes a `CaptureLink` drains per service pass.
pub const LINK_BURST: u32 = 64;
