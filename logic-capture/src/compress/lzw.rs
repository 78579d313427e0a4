//! LZW stream compressor over a statically sized open-addressed table.
//!
//! Phrases `(prefix code, next byte)` are keyed as `prefix << 16 | byte`
//! and located by double hashing in a prime-sized table, so the table lives
//! inline in the struct and never grows. When the code space runs out the
//! compressor emits [`CLEAR_CODE`] and starts a fresh dictionary.

use crate::constants::{
    CLEAR_CODE, DEFAULT_HASH_SIZE, FIRST_CODE, HASH_PRIMES, MAX_CODE_WIDTH, MIN_CODE_WIDTH,
};
use crate::control::ByteSink;
use crate::error::CompressorInitError;

use super::packer::CodePacker;

/// Key stored in vacant slots. Real keys are below `2^31`.
const EMPTY: u32 = u32::MAX;

/// Result of looking a phrase up in the table.
enum Probe {
    /// Phrase already has a code.
    Hit(u16),
    /// Phrase is unknown; this vacant slot is where it belongs.
    Miss(usize),
}

/// Single-pass LZW encoder with fixed-width output codes.
///
/// `H` is the table capacity. It must be at least the prime that
/// [`init`](Self::init) selects for the requested code width, which is
/// 9001 for 13-bit codes.
pub struct StreamCompressor<const H: usize = DEFAULT_HASH_SIZE> {
    hash_table: [u32; H],
    code_table: [u16; H],
    /// Slots in use for the current code width.
    hash_size: usize,
    shift: u32,
    /// End-of-stream code, `2^width - 1`. No phrase gets this code.
    max_code: u16,
    free_entry: u16,
    /// Code of the phrase matched so far.
    phrase: u16,
    first_byte: bool,
    checksum: u32,
    resets: u32,
    packer: CodePacker,
    active: bool,
}

impl<const H: usize> StreamCompressor<H> {
    /// An inactive compressor. Call [`init`](Self::init) before use.
    pub const fn new() -> Self {
        StreamCompressor {
            hash_table: [EMPTY; H],
            code_table: [0; H],
            hash_size: 0,
            shift: 0,
            max_code: 0,
            free_entry: FIRST_CODE,
            phrase: 0,
            first_byte: true,
            checksum: 0,
            resets: 0,
            packer: CodePacker::new(MIN_CODE_WIDTH),
            active: false,
        }
    }

    /// Prepare a new stream with `code_width`-bit codes.
    ///
    /// On error the compressor stays inactive.
    pub fn init(&mut self, code_width: u8) -> Result<(), CompressorInitError> {
        self.active = false;
        if !(MIN_CODE_WIDTH..=MAX_CODE_WIDTH).contains(&code_width) {
            error!("compressor: unsupported code width {=u8}", code_width);
            return Err(CompressorInitError::UnsupportedCodeWidth(code_width));
        }
        let hash_size = usize::from(HASH_PRIMES[usize::from(code_width - MIN_CODE_WIDTH)]);
        if hash_size > H {
            error!(
                "compressor: table holds {=usize} slots, {=usize} required",
                H, hash_size
            );
            return Err(CompressorInitError::TableTooSmall {
                required: hash_size,
                available: H,
            });
        }

        // Spread byte values across the table: shift = 8 - log2(65536 / size)
        let mut doublings = 0;
        let mut span = hash_size;
        while span < 0x1_0000 {
            span *= 2;
            doublings += 1;
        }

        self.hash_size = hash_size;
        self.shift = 8 - doublings;
        self.max_code = ((1u32 << code_width) - 1) as u16;
        self.phrase = 0;
        self.first_byte = true;
        self.checksum = 0;
        self.resets = 0;
        self.packer = CodePacker::new(code_width);
        self.clear_table();
        self.active = true;
        debug!(
            "compressor: {=u8}-bit codes, {=usize} slots",
            code_width, hash_size
        );
        Ok(())
    }

    /// Feed one input byte. Completed output bytes go to `sink`.
    ///
    /// Does nothing unless the compressor is active.
    pub fn compress_byte<S: ByteSink>(&mut self, byte: u8, sink: &mut S) {
        if !self.active {
            return;
        }
        self.checksum = self.checksum.wrapping_add(u32::from(byte));

        if self.first_byte {
            self.first_byte = false;
            self.phrase = u16::from(byte);
            return;
        }

        let slot = match self.probe(byte) {
            Probe::Hit(code) => {
                self.phrase = code;
                return;
            }
            Probe::Miss(slot) => slot,
        };

        self.packer.push(self.phrase, sink);
        let key = Self::key(self.phrase, byte);
        self.phrase = u16::from(byte);

        if self.free_entry < self.max_code {
            self.code_table[slot] = self.free_entry;
            self.hash_table[slot] = key;
            self.free_entry += 1;
        } else {
            self.packer.push(CLEAR_CODE, sink);
            self.clear_table();
            self.resets = self.resets.wrapping_add(1);
            debug!("compressor: dictionary reset #{=u32}", self.resets);
        }
    }

    pub fn compress_slice<S: ByteSink>(&mut self, bytes: &[u8], sink: &mut S) {
        for &b in bytes {
            self.compress_byte(b, sink);
        }
    }

    /// Finish the stream: the pending phrase, the end-of-stream code, then
    /// any partial byte padded with zeros. Leaves the compressor inactive.
    ///
    /// A stream that never received input yields only the end-of-stream
    /// code.
    pub fn flush<S: ByteSink>(&mut self, sink: &mut S) {
        if !self.active {
            return;
        }
        if !self.first_byte {
            self.packer.push(self.phrase, sink);
        }
        self.packer.push(self.max_code, sink);
        self.packer.finish(sink);
        self.active = false;
    }

    /// Wrapping sum of every byte fed since [`init`](Self::init).
    pub fn input_checksum(&self) -> u32 {
        self.checksum
    }

    /// Next code to be assigned.
    pub fn free_entry(&self) -> u16 {
        self.free_entry
    }

    /// End-of-stream code for the current width.
    pub fn end_code(&self) -> u16 {
        self.max_code
    }

    /// Dictionary resets since [`init`](Self::init).
    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn key(phrase: u16, byte: u8) -> u32 {
        (u32::from(phrase) << 16) | u32::from(byte)
    }

    fn probe(&self, byte: u8) -> Probe {
        let key = Self::key(self.phrase, byte);
        let mut index =
            ((usize::from(byte) << self.shift) ^ usize::from(self.phrase)) % self.hash_size;

        let displacement = if index == 0 {
            1
        } else {
            self.hash_size - index
        };

        // The table never holds more than `max_code - FIRST_CODE` phrases,
        // fewer than `hash_size`, and the step is coprime with the prime
        // size, so a vacant slot is always reached.
        loop {
            match self.hash_table[index] {
                k if k == key => return Probe::Hit(self.code_table[index]),
                EMPTY => return Probe::Miss(index),
                _ => {}
            }
            index = if index >= displacement {
                index - displacement
            } else {
                index + self.hash_size - displacement
            };
        }
    }

    fn clear_table(&mut self) {
        self.hash_table[..self.hash_size].fill(EMPTY);
        self.free_entry = FIRST_CODE;
    }
}

impl<const H: usize> Default for StreamCompressor<H> {
    fn default() -> Self {
        Self::new()
    }
}
