//! Fixed-width code → byte packing.

use crate::control::ByteSink;

/// Packs fixed-width codes MSB-first into a byte stream.
///
/// Fewer than eight bits are held between calls; a byte is handed to the
/// sink as soon as it is complete.
#[derive(Debug, Clone)]
pub struct CodePacker {
    width: u8,
    acc: u32,
    acc_bits: u8,
}

impl CodePacker {
    pub const fn new(width: u8) -> Self {
        CodePacker {
            width,
            acc: 0,
            acc_bits: 0,
        }
    }

    /// Bits waiting for the next byte, always fewer than eight.
    pub fn pending_bits(&self) -> u8 {
        self.acc_bits
    }

    /// Append the low `width` bits of `code`.
    pub fn push<S: ByteSink>(&mut self, code: u16, sink: &mut S) {
        let mask = (1u32 << self.width) - 1;
        self.acc = (self.acc << self.width) | (u32::from(code) & mask);
        self.acc_bits += self.width;
        while self.acc_bits >= 8 {
            self.acc_bits -= 8;
            sink.emit((self.acc >> self.acc_bits) as u8);
        }
        self.acc &= (1u32 << self.acc_bits) - 1;
    }

    /// Emit a trailing partial byte, zero-padded on the right.
    pub fn finish<S: ByteSink>(&mut self, sink: &mut S) {
        if self.acc_bits > 0 {
            sink.emit((self.acc << (8 - self.acc_bits)) as u8);
        }
        self.acc = 0;
        self.acc_bits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bytes {
        buf: [u8; 16],
        len: usize,
    }

    impl Bytes {
        fn new() -> Self {
            Bytes {
                buf: [0; 16],
                len: 0,
            }
        }

        fn as_slice(&self) -> &[u8] {
            &self.buf[..self.len]
        }
    }

    impl ByteSink for Bytes {
        fn emit(&mut self, byte: u8) {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    #[test]
    fn nine_bit_codes() {
        let mut out = Bytes::new();
        let mut p = CodePacker::new(9);
        // 0x141 = 1_0100_0001, 0x100 = 1_0000_0000
        p.push(0x141, &mut out);
        assert_eq!(out.as_slice(), &[0xA0]);
        assert_eq!(p.pending_bits(), 1);

        p.push(0x100, &mut out);
        assert_eq!(out.as_slice(), &[0xA0, 0xC0]);
        assert_eq!(p.pending_bits(), 2);

        p.finish(&mut out);
        assert_eq!(out.as_slice(), &[0xA0, 0xC0, 0x00]);
        assert_eq!(p.pending_bits(), 0);
    }

    #[test]
    fn thirteen_bit_all_ones_pads_with_zeros() {
        let mut out = Bytes::new();
        let mut p = CodePacker::new(13);
        p.push(0x1FFF, &mut out);
        p.finish(&mut out);
        assert_eq!(out.as_slice(), &[0xFF, 0xF8]);
    }

    #[test]
    fn eight_codes_fill_whole_bytes() {
        let mut out = Bytes::new();
        let mut p = CodePacker::new(9);
        for _ in 0..8 {
            p.push(0x1FF, &mut out);
        }
        assert_eq!(out.len, 9);
        assert!(out.as_slice().iter().all(|&b| b == 0xFF));
        p.finish(&mut out);
        assert_eq!(out.len, 9);
    }

    #[test]
    fn excess_bits_are_masked() {
        let mut out = Bytes::new();
        let mut p = CodePacker::new(9);
        p.push(0xFE00 | 0x003, &mut out);
        p.finish(&mut out);
        assert_eq!(out.as_slice(), &[0x01, 0x80]);
    }
}
