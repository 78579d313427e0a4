//! Output compression.
//!
//! [`StreamCompressor`] is a byte-oriented LZW coder with fixed-width codes
//! (9–15 bits, 13 by default). It consumes bytes drained from the sample
//! queue in the main loop and hands packed bytes to a
//! [`ByteSink`](crate::control::ByteSink) as they complete.
//!
//! ## Code space
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0–255 | Single byte |
//! | 256 | Clear: decoder discards its dictionary |
//! | 257 … `2^width - 2` | Learned phrases |
//! | `2^width - 1` | End of stream |
//!
//! All state, including the hash table, is stored inline so a compressor
//! can live in a `static`.

mod lzw;
mod packer;

pub use lzw::StreamCompressor;
pub use packer::CodePacker;
