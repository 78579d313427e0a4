//! Host-side helpers shared by the integration tests.

use logic_capture::compress::StreamCompressor;

const CLEAR: u16 = 256;

/// Compress `input` in one stream with `width`-bit codes.
pub fn compress<const H: usize>(input: &[u8], width: u8) -> Vec<u8> {
    let mut c: Box<StreamCompressor<H>> = Box::new(StreamCompressor::new());
    c.init(width).expect("compressor init");
    let mut out = Vec::new();
    let mut sink = |b: u8| out.push(b);
    c.compress_slice(input, &mut sink);
    c.flush(&mut sink);
    out
}

/// Split a packed stream into codes, up to and including the end code.
pub fn unpack(bytes: &[u8], width: u8) -> Vec<u16> {
    let end = (1u16 << width) - 1;
    let mut codes = Vec::new();
    let mut acc = 0u32;
    let mut bits = 0u8;
    for &b in bytes {
        acc = (acc << 8) | u32::from(b);
        bits += 8;
        if bits >= width {
            bits -= width;
            let code = ((acc >> bits) & u32::from(end)) as u16;
            acc &= (1 << bits) - 1;
            codes.push(code);
            if code == end {
                break;
            }
        }
    }
    codes
}

/// LZW decoder matching the host application's conventions.
///
/// After a clear code the dictionary restarts at 256, so the first entry
/// learned after a clear is a throwaway and later codes line up with the
/// encoder's from 257.
pub fn decompress(bytes: &[u8], width: u8) -> Result<Vec<u8>, String> {
    let end = (1u16 << width) - 1;
    let size = usize::from(end) + 1;
    let mut prefix = vec![0u16; size];
    let mut suffix = vec![0u8; size];
    for (i, s) in suffix.iter_mut().enumerate().take(256) {
        *s = i as u8;
    }

    let mut out = Vec::new();
    let mut free_entry = CLEAR + 1;
    let mut prev: Option<u16> = None;
    let mut scratch = Vec::new();

    let expand = |mut code: u16, prefix: &[u16], suffix: &[u8], scratch: &mut Vec<u8>| {
        scratch.clear();
        while code > 0xFF {
            scratch.push(suffix[usize::from(code)]);
            code = prefix[usize::from(code)];
        }
        scratch.push(code as u8);
        scratch.reverse();
    };

    for code in unpack(bytes, width) {
        if code == end {
            return Ok(out);
        }
        let Some(p) = prev else {
            if code > 0xFF {
                return Err(format!("stream starts with phrase code {code}"));
            }
            out.push(code as u8);
            prev = Some(code);
            continue;
        };
        if code == CLEAR {
            free_entry = CLEAR;
            continue;
        }

        if code < free_entry {
            expand(code, &prefix, &suffix, &mut scratch);
        } else if code == free_entry {
            expand(p, &prefix, &suffix, &mut scratch);
            scratch.push(scratch[0]);
        } else {
            return Err(format!("code {code} ahead of dictionary ({free_entry})"));
        }
        out.extend_from_slice(&scratch);

        if free_entry < end {
            prefix[usize::from(free_entry)] = p;
            suffix[usize::from(free_entry)] = scratch[0];
            free_entry += 1;
        }
        prev = Some(code);
    }
    Err("missing end-of-stream code".into())
}

/// Deterministic pseudo-random bytes.
pub fn noise(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed >> 24) as u8
        })
        .collect()
}
