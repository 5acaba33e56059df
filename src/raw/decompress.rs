//! LZ4 block decompression.
//!
//! The decoder is the hot path for most users, so the match copy branches
//! on overlap: a back-reference is allowed to read bytes the same copy is
//! still producing (that is how the format spells run-length encoding), and
//! a plain memcpy would read them before they exist.

use byteorder::{ByteOrder, LE};
use fehler::{throw, throws};

use super::MINMATCH;

type Error = super::Error;

/// This is how LZ4 continues lengths of 15 and up: keep reading and adding
/// while it's all 0xFF.
#[throws]
fn read_lsic(src: &[u8], si: &mut usize, nibble: u8) -> usize {
    let mut value = nibble as usize;
    if value == 0xF {
        loop {
            if *si == src.len() {
                throw!(Error::InvalidSourceShortBuffer);
            }
            let more = src[*si];
            *si += 1;
            value += more as usize;
            if more != 0xFF {
                break;
            }
        }
    }
    value
}

/// Copy `len` match bytes starting `offset` back from `di`. The regions may
/// overlap; an overlapping copy must run front to back so that it reads the
/// bytes it just wrote.
fn copy_match(dst: &mut [u8], di: usize, offset: usize, len: usize) {
    match offset {
        // run-length extension of the previous byte
        1 => {
            let b = dst[di - 1];
            for d in &mut dst[di..di + len] {
                *d = b;
            }
        }
        // no overlap: one memcpy
        o if o >= len => {
            let (head, tail) = dst.split_at_mut(di);
            tail[..len].copy_from_slice(&head[di - o..di - o + len]);
        }
        // overlapping: byte at a time, front to back
        _ => {
            for i in 0..len {
                dst[di + i] = dst[di - offset + i];
            }
        }
    }
}

/// Decompress one block of `src` into `dst`, returning the number of bytes
/// produced.
///
/// `dst` must be at least as large as the uncompressed size. Truncated or
/// malformed input, an offset pointing before the start of the output, and
/// an undersized `dst` all fail with [`Error::InvalidSourceShortBuffer`].
#[throws]
pub fn uncompress_block(src: &[u8], dst: &mut [u8]) -> usize {
    if src.is_empty() {
        return 0;
    }

    let mut si = 0;
    let mut di = 0;
    loop {
        if si == src.len() {
            // a block may not end on a match
            throw!(Error::InvalidSourceShortBuffer);
        }
        let token = src[si];
        si += 1;

        // literals
        let lit_len = read_lsic(src, &mut si, token >> 4)?;
        if lit_len > src.len() - si || lit_len > dst.len() - di {
            throw!(Error::InvalidSourceShortBuffer);
        }
        dst[di..di + lit_len].copy_from_slice(&src[si..si + lit_len]);
        si += lit_len;
        di += lit_len;
        if si == src.len() {
            // final group: literals only
            return di;
        }

        // back-reference
        if src.len() - si < 2 {
            throw!(Error::InvalidSourceShortBuffer);
        }
        let offset = LE::read_u16(&src[si..]) as usize;
        si += 2;
        if offset == 0 || offset > di {
            throw!(Error::InvalidSourceShortBuffer);
        }

        let match_len = MINMATCH + read_lsic(src, &mut si, token & 0xF)?;
        if match_len > dst.len() - di {
            throw!(Error::InvalidSourceShortBuffer);
        }
        copy_match(dst, di, offset, match_len);
        di += match_len;
    }
}
