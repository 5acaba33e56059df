//! The raw LZ4 block format.
//!
//! The wire layout is a sequence of groups, each introduced by a token byte:
//! the high nibble is the literal count, the low nibble the match length
//! minus four, either nibble saturating at 15 and continuing in trailing
//! bytes (a run of `0xFF` closed by one byte below `0xFF`). Literals follow
//! the token, then a 16-bit little-endian back-reference offset, then the
//! match length continuation. The final group carries literals only.
//!
//! Both encoders here emit that layout; [`uncompress_block`] reverses it.
//! Incompressible input is not an error: the encoders return `Ok(0)` and the
//! caller is expected to store the bytes raw instead.

mod compress;
mod decompress;
mod hc;

pub use compress::*;
pub use decompress::*;
pub use hc::*;

use byteorder::{ByteOrder, LE};
use fehler::{throw, throws};
use std::cmp;
use thiserror::Error;

/// Max back-reference distance; also the size of the match-finder tables.
const WINDOW_SIZE: usize = 64 * 1024;
const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Shortest match the token encoding can express.
const MINMATCH: usize = 4;

/// Matches may not start within the last `MFLIMIT` bytes of input. The
/// format itself wants at least 5 trailing literals; the surplus keeps the
/// word-sized compare loops away from the end of the buffer.
const MFLIMIT: usize = 12;

const HASH_SHIFT: u32 = 16;

/// Errors for both directions of the block codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The compressed data is truncated or malformed, a back-reference
    /// points before the start of the output, or the destination buffer is
    /// too small to take the result.
    #[error("source is truncated or malformed, or the destination buffer is too small")]
    InvalidSourceShortBuffer,
}

/// Hash four little-endian bytes into a table slot, Knuth style.
#[inline]
fn block_hash(v: u32) -> usize {
    (v.wrapping_mul(2_654_435_761) >> HASH_SHIFT) as usize
}

/// Worst-case compressed size for an input of `n` bytes.
///
/// Give the destination at least this much room and the encoders can never
/// fail with [`Error::InvalidSourceShortBuffer`].
pub fn compress_block_bound(n: usize) -> usize {
    n + n / 255 + 16
}

// Token and length emission, shared by both encoders. "LSIC" is the LZ4
// documentation's name for the saturating nibble-plus-continuation scheme.

fn lsic_head(token: &mut u8, shift: u32, value: usize) {
    *token |= (cmp::min(value, 0xF) as u8) << shift;
}

/// How many continuation bytes `value` needs beyond its token nibble.
fn lsic_len(value: usize) -> usize {
    if value < 0xF {
        0
    } else {
        (value - 0xF) / 0xFF + 1
    }
}

/// Write the continuation run for `value`. The caller has already reserved
/// `lsic_len(value)` bytes.
fn put_lsic(dst: &mut [u8], mut di: usize, mut value: usize) -> usize {
    if value < 0xF {
        return di;
    }
    value -= 0xF;
    while value >= 0xFF {
        dst[di] = 0xFF;
        di += 1;
        value -= 0xFF;
    }
    dst[di] = value as u8;
    di + 1
}

/// Emit one full group: token, literal-length continuation, literals,
/// offset, match-length continuation. `extra` is the match length beyond
/// [`MINMATCH`]. Returns the advanced destination cursor.
#[throws]
fn put_sequence(dst: &mut [u8], mut di: usize, literals: &[u8], offset: u16, extra: usize) -> usize {
    let needed = 1 + lsic_len(literals.len()) + literals.len() + 2 + lsic_len(extra);
    if dst.len() - di < needed {
        throw!(Error::InvalidSourceShortBuffer);
    }

    let mut token = 0;
    lsic_head(&mut token, 4, literals.len());
    lsic_head(&mut token, 0, extra);
    dst[di] = token;
    di = put_lsic(dst, di + 1, literals.len());

    dst[di..di + literals.len()].copy_from_slice(literals);
    di += literals.len();

    LE::write_u16(&mut dst[di..], offset);
    put_lsic(dst, di + 2, extra)
}

/// Close the block with its literal-only group. Returns `None` when the
/// output is not strictly smaller than storing bytes `0..anchor` raw, which
/// the encoders report as incompressible.
#[throws]
fn put_last_literals(
    dst: &mut [u8],
    mut di: usize,
    literals: &[u8],
    anchor: usize,
) -> Option<usize> {
    if dst.len() - di < 1 + lsic_len(literals.len()) {
        throw!(Error::InvalidSourceShortBuffer);
    }
    let mut token = 0;
    lsic_head(&mut token, 4, literals.len());
    dst[di] = token;
    di = put_lsic(dst, di + 1, literals.len());

    if di >= anchor {
        return None;
    }
    if dst.len() - di < literals.len() {
        throw!(Error::InvalidSourceShortBuffer);
    }
    dst[di..di + literals.len()].copy_from_slice(literals);
    Some(di + literals.len())
}
