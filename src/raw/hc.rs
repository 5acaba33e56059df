//! The high-compression block encoder.
//!
//! Same output format as [`compress_block`](super::compress_block), but
//! instead of one remembered position per fingerprint we keep a chain of
//! them and walk it, taking the longest in-window match. Compression ratio
//! goes up with search depth, speed goes down, and the output stays a valid
//! block at any depth.

use byteorder::{ByteOrder, LE};
use fehler::throws;
use std::cmp;

use super::{
    block_hash, put_last_literals, put_sequence, MFLIMIT, MINMATCH, WINDOW_MASK, WINDOW_SIZE,
};

type Error = super::Error;

/// Compress one block of `src` into `dst`, searching harder than the fast
/// encoder.
///
/// `depth` caps how many chained candidates may improve the match at each
/// position; `0` means unlimited. `depth = 1` inspects only the most recent
/// occurrence of each fingerprint, which lands close to (but not exactly at)
/// the fast encoder's output.
///
/// Returns the number of bytes written, `Ok(0)` for incompressible input,
/// and an error if `dst` runs out of room.
#[throws]
pub fn compress_block_hc(src: &[u8], dst: &mut [u8], depth: usize) -> usize {
    if src.len() <= MFLIMIT || dst.is_empty() {
        return 0;
    }
    let sn = src.len() - MFLIMIT;
    let depth = if depth == 0 { WINDOW_SIZE } else { depth };

    // hash_table: most recent position per fingerprint.
    // chain_table: per position (mod window), the previous position that
    // shared its bucket when it was inserted. A cell of 0 terminates the
    // chain, so position 0 never serves as a match source; it can only
    // anchor literals.
    let mut hash_table = vec![0u32; WINDOW_SIZE];
    let mut chain_table = vec![0u32; WINDOW_SIZE];

    let mut si = 0;
    let mut di = 0;
    let mut anchor = 0;

    while si < sn {
        let mut seq = LE::read_u32(&src[si..]);
        let h = block_hash(seq);

        // Walk the chain for the longest match still inside the window.
        let mut best_len = 0;
        let mut best_off = 0;
        let mut tries = depth;
        let mut next = hash_table[h] as usize;
        while tries > 0 && next > 0 && si - next < WINDOW_SIZE {
            // a longer match must agree at the current best length, which is
            // a one-byte probe before the full measurement
            if src[next + best_len] == src[si + best_len] {
                let mut ml = 0;
                while ml < sn - si {
                    let x = LE::read_u64(&src[next + ml..]) ^ LE::read_u64(&src[si + ml..]);
                    if x == 0 {
                        ml += 8;
                    } else {
                        ml += (x.trailing_zeros() >> 3) as usize;
                        break;
                    }
                }
                if ml >= MINMATCH && ml > best_len {
                    best_len = ml;
                    best_off = si - next;
                    tries -= 1;
                }
            }
            next = chain_table[next & WINDOW_MASK] as usize;
        }

        chain_table[si & WINDOW_MASK] = hash_table[h];
        hash_table[h] = si as u32;

        if best_len == 0 {
            si += 1;
            continue;
        }

        // Register the positions inside the match too, so later searches can
        // land on overlapping long matches. The fingerprint slides one byte
        // per step instead of being re-read. Matches longer than the window
        // only register their trailing window's worth.
        let match_end = si + best_len;
        let mut pos = cmp::max(si + 1, match_end.saturating_sub(WINDOW_SIZE));
        while pos < match_end {
            seq = (seq >> 8) | (u32::from(src[pos + 3]) << 24);
            let h = block_hash(seq);
            chain_table[pos & WINDOW_MASK] = hash_table[h];
            hash_table[h] = pos as u32;
            pos += 1;
        }

        di = put_sequence(
            dst,
            di,
            &src[anchor..si],
            best_off as u16,
            best_len - MINMATCH,
        )?;
        si = match_end;
        anchor = si;
    }

    if anchor == 0 {
        return 0;
    }
    match put_last_literals(dst, di, &src[anchor..], anchor)? {
        Some(di) => di,
        None => 0,
    }
}
