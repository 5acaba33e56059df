//! The fast block encoder.
//!
//! We make use of a hash table to find duplicates: one cell per 4-byte
//! fingerprint, holding the last position that fingerprint was seen at.
//! That gives a reasonable compression ratio at high speed and fixed memory
//! usage, at the price of forgetting all but the most recent occurrence.

use byteorder::{ByteOrder, LE};
use fehler::throws;

use super::{block_hash, put_last_literals, put_sequence, MFLIMIT, MINMATCH, WINDOW_SIZE};

type Error = super::Error;

/// Match-position table for [`compress_block`].
///
/// One `u32` cell per fingerprint. The encoder never clears it: entries left
/// over from a previous call are rejected by a range check instead, so a
/// framed caller can push a whole stream of blocks through one table without
/// paying for a 256 KiB wipe each time. Do not share one table between
/// concurrent calls.
#[derive(Clone)]
pub struct HashTable {
    cells: Box<[u32]>,
}

impl Default for HashTable {
    fn default() -> Self {
        HashTable {
            cells: vec![0; WINDOW_SIZE].into_boxed_slice(),
        }
    }
}

/// Compress one block of `src` into `dst`.
///
/// Returns the number of bytes written. `Ok(0)` means the input is
/// incompressible and the caller should store it raw; inputs of `MFLIMIT`
/// bytes or fewer are always reported that way.
///
/// Running out of room in `dst` is an error. Size it with
/// [`compress_block_bound`](super::compress_block_bound) to rule that out.
#[throws]
pub fn compress_block(src: &[u8], dst: &mut [u8], table: &mut HashTable) -> usize {
    if src.len() <= MFLIMIT || dst.is_empty() {
        return 0;
    }
    let sn = src.len() - MFLIMIT;

    let mut si = 0;
    let mut di = 0;
    let mut anchor = 0;

    while si < sn {
        let seq = LE::read_u32(&src[si..]);
        let h = block_hash(seq);

        let candidate = table.cells[h] as usize;
        table.cells[h] = si as u32;
        if candidate >= sn {
            // stale cell from a previous, larger input
            si += 1;
            continue;
        }
        if candidate >= si
            || si - candidate >= WINDOW_SIZE
            || LE::read_u32(&src[candidate..]) != seq
        {
            si += 1;
            continue;
        }

        let offset = si - candidate;
        let lit_len = si - anchor;

        // The first four bytes matched; extend a full word at a time. A word
        // step may carry `si` a little past `sn`, never past the 5-literal
        // tail guard.
        si += MINMATCH;
        let match_base = si;
        while si < sn {
            let x = LE::read_u64(&src[si..]) ^ LE::read_u64(&src[si - offset..]);
            if x == 0 {
                si += 8;
            } else {
                si += (x.trailing_zeros() >> 3) as usize;
                break;
            }
        }
        let extra = si - match_base;

        di = put_sequence(
            dst,
            di,
            &src[anchor..anchor + lit_len],
            offset as u16,
            extra,
        )?;
        anchor = si;
    }

    if anchor == 0 {
        // not a single match anywhere
        return 0;
    }
    match put_last_literals(dst, di, &src[anchor..], anchor)? {
        Some(di) => di,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{compress_block_bound, uncompress_block};

    /// Compress, then check that decompressing restores the input.
    /// Returns the compressed size (0 for incompressible).
    fn inverse(input: &[u8]) -> usize {
        let mut compressed = vec![0u8; compress_block_bound(input.len())];
        let n = compress_block(input, &mut compressed, &mut HashTable::default()).unwrap();
        if n > 0 {
            let mut plain = vec![0u8; input.len()];
            let m = uncompress_block(&compressed[..n], &mut plain).unwrap();
            assert_eq!(m, input.len());
            assert_eq!(plain.as_slice(), input);
        }
        n
    }

    #[test]
    fn repetitive_text_compresses() {
        let n = inverse(b"round and round and round and round the ragged rock we ran");
        assert!(n > 0);
    }

    #[test]
    fn long_runs() {
        assert!(inverse(&[0x61; 64]) > 0);
        assert!(inverse(&[0; 4096]) > 0);
        assert!(inverse(b"abcdeabcdeabcdeabcdeabcdeabcdeabcdeabcde") > 0);
    }

    #[test]
    fn tiny_inputs_are_stored_raw() {
        assert_eq!(inverse(b""), 0);
        assert_eq!(inverse(&[0x41]), 0);
        assert_eq!(inverse(b"twelve bytes"), 0);
    }

    #[test]
    fn unique_bytes_are_incompressible() {
        let input: Vec<u8> = (0u8..=255).collect();
        assert_eq!(inverse(&input), 0);
    }

    #[test]
    fn empty_destination_stores_raw() {
        let n = compress_block(&[0x61; 64], &mut [], &mut HashTable::default()).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn undersized_destination_errors() {
        let input = vec![0x7au8; 1024];
        let mut dst = vec![0u8; 4];
        let err = compress_block(&input, &mut dst, &mut HashTable::default()).unwrap_err();
        assert_eq!(err, Error::InvalidSourceShortBuffer);
    }

    #[test]
    fn stale_cells_are_rejected_by_range() {
        let mut table = HashTable::default();

        // seed the table with positions only valid for a large input
        let big: Vec<u8> = (0..8192u32).flat_map(|i| i.to_le_bytes()).collect();
        let mut dst = vec![0u8; compress_block_bound(big.len())];
        assert!(compress_block(&big, &mut dst, &mut table).is_ok());

        // the smaller input must still round-trip through the dirty table
        let small = b"a smaller block, same table, same table, same table";
        let n = compress_block(small, &mut dst, &mut table).unwrap();
        assert!(n > 0);
        let mut plain = vec![0u8; small.len()];
        let m = uncompress_block(&dst[..n], &mut plain).unwrap();
        assert_eq!(&plain[..m], &small[..]);
    }

    #[test]
    fn bound_is_sufficient_for_any_input() {
        // worst case: incompressible input in a bound-sized buffer never errors
        let input: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let mut dst = vec![0u8; compress_block_bound(input.len())];
        assert!(compress_block(&input, &mut dst, &mut HashTable::default()).is_ok());
    }
}
