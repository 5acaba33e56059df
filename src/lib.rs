#![forbid(unsafe_code)]

//! A pure-Rust codec for the LZ4 *block* format.
//!
//! A block is the unframed unit of LZ4: a run of (literals, back-reference)
//! sequences closed by a literal-only run. Everything inside an LZ4 frame is
//! one of these. This crate encodes and decodes single blocks and nothing
//! else: framing (magic numbers, descriptors, checksums, concatenation) is
//! a separate concern for whatever layer carries the blocks around.
//!
//! Two encoders share the output format: [`raw::compress_block`] makes one
//! pass with a single hash cell per 4-byte fingerprint, and
//! [`raw::compress_block_hc`] chains colliding positions and searches up to
//! a caller-chosen depth for the longest match. Both signal incompressible
//! input by returning `Ok(0)`, in which case the caller should store the
//! bytes raw.

pub mod raw;
