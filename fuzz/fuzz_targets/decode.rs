#![no_main]
use libfuzzer_sys::fuzz_target;
use lz_keen::raw::uncompress_block;

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must decode cleanly or fail cleanly, never panic
    let mut out = vec![0u8; 64 * 1024];
    let _ = uncompress_block(data, &mut out);
});
