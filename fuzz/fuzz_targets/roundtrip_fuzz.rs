#![no_main]
use libfuzzer_sys::fuzz_target;
use lz_keen::raw::{
    compress_block, compress_block_bound, compress_block_hc, uncompress_block, HashTable,
};

fuzz_target!(|data: &[u8]| {
    let mut compressed = vec![0u8; compress_block_bound(data.len())];
    let mut plain = vec![0u8; data.len()];

    let n = compress_block(data, &mut compressed, &mut HashTable::default())
        .expect("a bound-sized destination cannot run out of room");
    if n > 0 {
        let m = uncompress_block(&compressed[..n], &mut plain).expect("own output must decode");
        assert_eq!(m, data.len());
        assert_eq!(&plain[..m], data);
    }

    let n = compress_block_hc(data, &mut compressed, 16)
        .expect("a bound-sized destination cannot run out of room");
    if n > 0 {
        let m = uncompress_block(&compressed[..n], &mut plain).expect("own output must decode");
        assert_eq!(m, data.len());
        assert_eq!(&plain[..m], data);
    }
});
