#![no_main]
use lzwgc::{compress, decompress, Decompressor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, Vec<u16>, u8)| {
    let (input, raw_tokens, bits) = data;
    let capacity = 1u32 << (u32::from(bits) % 5 + 8); // 2^8 to 2^12

    // Arbitrary token streams must be rejected or decoded, never panic.
    let mut decompressor = Decompressor::new(capacity).unwrap();
    for token in raw_tokens {
        if decompressor.receive(u32::from(token)).is_err() {
            assert!(decompressor.is_aborted());
            break;
        }
    }

    let tokens = compress(capacity, &input).unwrap();
    assert!(tokens.len() <= input.len());
    assert_eq!(decompress(capacity, &tokens).unwrap(), input);
});
