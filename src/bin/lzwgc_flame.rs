use lzwgc::{Compressor, Decompressor};

fn main() {
    let pattern = b"abracadabra, alakazam ";
    let input = (0..100_000usize)
        .map(|i| pattern[(i * 7 + i / 13) % pattern.len()])
        .collect::<Vec<u8>>();
    let capacity = 1 << 12;

    for _ in 0..200 {
        let mut compressor = Compressor::new(capacity).unwrap();
        let mut tokens = Vec::with_capacity(input.len());
        for &byte in &input {
            if let Some(token) = compressor.receive(byte).unwrap() {
                tokens.push(token);
            }
        }
        tokens.extend(compressor.finish());

        let mut decompressor = Decompressor::new(capacity).unwrap();
        let mut produced = 0;
        for &token in &tokens {
            produced += decompressor.receive(token).unwrap().len();
        }
        assert_eq!(produced, input.len());
    }
}
