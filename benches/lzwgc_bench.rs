use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzwgc::{compress, compress_chunks, decompress, Capacity, Config};

fn sample(len: usize) -> Vec<u8> {
    // Skewed text-like input: a few hundred distinct words with drift.
    let mut state = 0x9E37_79B9u32;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let word = (state % 300) + (out.len() / 50_000) as u32;
        out.extend_from_slice(format!("w{} ", word).as_bytes());
    }
    out.truncate(len);
    out
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzwgc");
    let input = sample(1 << 20);
    group.throughput(Throughput::Bytes(input.len() as u64));

    for bits in [12u32, 16, 20] {
        let capacity = 1u32 << bits;
        group.bench_with_input(BenchmarkId::new("compress", bits), &input, |b, input| {
            b.iter(|| compress(capacity, input).unwrap())
        });

        let tokens = compress(capacity, &input).unwrap();
        group.bench_with_input(BenchmarkId::new("decompress", bits), &tokens, |b, tokens| {
            b.iter(|| decompress(capacity, tokens).unwrap())
        });
    }
}

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzwgc_chunked");
    let input = sample(4 << 20);
    group.throughput(Throughput::Bytes(input.len() as u64));

    for workers in [1usize, 4] {
        let config = Config::new(Capacity::from_code_bits(16).unwrap()).with_workers(workers);
        group.bench_with_input(BenchmarkId::new("compress", workers), &input, |b, input| {
            b.iter(|| compress_chunks(input, &config).unwrap())
        });
    }
}

criterion_group!(benches, bench_codec, bench_chunked);
criterion_main!(benches);
