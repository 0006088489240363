//! Cipher and AEAD throughput benchmarks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use criterion_cycles_per_byte::CyclesPerByte;

use chacha_aead::{aead, ChaCha20};

const KB: usize = 1024;

fn bench_cipher(c: &mut Criterion<CyclesPerByte>) {
    let mut group = c.benchmark_group("chacha20");

    for size in &[KB, 2 * KB, 4 * KB, 8 * KB, 16 * KB] {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("apply_keystream", size), |b| {
            let mut cipher = ChaCha20::new(&[0u8; 32], &[0u8; 12]).unwrap();
            b.iter(|| {
                cipher.set_counter(0);
                cipher.apply_keystream(&mut buf).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_aead(c: &mut Criterion<CyclesPerByte>) {
    let mut group = c.benchmark_group("chacha20poly1305");

    for size in &[KB, 2 * KB, 4 * KB, 8 * KB, 16 * KB] {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("encrypt_in_place", size), |b| {
            let mut cipher = ChaCha20::new(&[0u8; 32], &[0u8; 12]).unwrap();
            b.iter(|| aead::encrypt_in_place(&mut cipher, &mut buf, b"header").unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().with_measurement(CyclesPerByte);
    targets = bench_cipher, bench_aead
);
criterion_main!(benches);
