//! Whole-buffer framed encryption, per algorithm
use benches::{criterion_group_bench, Benchmarker, KB, SIZES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use velocipher::{AesGcm, Algorithm};

fn bench_encrypt(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("framed-encrypt");

    for algorithm in Algorithm::ALL {
        let key = algorithm.generate_key().unwrap();
        for size in SIZES {
            let buf = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as u64));

            group.bench_function(BenchmarkId::new(algorithm.name(), size), |b| {
                b.iter(|| algorithm.encrypt(&buf, &key).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_decrypt(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("framed-decrypt");

    for algorithm in Algorithm::ALL {
        let key = algorithm.generate_key().unwrap();
        let size = 16 * KB;
        let framed = algorithm.encrypt(&vec![0u8; size], &key).unwrap();

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new(algorithm.name(), size), |b| {
            b.iter(|| algorithm.decrypt(&framed, &key).unwrap());
        });
    }

    group.finish();
}

fn bench_gcm_parallel(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("aes-gcm-parallel");
    group.sample_size(10);

    let key = Algorithm::AesGcm.generate_key().unwrap();
    for size in [4 * KB * KB, 16 * KB * KB] {
        let buf = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("encrypt_parallel", size), |b| {
            b.iter(|| AesGcm.encrypt_parallel(&buf, &key).unwrap());
        });
    }

    group.finish();
}

criterion_group_bench!(benches_framed, bench_encrypt, bench_decrypt, bench_gcm_parallel);
criterion_main!(benches_framed);
