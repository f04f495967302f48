//! Poly1305 benchmark
use benches::{criterion_group_bench, Benchmarker, SIZES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use velocipher_poly1305::Poly1305;

fn bench_poly1305(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("poly1305");

    for size in SIZES {
        let buf = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("update_finalize", size), |b| {
            let key = [0x42u8; 32];
            b.iter(|| {
                let mut mac = Poly1305::new(&key);
                mac.update(&buf);
                mac.finalize()
            });
        });
    }

    group.finish();
}

criterion_group_bench!(benches_poly1305, bench_poly1305);
criterion_main!(benches_poly1305);
