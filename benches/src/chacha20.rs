//! ChaCha20 benchmark, once per supported backend
use benches::{criterion_group_bench, Benchmarker, SIZES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use velocipher_chacha20::{
    cipher::{StreamCipher, StreamCipherCoreWrapper},
    ChaChaCore, XChaChaCore, STRATEGIES,
};

fn bench_chacha20(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("chacha20");

    for strategy in STRATEGIES.supported() {
        for size in SIZES {
            let mut buf = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as u64));

            group.bench_function(BenchmarkId::new(strategy.name(), size), |b| {
                let key = Default::default();
                let nonce = Default::default();
                let core = ChaChaCore::with_strategy(&key, &nonce, strategy).unwrap();
                let mut cipher = StreamCipherCoreWrapper::from_core(core);
                b.iter(|| cipher.apply_keystream(&mut buf));
            });
        }
    }

    group.finish();
}

fn bench_xchacha20(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("xchacha20");

    for strategy in STRATEGIES.supported() {
        let size = 16 * 1024;
        let mut buf = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new(strategy.name(), size), |b| {
            let key = Default::default();
            let nonce = Default::default();
            let core = XChaChaCore::with_strategy(&key, &nonce, strategy).unwrap();
            let mut cipher = StreamCipherCoreWrapper::from_core(core);
            b.iter(|| cipher.apply_keystream(&mut buf));
        });
    }

    group.finish();
}

criterion_group_bench!(benches_chacha20, bench_chacha20, bench_xchacha20);
criterion_main!(benches_chacha20);
