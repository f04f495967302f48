//! Salsa20 benchmark, once per supported backend
use benches::{criterion_group_bench, Benchmarker, SIZES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use velocipher_salsa20::{
    cipher::{StreamCipher, StreamCipherCoreWrapper},
    Key, Nonce, SalsaCore, STRATEGIES,
};

fn bench_salsa20(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("salsa20");

    for strategy in STRATEGIES.supported() {
        for size in SIZES {
            let mut buf = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as u64));

            group.bench_function(BenchmarkId::new(strategy.name(), size), |b| {
                let key = Default::default();
                let nonce = Default::default();
                let core = SalsaCore::with_strategy(&key, &nonce, strategy).unwrap();
                let mut cipher = StreamCipherCoreWrapper::from_core(core);
                b.iter(|| cipher.apply_keystream(&mut buf));
            });
        }
    }

    group.finish();
}

// Re-keying cost matters for the framed API, which builds a core per call.
fn bench_salsa20_setup(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("salsa20-setup");
    let mut buf = [0u8; 64];

    group.throughput(Throughput::Bytes(64));

    group.bench_function("new_and_one_block", |b| {
        let key = Key::from_slice(&[0x80; 32]).clone();
        let nonce = Nonce::default();
        b.iter(|| {
            let core = SalsaCore::with_strategy(&key, &nonce, STRATEGIES.get()).unwrap();
            StreamCipherCoreWrapper::from_core(core).apply_keystream(&mut buf);
        });
    });

    group.finish();
}

criterion_group_bench!(benches_salsa20, bench_salsa20, bench_salsa20_setup);
criterion_main!(benches_salsa20);
