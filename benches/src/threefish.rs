//! Threefish-512 benchmark, once per supported backend
use benches::{criterion_group_bench, Benchmarker, SIZES};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use velocipher_threefish::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt},
    Key, Threefish512, Tweak, BLOCK_SIZE, STRATEGIES,
};

fn bench_threefish(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("threefish512");

    for strategy in STRATEGIES.supported() {
        for size in SIZES {
            let mut buf = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as u64));

            let cipher =
                Threefish512::with_strategy(&Key::default(), &Tweak::default(), strategy).unwrap();

            group.bench_function(BenchmarkId::new(format!("{strategy}-encrypt"), size), |b| {
                b.iter(|| {
                    for block in buf.chunks_exact_mut(BLOCK_SIZE) {
                        cipher.encrypt_block(GenericArray::from_mut_slice(block));
                    }
                });
            });

            group.bench_function(BenchmarkId::new(format!("{strategy}-decrypt"), size), |b| {
                b.iter(|| {
                    for block in buf.chunks_exact_mut(BLOCK_SIZE) {
                        cipher.decrypt_block(GenericArray::from_mut_slice(block));
                    }
                });
            });
        }
    }

    group.finish();
}

criterion_group_bench!(benches_threefish, bench_threefish);
criterion_main!(benches_threefish);
