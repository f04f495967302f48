//! Framed output is independent of the backend serving it.
//!
//! Forcing a strategy changes process-wide state, so every test here holds
//! `LOCK` and resets the caches it touched.

use std::sync::Mutex;
use velocipher::{Algorithm, Strategy};
use velocipher_core::StrategyCache;

static LOCK: Mutex<()> = Mutex::new(());

fn cache(algorithm: Algorithm) -> &'static StrategyCache {
    match algorithm {
        Algorithm::ChaCha20Poly1305 | Algorithm::XChaCha20Poly1305 => {
            &velocipher_chacha20::STRATEGIES
        }
        Algorithm::Salsa20 => &velocipher_salsa20::STRATEGIES,
        Algorithm::Threefish512 => &velocipher_threefish::STRATEGIES,
        Algorithm::AesGcm | Algorithm::Rc2 => unreachable!("no strategy cache"),
    }
}

const DISPATCHED: [Algorithm; 4] = [
    Algorithm::ChaCha20Poly1305,
    Algorithm::XChaCha20Poly1305,
    Algorithm::Salsa20,
    Algorithm::Threefish512,
];

#[test]
fn every_strategy_decrypts_every_other() {
    let _guard = LOCK.lock().unwrap();

    for algorithm in DISPATCHED {
        let cache = cache(algorithm);
        let key = algorithm.generate_key().unwrap();
        let plaintext: Vec<u8> = (0..777u32).map(|i| (i * 13) as u8).collect();

        let supported: Vec<Strategy> = cache.supported().collect();
        for &sealer in &supported {
            cache.force(sealer).unwrap();
            assert_eq!(algorithm.strategy(), Some(sealer));
            let framed = algorithm.encrypt(&plaintext, &key).unwrap();

            for &opener in &supported {
                cache.force(opener).unwrap();
                assert_eq!(
                    algorithm.decrypt(&framed, &key).unwrap(),
                    plaintext,
                    "{algorithm}: sealed with {sealer}, opened with {opener}"
                );
            }
        }
        cache.reset();
    }
}

#[test]
fn reset_restores_probed_choice() {
    let _guard = LOCK.lock().unwrap();

    for algorithm in DISPATCHED {
        let cache = cache(algorithm);
        cache.reset();
        let probed = cache.get();

        cache.force(Strategy::Soft).unwrap();
        assert_eq!(algorithm.strategy(), Some(Strategy::Soft));

        cache.reset();
        assert_eq!(algorithm.strategy(), Some(probed));
    }
}

#[test]
fn probed_choice_has_highest_priority() {
    let _guard = LOCK.lock().unwrap();

    for algorithm in DISPATCHED {
        let cache = cache(algorithm);
        cache.reset();
        let best = cache.supported().max_by_key(|s| s.priority()).unwrap();
        assert_eq!(cache.get(), best, "{algorithm}");
    }
}
