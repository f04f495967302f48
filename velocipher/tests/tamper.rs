//! Authenticated algorithms reject every single-bit modification.

use velocipher::{Algorithm, Error};

const AEADS: [Algorithm; 3] = [
    Algorithm::AesGcm,
    Algorithm::ChaCha20Poly1305,
    Algorithm::XChaCha20Poly1305,
];

#[test]
fn every_bit_flip_is_detected() {
    for algorithm in AEADS {
        let key = algorithm.generate_key().unwrap();
        let framed = algorithm.encrypt(b"the quick brown fox jumps", &key).unwrap();

        for bit in 0..framed.len() * 8 {
            let mut tampered = framed.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert!(
                matches!(
                    algorithm.decrypt(&tampered, &key),
                    Err(Error::AuthenticationFailed)
                ),
                "{algorithm}: flipped bit {bit} was accepted"
            );
        }
    }
}

#[test]
fn truncation_is_detected() {
    for algorithm in AEADS {
        let key = algorithm.generate_key().unwrap();
        let framed = algorithm.encrypt(&[7u8; 100], &key).unwrap();
        for cut in [1, 16, 50] {
            assert!(
                algorithm.decrypt(&framed[..framed.len() - cut], &key).is_err(),
                "{algorithm}: truncated by {cut}"
            );
        }
    }
}

#[test]
fn unauthenticated_algorithms_accept_modified_bodies() {
    for algorithm in [Algorithm::Salsa20, Algorithm::Threefish512] {
        let key = algorithm.generate_key().unwrap();
        let pt = vec![0u8; 64];
        let mut framed = algorithm.encrypt(&pt, &key).unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 1;
        let recovered = algorithm.decrypt(&framed, &key).unwrap();
        assert_ne!(recovered, pt, "{algorithm}");
    }
}
