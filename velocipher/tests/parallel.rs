//! AES-GCM chunked parallel mode.
#![cfg(feature = "parallel")]

use velocipher::{AesGcm, Error, FramedCipher};

const HEADER: usize = 16;
const HMAC: usize = 32;

fn data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn round_trip_multiple_chunks() {
    let key = AesGcm.generate_key().unwrap();
    for (len, chunk) in [(1, 16), (16, 16), (17, 16), (1000, 64), (4096, 1000), (5000, 1 << 20)] {
        let pt = data(len);
        let framed = AesGcm
            .encrypt_parallel_with_chunk_size(&pt, &key, chunk)
            .unwrap();
        let chunks = len.div_ceil(chunk);
        assert_eq!(framed.len(), HEADER + len + 16 * chunks + HMAC);
        assert_eq!(&framed[12..16], &(chunk as u32).to_le_bytes());
        assert_eq!(AesGcm.decrypt_parallel(&framed, &key).unwrap(), pt);
    }
}

#[test]
fn default_chunk_size() {
    let key = AesGcm.generate_key().unwrap();
    let pt = data(3 * velocipher::DEFAULT_CHUNK_SIZE / 2);
    let framed = AesGcm.encrypt_parallel(&pt, &key).unwrap();
    assert_eq!(framed.len(), HEADER + pt.len() + 2 * 16 + HMAC);
    assert_eq!(AesGcm.decrypt_parallel(&framed, &key).unwrap(), pt);
}

#[test]
fn tampering_any_region_fails() {
    let key = AesGcm.generate_key().unwrap();
    let framed = AesGcm
        .encrypt_parallel_with_chunk_size(&data(300), &key, 100)
        .unwrap();

    // master nonce, a chunk body, a chunk tag, the combined HMAC
    for at in [0, HEADER + 150, HEADER + 100 + 5, framed.len() - 1] {
        let mut tampered = framed.clone();
        tampered[at] ^= 0x01;
        assert!(
            matches!(
                AesGcm.decrypt_parallel(&tampered, &key),
                Err(Error::AuthenticationFailed)
            ),
            "byte {at} modification accepted"
        );
    }
}

#[test]
fn reordered_chunks_fail() {
    let key = AesGcm.generate_key().unwrap();
    let framed = AesGcm
        .encrypt_parallel_with_chunk_size(&data(200), &key, 100)
        .unwrap();
    let record = 100 + 16;
    let mut swapped = framed[..HEADER].to_vec();
    swapped.extend_from_slice(&framed[HEADER + record..HEADER + 2 * record]);
    swapped.extend_from_slice(&framed[HEADER..HEADER + record]);
    swapped.extend_from_slice(&framed[framed.len() - HMAC..]);
    assert!(matches!(
        AesGcm.decrypt_parallel(&swapped, &key),
        Err(Error::AuthenticationFailed)
    ));
}

#[test]
fn malformed_framing_is_rejected() {
    let key = AesGcm.generate_key().unwrap();
    let framed = AesGcm
        .encrypt_parallel_with_chunk_size(&data(200), &key, 100)
        .unwrap();

    let mut zero_chunk = framed.clone();
    zero_chunk[12..16].copy_from_slice(&0u32.to_le_bytes());
    assert!(matches!(
        AesGcm.decrypt_parallel(&zero_chunk, &key),
        Err(Error::MalformedCiphertext(_))
    ));

    assert!(matches!(
        AesGcm.decrypt_parallel(&framed[..HEADER + 16 + HMAC], &key),
        Err(Error::CiphertextTooShort { .. })
    ));
}

#[test]
fn invalid_chunk_size_is_rejected() {
    let key = AesGcm.generate_key().unwrap();
    assert!(matches!(
        AesGcm.encrypt_parallel_with_chunk_size(b"abc", &key, 0),
        Err(Error::InvalidChunkSize(0))
    ));
}

#[test]
fn wrong_key_fails() {
    let key = AesGcm.generate_key().unwrap();
    let other = AesGcm.generate_key().unwrap();
    let framed = AesGcm.encrypt_parallel(&data(50), &key).unwrap();
    assert!(matches!(
        AesGcm.decrypt_parallel(&framed, &other),
        Err(Error::AuthenticationFailed)
    ));
}
