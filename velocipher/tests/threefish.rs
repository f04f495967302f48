//! Threefish-512 framing edge cases.

use velocipher::{Error, FramedCipher, Threefish512};

fn key() -> Vec<u8> {
    (0..64u8).collect()
}

#[test]
fn block_aligned_plaintext_gets_no_padding() {
    for blocks in 1..=4 {
        let pt = vec![0x40u8; 64 * blocks];
        let framed = Threefish512.encrypt(&pt, &key()).unwrap();
        assert_eq!(framed.len(), 20 + pt.len());
        assert_eq!(Threefish512.decrypt(&framed, &key()).unwrap(), pt);
    }
}

#[test]
fn trailing_byte_equal_to_pad_value_survives() {
    // the last plaintext byte looks like a padding length
    let mut pt = vec![0u8; 64];
    pt[63] = 1;
    let framed = Threefish512.encrypt(&pt, &key()).unwrap();
    assert_eq!(Threefish512.decrypt(&framed, &key()).unwrap(), pt);

    let pt = vec![63u8; 1];
    let framed = Threefish512.encrypt(&pt, &key()).unwrap();
    assert_eq!(Threefish512.decrypt(&framed, &key()).unwrap(), pt);
}

#[test]
fn single_byte_gets_63_bytes_of_padding() {
    let framed = Threefish512.encrypt(b"z", &key()).unwrap();
    assert_eq!(framed.len(), 20 + 64);
    assert_eq!(&framed[16..20], &[1, 0, 0, 0]);
    assert_eq!(Threefish512.decrypt(&framed, &key()).unwrap(), b"z");
}

#[test]
fn length_field_must_match_body() {
    let framed = Threefish512.encrypt(&[5u8; 100], &key()).unwrap();

    for bad in [0u32, 64, 129, 1000] {
        let mut tampered = framed.clone();
        tampered[16..20].copy_from_slice(&bad.to_le_bytes());
        assert!(
            matches!(
                Threefish512.decrypt(&tampered, &key()),
                Err(Error::MalformedCiphertext(_))
            ),
            "length {bad} accepted"
        );
    }

    // any length that pads to the same two blocks is structurally valid
    let mut shorter = framed.clone();
    shorter[16..20].copy_from_slice(&65u32.to_le_bytes());
    assert_eq!(Threefish512.decrypt(&shorter, &key()).unwrap(), vec![5u8; 65]);
}

#[test]
fn body_must_be_whole_blocks() {
    let framed = Threefish512.encrypt(&[5u8; 100], &key()).unwrap();
    assert!(matches!(
        Threefish512.decrypt(&framed[..framed.len() - 1], &key()),
        Err(Error::MalformedCiphertext(_))
    ));
    assert!(matches!(
        Threefish512.decrypt(&framed[..20], &key()),
        Err(Error::CiphertextTooShort { minimum: 84, actual: 20 })
    ));
}

#[test]
fn tweak_is_random_per_message() {
    let a = Threefish512.encrypt(&[0u8; 64], &key()).unwrap();
    let b = Threefish512.encrypt(&[0u8; 64], &key()).unwrap();
    assert_ne!(a[..16], b[..16]);
    assert_ne!(a[20..], b[20..]);
}
