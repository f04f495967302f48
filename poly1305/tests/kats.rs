//! Known-answer tests from RFC 8439 §2.5.2 and Appendix A.3.

use hex_literal::hex;
use velocipher_poly1305::{mac, Poly1305, TagMismatch, BLOCK_SIZE};

#[test]
fn rfc8439_2_5_2() {
    let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let tag = mac(&key, b"Cryptographic Forum Research Group");
    assert_eq!(tag, hex!("a8061dc1305136c6c22b8baf0c0127a9"));
}

#[test]
fn a3_vector_1_zero_key() {
    assert_eq!(mac(&[0; 32], &[0; 64]), [0; 16]);
}

#[test]
fn a3_vector_5_h_reaches_p() {
    let mut key = [0u8; 32];
    key[0] = 2;
    assert_eq!(mac(&key, &[0xff; 16]), hex!("03000000000000000000000000000000"));
}

#[test]
fn a3_vector_6_s_overflows() {
    let mut key = [0xffu8; 32];
    key[..16].fill(0);
    key[0] = 2;
    let mut data = [0u8; 16];
    data[0] = 2;
    assert_eq!(mac(&key, &data), hex!("03000000000000000000000000000000"));
}

#[test]
fn a3_vector_7_carry_chain() {
    let mut key = [0u8; 32];
    key[0] = 1;
    let data = hex!(
        "ffffffffffffffffffffffffffffffff"
        "f0ffffffffffffffffffffffffffffff"
        "11000000000000000000000000000000"
    );
    assert_eq!(mac(&key, &data), hex!("05000000000000000000000000000000"));
}

#[test]
fn a3_vector_8_reduces_to_zero() {
    let mut key = [0u8; 32];
    key[0] = 1;
    let data = hex!(
        "ffffffffffffffffffffffffffffffff"
        "fbfefefefefefefefefefefefefefefe"
        "01010101010101010101010101010101"
    );
    assert_eq!(mac(&key, &data), [0; 16]);
}

#[test]
fn a3_vector_9_h_near_p() {
    let mut key = [0u8; 32];
    key[0] = 2;
    let data = hex!("fdffffffffffffffffffffffffffffff");
    assert_eq!(mac(&key, &data), hex!("faffffffffffffffffffffffffffffff"));
}

#[test]
fn verify_accepts_and_rejects() {
    let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let msg = b"Cryptographic Forum Research Group";
    let good = hex!("a8061dc1305136c6c22b8baf0c0127a9");

    let mut poly = Poly1305::new(&key);
    poly.update(msg);
    assert_eq!(poly.verify(&good), Ok(()));

    for bit in 0..128 {
        let mut bad = good;
        bad[bit / 8] ^= 1 << (bit % 8);
        let mut poly = Poly1305::new(&key);
        poly.update(msg);
        assert_eq!(poly.verify(&bad), Err(TagMismatch), "bit {bit} not detected");
    }
}

#[test]
fn byte_at_a_time() {
    let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let mut poly = Poly1305::new(&key);
    for b in b"Cryptographic Forum Research Group" {
        poly.update(core::slice::from_ref(b));
    }
    assert_eq!(poly.finalize(), hex!("a8061dc1305136c6c22b8baf0c0127a9"));
}

#[test]
fn padded_blocks_are_full_blocks() {
    let key = [0x11u8; 32];
    let data = [0xabu8; 20];

    let mut padded = Poly1305::new(&key);
    padded.update_padded(&data);

    let mut manual = [0u8; 2 * BLOCK_SIZE];
    manual[..20].copy_from_slice(&data);
    assert_eq!(padded.finalize(), mac(&key, &manual));
}
