//! Behaviour of the public block cipher API.

use cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};
use velocipher_threefish::{Key, Strategy, Threefish512, Tweak, BLOCK_SIZE};

fn key() -> Key {
    let mut key = Key::default();
    for (i, b) in key.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(3).wrapping_add(1);
    }
    key
}

fn block(fill: u8) -> Block<Threefish512> {
    Block::<Threefish512>::clone_from_slice(&[fill; BLOCK_SIZE])
}

#[test]
fn encrypt_then_decrypt() {
    let cipher = Threefish512::new_with_tweak(&key(), &Tweak::from([9u8; 16]));
    let plain = block(0xa5);
    let mut b = plain.clone();
    cipher.encrypt_block(&mut b);
    assert_ne!(b, plain);
    cipher.decrypt_block(&mut b);
    assert_eq!(b, plain);
}

#[test]
fn key_init_uses_zero_tweak() {
    let a = Threefish512::new(&key());
    let b = Threefish512::new_with_tweak(&key(), &Tweak::default());
    let mut x = block(1);
    let mut y = block(1);
    a.encrypt_block(&mut x);
    b.encrypt_block(&mut y);
    assert_eq!(x, y);
}

#[test]
fn tweak_changes_ciphertext() {
    let a = Threefish512::new_with_tweak(&key(), &Tweak::default());
    let mut tweak = Tweak::default();
    tweak[15] = 1;
    let b = Threefish512::new_with_tweak(&key(), &tweak);
    let mut x = block(0);
    let mut y = block(0);
    a.encrypt_block(&mut x);
    b.encrypt_block(&mut y);
    assert_ne!(x, y);
}

#[test]
fn key_changes_ciphertext() {
    let mut other = key();
    other[0] ^= 0x80;
    let a = Threefish512::new(&key());
    let b = Threefish512::new(&other);
    let mut x = block(0);
    let mut y = block(0);
    a.encrypt_block(&mut x);
    b.encrypt_block(&mut y);
    assert_ne!(x, y);
}

#[test]
fn many_blocks_at_once() {
    let cipher = Threefish512::new_with_tweak(&key(), &Tweak::from([0x33u8; 16]));
    let plain: Vec<_> = (0..9u8).map(block).collect();

    let mut blocks = plain.clone();
    cipher.encrypt_blocks(&mut blocks);
    for (i, (c, p)) in blocks.iter().zip(&plain).enumerate() {
        let mut single = p.clone();
        cipher.encrypt_block(&mut single);
        assert_eq!(*c, single, "block {i} differs from single-block encryption");
    }

    cipher.decrypt_blocks(&mut blocks);
    assert_eq!(blocks, plain);
}

#[test]
fn encrypt_is_deterministic() {
    let cipher = Threefish512::new(&key());
    let mut x = block(7);
    let mut y = block(7);
    cipher.encrypt_block(&mut x);
    cipher.clone().encrypt_block(&mut y);
    assert_eq!(x, y);
}

#[test]
fn soft_strategy_is_always_accepted() {
    let cipher = Threefish512::with_strategy(&key(), &Tweak::default(), Strategy::Soft).unwrap();
    assert_eq!(cipher.strategy(), Strategy::Soft);
}

#[test]
fn schedule_is_exposed() {
    let cipher = Threefish512::new(&key());
    assert_eq!(cipher.schedule().subkeys().len(), velocipher_threefish::SUBKEYS);
}
