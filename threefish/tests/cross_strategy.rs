//! Every backend the CPU supports must match the portable rounds.

use cipher::{Block, BlockDecrypt, BlockEncrypt};
use velocipher_threefish::{
    Key, Strategy, Threefish512, Tweak, UnsupportedStrategy, BLOCK_SIZE, STRATEGIES,
};

fn key(seed: u8) -> Key {
    let mut key = Key::default();
    for (i, b) in key.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(seed).wrapping_add(seed);
    }
    key
}

fn tweak(seed: u8) -> Tweak {
    let mut tweak = Tweak::default();
    for (i, b) in tweak.iter_mut().enumerate() {
        *b = (i as u8) ^ seed;
    }
    tweak
}

fn blocks(n: usize) -> Vec<Block<Threefish512>> {
    (0..n)
        .map(|i| {
            let mut bytes = [0u8; BLOCK_SIZE];
            for (j, b) in bytes.iter_mut().enumerate() {
                *b = (i * 31 + j * 7) as u8;
            }
            Block::<Threefish512>::clone_from_slice(&bytes)
        })
        .collect()
}

fn cipher(seed: u8, strategy: Strategy) -> Threefish512 {
    let c = Threefish512::with_strategy(&key(seed), &tweak(seed), strategy).unwrap();
    assert_eq!(c.strategy(), strategy);
    c
}

#[test]
fn soft_is_always_listed() {
    assert!(STRATEGIES.supported().any(|s| s == Strategy::Soft));
}

#[test]
fn backends_agree_with_soft() {
    for seed in [0u8, 1, 0x5c, 0xff] {
        let soft = cipher(seed, Strategy::Soft);
        let mut expected = blocks(5);
        soft.encrypt_blocks(&mut expected);

        for strategy in STRATEGIES.supported() {
            let c = cipher(seed, strategy);
            let mut out = blocks(5);
            c.encrypt_blocks(&mut out);
            assert_eq!(out, expected, "{strategy} encrypt diverges for seed {seed}");

            c.decrypt_blocks(&mut out);
            assert_eq!(out, blocks(5), "{strategy} decrypt diverges for seed {seed}");
        }
    }
}

#[test]
fn backends_decrypt_each_other() {
    let soft = cipher(3, Strategy::Soft);
    for strategy in STRATEGIES.supported() {
        let c = cipher(3, strategy);
        let mut b = blocks(3);
        c.encrypt_blocks(&mut b);
        soft.decrypt_blocks(&mut b);
        assert_eq!(b, blocks(3), "soft cannot decrypt {strategy} output");
    }
}

#[test]
fn unsupported_strategy_is_rejected() {
    for strategy in Strategy::ALL {
        if STRATEGIES.supported().any(|s| s == strategy) {
            continue;
        }
        let err = Threefish512::with_strategy(&key(1), &tweak(1), strategy).unwrap_err();
        assert_eq!(err, UnsupportedStrategy(strategy));
    }
}

#[test]
fn default_uses_cached_strategy() {
    let c = Threefish512::new_with_tweak(&key(1), &tweak(1));
    assert_eq!(c.strategy(), STRATEGIES.get());
}
