//! Every backend the CPU supports must produce the portable keystream.

use cipher::{StreamCipher, StreamCipherCoreWrapper, StreamCipherSeek};
use velocipher_chacha20::{
    ChaChaCore, Key, Nonce, Strategy, UnsupportedStrategy, XChaChaCore, XNonce, STRATEGIES,
};

const LENGTHS: &[usize] = &[0, 1, 17, 63, 64, 65, 127, 128, 255, 256, 257, 511, 1000, 4103];
const OFFSETS: &[u64] = &[0, 1, 63, 64, 200, 64 * 5 + 3];

fn key() -> Key {
    let mut key = Key::default();
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    key
}

fn nonce() -> Nonce {
    Nonce::from([0, 0, 0, 9, 0, 0, 0, 0x4a, 0, 0, 0, 0])
}

fn keystream(strategy: Strategy, offset: u64, len: usize) -> Vec<u8> {
    let core = ChaChaCore::with_strategy(&key(), &nonce(), strategy).unwrap();
    assert_eq!(core.strategy(), strategy);
    let mut cipher = StreamCipherCoreWrapper::from_core(core);
    cipher.seek(offset);
    let mut buf = vec![0u8; len];
    cipher.apply_keystream(&mut buf);
    buf
}

#[test]
fn soft_is_always_listed() {
    assert!(STRATEGIES.supported().any(|s| s == Strategy::Soft));
}

#[test]
fn backends_agree_with_soft() {
    for strategy in STRATEGIES.supported() {
        for &offset in OFFSETS {
            for &len in LENGTHS {
                assert_eq!(
                    keystream(strategy, offset, len),
                    keystream(Strategy::Soft, offset, len),
                    "{strategy} diverges at offset {offset} length {len}",
                );
            }
        }
    }
}

#[test]
fn backends_agree_across_split_calls() {
    let expected = keystream(Strategy::Soft, 0, 1024);
    for strategy in STRATEGIES.supported() {
        let core = ChaChaCore::with_strategy(&key(), &nonce(), strategy).unwrap();
        let mut cipher = StreamCipherCoreWrapper::from_core(core);
        let mut buf = vec![0u8; 1024];
        for chunk in buf.chunks_mut(100) {
            cipher.apply_keystream(chunk);
        }
        assert_eq!(buf, expected, "{strategy} diverges on chunked input");
    }
}

#[test]
fn backends_agree_across_counter_carry() {
    let start = 64 * (u64::from(u32::MAX) - 5);
    for strategy in STRATEGIES.supported() {
        assert_eq!(
            keystream(strategy, start, 64 * 12),
            keystream(Strategy::Soft, start, 64 * 12),
            "{strategy} diverges across the 32-bit counter boundary",
        );
    }
}

#[test]
fn carry_lands_in_first_nonce_word() {
    // block 2^32 under a zero nonce equals block 0 under a nonce whose first
    // word is 1
    let mut nonce = Nonce::default();
    nonce[0] = 1;
    for strategy in STRATEGIES.supported() {
        let mut carried = StreamCipherCoreWrapper::from_core(
            ChaChaCore::with_strategy(&key(), &Nonce::default(), strategy).unwrap(),
        );
        carried.seek(64 * (1u64 << 32));
        let mut a = [0u8; 64];
        carried.apply_keystream(&mut a);

        let mut direct = StreamCipherCoreWrapper::from_core(
            ChaChaCore::with_strategy(&key(), &nonce, strategy).unwrap(),
        );
        let mut b = [0u8; 64];
        direct.apply_keystream(&mut b);

        assert_eq!(a, b, "{strategy}");
    }
}

#[test]
fn seek_keeps_first_nonce_word() {
    let nonce = Nonce::from([0x24; 12]);
    for strategy in STRATEGIES.supported() {
        let mut cipher = StreamCipherCoreWrapper::from_core(
            ChaChaCore::with_strategy(&key(), &nonce, strategy).unwrap(),
        );
        assert_eq!(cipher.current_pos::<u64>(), 0, "{strategy}");

        let mut expected = [0u8; 200];
        cipher.apply_keystream(&mut expected);
        assert_eq!(cipher.current_pos::<u64>(), 200, "{strategy}");

        cipher.seek(0u32);
        let mut rewound = [0u8; 200];
        cipher.apply_keystream(&mut rewound);
        assert_eq!(rewound, expected, "{strategy} after seeking to 0");

        cipher.seek(70u32);
        let mut tail = [0u8; 130];
        cipher.apply_keystream(&mut tail);
        assert_eq!(tail[..], expected[70..], "{strategy} after seeking to 70");
    }
}

#[test]
fn xchacha_backends_agree() {
    let iv = XNonce::from([0x42; 24]);
    let expected = {
        let core = XChaChaCore::with_strategy(&key(), &iv, Strategy::Soft).unwrap();
        let mut cipher = StreamCipherCoreWrapper::from_core(core);
        let mut buf = vec![0u8; 777];
        cipher.apply_keystream(&mut buf);
        buf
    };
    for strategy in STRATEGIES.supported() {
        let core = XChaChaCore::with_strategy(&key(), &iv, strategy).unwrap();
        assert_eq!(core.strategy(), strategy);
        let mut cipher = StreamCipherCoreWrapper::from_core(core);
        let mut buf = vec![0u8; 777];
        cipher.apply_keystream(&mut buf);
        assert_eq!(buf, expected, "{strategy}");
    }
}

#[test]
fn unsupported_strategy_is_rejected() {
    let supported: Vec<_> = STRATEGIES.supported().collect();
    for strategy in Strategy::ALL {
        if supported.contains(&strategy) {
            continue;
        }
        assert_eq!(
            ChaChaCore::with_strategy(&key(), &nonce(), strategy).unwrap_err(),
            UnsupportedStrategy(strategy)
        );
    }
}

#[test]
fn default_construction_uses_cached_strategy() {
    use cipher::KeyIvInit;

    let core = ChaChaCore::new(&key(), &nonce());
    assert_eq!(core.strategy(), STRATEGIES.get());
}
