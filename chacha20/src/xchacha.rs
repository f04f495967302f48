//! XChaCha is an extended nonce variant of ChaCha

use cipher::{
    consts::{U16, U24, U32, U64},
    generic_array::GenericArray,
    BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, StreamCipherCore, StreamCipherCoreWrapper,
    StreamCipherSeekCore, StreamClosure,
};
use velocipher_core::endian;

use crate::{
    double_round, ChaChaCore, Key, Nonce, Strategy, UnsupportedStrategy, CONSTANTS,
    DOUBLE_ROUNDS, STATE_WORDS, STRATEGIES,
};

#[cfg(feature = "zeroize")]
use zeroize::ZeroizeOnDrop;

/// Nonce type used by XChaCha20.
pub type XNonce = GenericArray<u8, U24>;

/// XChaCha is a ChaCha20 variant with an extended 192-bit (24-byte) nonce.
///
/// The first 16 nonce bytes and the key are run through [`hchacha`] to derive
/// a subkey; ChaCha20 then runs under that subkey with the nonce
/// `0x00000000 || nonce[16..24]`.
///
/// The construction is documented in an (expired) IETF draft:
///
/// <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-xchacha>
pub type XChaCha20 = StreamCipherCoreWrapper<XChaChaCore>;

/// The XChaCha core function.
#[derive(Debug)]
pub struct XChaChaCore(ChaChaCore);

impl XChaChaCore {
    /// Create a core which always runs on `strategy`.
    ///
    /// # Errors
    /// Returns [`UnsupportedStrategy`] if the running CPU cannot execute the
    /// requested backend.
    pub fn with_strategy(
        key: &Key,
        iv: &XNonce,
        strategy: Strategy,
    ) -> Result<Self, UnsupportedStrategy> {
        let (subkey, nonce) = derive(key, iv);
        ChaChaCore::with_strategy(&subkey, &nonce, strategy).map(Self)
    }

    /// Backend this core dispatches to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.0.strategy()
    }
}

fn derive(key: &Key, iv: &XNonce) -> (Key, Nonce) {
    let subkey = hchacha(key, GenericArray::from_slice(&iv[..16]));

    let mut nonce = Nonce::default();
    nonce[4..].copy_from_slice(&iv[16..]);
    (subkey, nonce)
}

impl KeySizeUser for XChaChaCore {
    type KeySize = U32;
}

impl IvSizeUser for XChaChaCore {
    type IvSize = U24;
}

impl BlockSizeUser for XChaChaCore {
    type BlockSize = U64;
}

impl KeyIvInit for XChaChaCore {
    fn new(key: &Key, iv: &XNonce) -> Self {
        let (subkey, nonce) = derive(key, iv);
        Self(ChaChaCore::from_parts(&subkey, &nonce, STRATEGIES.get()))
    }
}

impl StreamCipherCore for XChaChaCore {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        self.0.remaining_blocks()
    }

    #[inline(always)]
    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        self.0.process_with_backend(f);
    }
}

impl StreamCipherSeekCore for XChaChaCore {
    type Counter = u64;

    #[inline(always)]
    fn get_block_pos(&self) -> u64 {
        self.0.get_block_pos()
    }

    #[inline(always)]
    fn set_block_pos(&mut self, pos: u64) {
        self.0.set_block_pos(pos);
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for XChaChaCore {}

/// The HChaCha function: the ChaCha permutation without the final feed-forward,
/// returning words 0..4 and 12..16 as a 256-bit subkey.
///
/// Input is `constants || key || input`, where `input` is 16 bytes (in
/// XChaCha, the first 16 bytes of the extended nonce).
#[must_use]
pub fn hchacha(key: &Key, input: &GenericArray<u8, U16>) -> Key {
    let mut state = [0u32; STATE_WORDS];
    state[..4].copy_from_slice(&CONSTANTS);
    endian::read_u32_le(key, &mut state[4..12]);
    endian::read_u32_le(input, &mut state[12..16]);

    for _ in 0..DOUBLE_ROUNDS {
        double_round(&mut state);
    }

    let mut output = Key::default();
    endian::write_u32_le(&state[..4], &mut output[..16]);
    endian::write_u32_le(&state[12..], &mut output[16..]);
    output
}

#[cfg(test)]
mod hchacha20_tests {
    use super::*;
    use hex_literal::hex;

    /// Test vectors from:
    /// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-xchacha#section-2.2.1
    #[test]
    fn test_vector() {
        const KEY: [u8; 32] = hex!(
            "000102030405060708090a0b0c0d0e0f"
            "101112131415161718191a1b1c1d1e1f"
        );

        const INPUT: [u8; 16] = hex!("000000090000004a0000000031415927");

        const OUTPUT: [u8; 32] = hex!(
            "82413b4227b27bfed30e42508a877d73"
            "a0f9e4d58a74a853c12ec41326d3ecdc"
        );

        let actual = hchacha(&KEY.into(), &INPUT.into());
        assert_eq!(actual.as_slice(), &OUTPUT);
    }
}
