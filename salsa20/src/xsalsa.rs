//! XSalsa20 is an extended nonce variant of Salsa20

use crate::{
    double_round, initial_state, Key, Nonce, SalsaCore, Strategy, UnsupportedStrategy, XNonce,
    DOUBLE_ROUNDS, STRATEGIES,
};
use cipher::{
    consts::{U16, U24, U32, U64},
    generic_array::GenericArray,
    BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, StreamCipherCore, StreamCipherCoreWrapper,
    StreamCipherSeekCore, StreamClosure,
};

#[cfg(feature = "zeroize")]
use zeroize::ZeroizeOnDrop;

/// XSalsa20 is a Salsa20 variant with an extended 192-bit (24-byte) nonce.
///
/// Based on the paper "Extending the Salsa20 Nonce":
///
/// <https://cr.yp.to/snuffle/xsalsa-20081128.pdf>
pub type XSalsa20 = StreamCipherCoreWrapper<XSalsaCore>;

/// The XSalsa core function.
#[derive(Debug)]
pub struct XSalsaCore(SalsaCore);

impl XSalsaCore {
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
        SalsaCore::with_strategy(&subkey, &nonce, strategy).map(Self)
    }

    /// Backend this core dispatches to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.0.strategy()
    }
}

fn derive(key: &Key, iv: &XNonce) -> (Key, Nonce) {
    let subkey = hsalsa(key, GenericArray::from_slice(&iv[..16]));
    (subkey, *Nonce::from_slice(&iv[16..]))
}

impl KeySizeUser for XSalsaCore {
    type KeySize = U32;
}

impl IvSizeUser for XSalsaCore {
    type IvSize = U24;
}

impl BlockSizeUser for XSalsaCore {
    type BlockSize = U64;
}

impl KeyIvInit for XSalsaCore {
    #[inline]
    fn new(key: &Key, iv: &XNonce) -> Self {
        let (subkey, nonce) = derive(key, iv);
        XSalsaCore(SalsaCore::from_parts(&subkey, &nonce, STRATEGIES.get()))
    }
}

impl StreamCipherCore for XSalsaCore {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        self.0.remaining_blocks()
    }

    #[inline(always)]
    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        self.0.process_with_backend(f);
    }
}

impl StreamCipherSeekCore for XSalsaCore {
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
impl ZeroizeOnDrop for XSalsaCore {}

/// The HSalsa20 function defined in the paper "Extending the Salsa20 nonce"
///
/// <https://cr.yp.to/snuffle/xsalsa-20110204.pdf>
///
/// The 16-byte input fills the nonce and counter words; the output is the
/// diagonal and the input words after 20 rounds, without feed-forward.
#[must_use]
pub fn hsalsa(key: &Key, input: &GenericArray<u8, U16>) -> Key {
    let mut state = initial_state(key, input);

    for _ in 0..DOUBLE_ROUNDS {
        double_round(&mut state);
    }

    let mut output = Key::default();
    let key_idx: [usize; 8] = [0, 5, 10, 15, 6, 7, 8, 9];

    for (chunk, &idx) in output.chunks_exact_mut(4).zip(key_idx.iter()) {
        chunk.copy_from_slice(&state[idx].to_le_bytes());
    }

    output
}
