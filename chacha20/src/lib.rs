//! Implementation of the [ChaCha20] stream cipher (RFC 8439) and the
//! extended-nonce [`XChaCha20`] construction.
//!
//! Cipher functionality is accessed using traits from the re-exported
//! [`cipher`] crate.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic! Pair it with a MAC
//! (for example Poly1305) unless ciphertext integrity is ensured elsewhere.
//!
//! # Backends
//!
//! The core function is implemented four times: a portable version, and
//! SSE2, AVX2 and NEON versions which compute four blocks per call. The
//! backend is chosen once per cipher instance from the process-wide
//! [`STRATEGIES`] cache, or pinned explicitly with
//! [`ChaChaCore::with_strategy`]. All backends produce identical keystream.
//!
//! # Counter
//!
//! The block counter occupies state word 12 and carries into word 13 (the
//! first nonce word) on overflow, i.e. words 12 and 13 form one 64-bit
//! little-endian counter. Below 2^32 blocks this is exactly RFC 8439.
//! Seek positions are relative to the nonce's own first word, so seeking
//! never rewrites the nonce.
//!
//! # Example
//! ```
//! use velocipher_chacha20::ChaCha20;
//! use velocipher_chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
//! use hex_literal::hex;
//!
//! let key = [0x42; 32];
//! let nonce = [0x24; 12];
//! let plaintext = hex!("00010203 04050607 08090A0B 0C0D0E0F");
//!
//! let mut cipher = ChaCha20::new(&key.into(), &nonce.into());
//! let mut buffer = plaintext;
//! cipher.apply_keystream(&mut buffer);
//! assert_ne!(buffer, plaintext);
//!
//! cipher.seek(0u32);
//! cipher.apply_keystream(&mut buffer);
//! assert_eq!(buffer, plaintext);
//! ```
//!
//! [ChaCha20]: https://tools.ietf.org/html/rfc8439

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use cipher;
pub use velocipher_core::{Strategy, UnsupportedStrategy};

use cipher::{
    consts::{U12, U32, U64},
    generic_array::GenericArray,
    BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, StreamCipherCore, StreamCipherCoreWrapper,
    StreamCipherSeekCore, StreamClosure,
};
use velocipher_core::{endian, StrategyCache};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

mod backends;
mod xchacha;

pub use xchacha::{hchacha, XChaCha20, XChaChaCore, XNonce};

/// Size of a ChaCha20 block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Number of 32-bit words in the ChaCha20 state.
pub const STATE_WORDS: usize = 16;

/// Number of double rounds (column round + diagonal round) in ChaCha20.
const DOUBLE_ROUNDS: usize = 10;

/// State initialization constant ("expand 32-byte k")
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Key type used by ChaCha20 and XChaCha20.
pub type Key = GenericArray<u8, U32>;

/// Nonce type used by ChaCha20.
pub type Nonce = GenericArray<u8, U12>;

/// ChaCha20 stream cipher (RFC 8439 version with 96-bit nonce).
pub type ChaCha20 = StreamCipherCoreWrapper<ChaChaCore>;

/// Process-wide backend selection for the ChaCha family.
pub static STRATEGIES: StrategyCache = StrategyCache::new(
    "chacha20",
    &[
        Strategy::Avx2,
        Strategy::Neon,
        Strategy::Sse2,
        Strategy::Soft,
    ],
);

/// The ChaCha20 core function.
pub struct ChaChaCore {
    /// Internal state of the core function
    state: [u32; STATE_WORDS],
    /// Backend resolved when the core was created
    strategy: Strategy,
    /// Word 13 at construction; block positions are counted from here
    base: u64,
}

impl ChaChaCore {
    /// Create a core which always runs on `strategy`.
    ///
    /// # Errors
    /// Returns [`UnsupportedStrategy`] if the running CPU cannot execute the
    /// requested backend.
    pub fn with_strategy(
        key: &Key,
        nonce: &Nonce,
        strategy: Strategy,
    ) -> Result<Self, UnsupportedStrategy> {
        if !STRATEGIES.supported().any(|s| s == strategy) {
            return Err(UnsupportedStrategy(strategy));
        }
        Ok(Self::from_parts(key, nonce, strategy))
    }

    /// Backend this core dispatches to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn from_parts(key: &Key, nonce: &Nonce, strategy: Strategy) -> Self {
        let mut state = [0u32; STATE_WORDS];
        state[..4].copy_from_slice(&CONSTANTS);
        endian::read_u32_le(key, &mut state[4..12]);
        endian::read_u32_le(nonce, &mut state[13..16]);
        let base = u64::from(state[13]) << 32;

        Self {
            state,
            strategy,
            base,
        }
    }
}

impl core::fmt::Debug for ChaChaCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChaChaCore")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl KeySizeUser for ChaChaCore {
    type KeySize = U32;
}

impl IvSizeUser for ChaChaCore {
    type IvSize = U12;
}

impl BlockSizeUser for ChaChaCore {
    type BlockSize = U64;
}

impl KeyIvInit for ChaChaCore {
    #[inline]
    fn new(key: &Key, iv: &Nonce) -> Self {
        Self::from_parts(key, iv, STRATEGIES.get())
    }
}

impl StreamCipherCore for ChaChaCore {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        (u64::MAX - self.get_block_pos()).try_into().ok()
    }

    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        match self.strategy {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Avx2 => unsafe { backends::avx2::inner(&mut self.state, f) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Sse2 => unsafe { backends::sse2::inner(&mut self.state, f) },
            #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
            Strategy::Neon => unsafe { backends::neon::inner(&mut self.state, f) },
            _ => f.call(&mut backends::soft::Backend(self)),
        }
    }
}

impl StreamCipherSeekCore for ChaChaCore {
    type Counter = u64;

    #[inline(always)]
    fn get_block_pos(&self) -> u64 {
        let counter = u64::from(self.state[12]) | (u64::from(self.state[13]) << 32);
        counter.wrapping_sub(self.base)
    }

    #[inline(always)]
    fn set_block_pos(&mut self, pos: u64) {
        let counter = self.base.wrapping_add(pos);
        self.state[12] = counter as u32;
        self.state[13] = (counter >> 32) as u32;
    }
}

#[cfg(feature = "zeroize")]
impl Drop for ChaChaCore {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for ChaChaCore {}

/// The ChaCha20 quarter round function
#[inline]
pub(crate) fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// Column round followed by diagonal round.
#[inline(always)]
pub(crate) fn double_round(state: &mut [u32; STATE_WORDS]) {
    // column rounds
    quarter_round(0, 4, 8, 12, state);
    quarter_round(1, 5, 9, 13, state);
    quarter_round(2, 6, 10, 14, state);
    quarter_round(3, 7, 11, 15, state);

    // diagonal rounds
    quarter_round(0, 5, 10, 15, state);
    quarter_round(1, 6, 11, 12, state);
    quarter_round(2, 7, 8, 13, state);
    quarter_round(3, 4, 9, 14, state);
}
