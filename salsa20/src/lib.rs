//! Implementation of the [Salsa20] stream cipher and the extended-nonce
//! [`XSalsa20`] construction.
//!
//! Cipher functionality is accessed using traits from the re-exported
//! [`cipher`] crate.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic! Thus ciphertext integrity
//! is not verified, which can lead to serious vulnerabilities!
//!
//! # Diagram
//!
//! Salsa20 alternates column rounds and row rounds, each made of four
//! quarter-rounds over the 4x4 state:
//!
//! ```text
//! c0 k0 k1 k2
//! k3 c1 n0 n1
//! t0 t1 c2 k4
//! k5 k6 k7 c3
//! ```
//!
//! where `c` are the "expand 32-byte k" constants, `k` key words, `n` nonce
//! words and `t` the 64-bit block counter (low word first).
//!
//! # Example
//! ```
//! use velocipher_salsa20::Salsa20;
//! // Import relevant traits
//! use velocipher_salsa20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
//! use hex_literal::hex;
//!
//! let key = [0x42; 32];
//! let nonce = [0x24; 8];
//! let plaintext = hex!("00010203 04050607 08090A0B 0C0D0E0F");
//! let ciphertext = hex!("85843cc5 d58cce7b 5dd3dd04 fa005ded");
//!
//! // Key and IV must be references to the `GenericArray` type.
//! // Here we use the `Into` trait to convert arrays into it.
//! let mut cipher = Salsa20::new(&key.into(), &nonce.into());
//!
//! let mut buffer = plaintext.clone();
//!
//! // apply keystream (encrypt)
//! cipher.apply_keystream(&mut buffer);
//! assert_eq!(buffer, ciphertext);
//!
//! // Salsa ciphers support seeking
//! cipher.seek(0u32);
//!
//! // decrypt ciphertext by applying keystream again
//! cipher.apply_keystream(&mut buffer);
//! assert_eq!(buffer, plaintext);
//! ```
//!
//! The backend (portable, SSE2, AVX2 or NEON) is picked once per cipher
//! instance from [`STRATEGIES`]; all of them produce the same keystream.
//!
//! [Salsa20]: https://en.wikipedia.org/wiki/Salsa20

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use cipher;
pub use velocipher_core::{Strategy, UnsupportedStrategy};

use cipher::{
    consts::{U24, U32, U64, U8},
    generic_array::GenericArray,
    BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, StreamCipherCore, StreamCipherCoreWrapper,
    StreamCipherSeekCore, StreamClosure,
};
use velocipher_core::{endian, StrategyCache};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

mod backends;
mod xsalsa;

pub use xsalsa::{hsalsa, XSalsa20, XSalsaCore};

/// Salsa20/20 stream cipher
pub type Salsa20 = StreamCipherCoreWrapper<SalsaCore>;

/// Key type used by [`Salsa20`] and [`XSalsa20`].
pub type Key = GenericArray<u8, U32>;

/// Nonce type used by [`Salsa20`].
pub type Nonce = GenericArray<u8, U8>;

/// Nonce type used by [`XSalsa20`].
pub type XNonce = GenericArray<u8, U24>;

/// Number of 32-bit words in the Salsa20 state
const STATE_WORDS: usize = 16;

/// Number of double rounds (column round + row round) in Salsa20/20.
const DOUBLE_ROUNDS: usize = 10;

/// State initialization constant ("expand 32-byte k")
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Process-wide backend selection for the Salsa family.
pub static STRATEGIES: StrategyCache = StrategyCache::new(
    "salsa20",
    &[
        Strategy::Avx2,
        Strategy::Neon,
        Strategy::Sse2,
        Strategy::Soft,
    ],
);

/// The Salsa20 core function.
pub struct SalsaCore {
    /// Internal state of the core function
    state: [u32; STATE_WORDS],
    /// Backend resolved when the core was created
    strategy: Strategy,
}

impl SalsaCore {
    /// Create a core which always runs on `strategy`.
    ///
    /// # Errors
    /// Returns [`UnsupportedStrategy`] if the running CPU cannot execute the
    /// requested backend.
    pub fn with_strategy(
        key: &Key,
        iv: &Nonce,
        strategy: Strategy,
    ) -> Result<Self, UnsupportedStrategy> {
        if !STRATEGIES.supported().any(|s| s == strategy) {
            return Err(UnsupportedStrategy(strategy));
        }
        Ok(Self::from_parts(key, iv, strategy))
    }

    /// Backend this core dispatches to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn from_parts(key: &Key, iv: &Nonce, strategy: Strategy) -> Self {
        Self {
            state: initial_state(key, iv),
            strategy,
        }
    }
}

/// Lay out constants, key, nonce and a zero counter in Salsa20 word order.
fn initial_state(key: &Key, iv: &[u8]) -> [u32; STATE_WORDS] {
    let mut state = [0u32; STATE_WORDS];
    state[0] = CONSTANTS[0];
    endian::read_u32_le(&key[..16], &mut state[1..5]);
    state[5] = CONSTANTS[1];
    endian::read_u32_le(iv, &mut state[6..6 + iv.len() / 4]);
    state[10] = CONSTANTS[2];
    endian::read_u32_le(&key[16..], &mut state[11..15]);
    state[15] = CONSTANTS[3];
    state
}

impl core::fmt::Debug for SalsaCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SalsaCore")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl KeySizeUser for SalsaCore {
    type KeySize = U32;
}

impl IvSizeUser for SalsaCore {
    type IvSize = U8;
}

impl BlockSizeUser for SalsaCore {
    type BlockSize = U64;
}

impl KeyIvInit for SalsaCore {
    fn new(key: &Key, iv: &Nonce) -> Self {
        Self::from_parts(key, iv, STRATEGIES.get())
    }
}

impl StreamCipherCore for SalsaCore {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        let rem = u64::MAX - self.get_block_pos();
        rem.try_into().ok()
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

impl StreamCipherSeekCore for SalsaCore {
    type Counter = u64;

    #[inline(always)]
    fn get_block_pos(&self) -> u64 {
        backends::counter(&self.state)
    }

    #[inline(always)]
    fn set_block_pos(&mut self, pos: u64) {
        backends::set_counter(&mut self.state, pos);
    }
}

#[cfg(feature = "zeroize")]
impl Drop for SalsaCore {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for SalsaCore {}

#[inline]
#[allow(clippy::many_single_char_names)]
pub(crate) fn quarter_round(
    a: usize,
    b: usize,
    c: usize,
    d: usize,
    state: &mut [u32; STATE_WORDS],
) {
    state[b] ^= state[a].wrapping_add(state[d]).rotate_left(7);
    state[c] ^= state[b].wrapping_add(state[a]).rotate_left(9);
    state[d] ^= state[c].wrapping_add(state[b]).rotate_left(13);
    state[a] ^= state[d].wrapping_add(state[c]).rotate_left(18);
}

/// Column round followed by row round.
#[inline(always)]
pub(crate) fn double_round(state: &mut [u32; STATE_WORDS]) {
    // column rounds
    quarter_round(0, 4, 8, 12, state);
    quarter_round(5, 9, 13, 1, state);
    quarter_round(10, 14, 2, 6, state);
    quarter_round(15, 3, 7, 11, state);

    // row rounds
    quarter_round(0, 1, 2, 3, state);
    quarter_round(5, 6, 7, 4, state);
    quarter_round(10, 11, 8, 9, state);
    quarter_round(15, 12, 13, 14, state);
}
