//! Implementation of the [Threefish-512] tweakable block cipher.
//!
//! Cipher functionality is accessed using traits from the re-exported
//! [`cipher`] crate.
//!
//! # Round structure
//!
//! This implementation injects a subkey before *every* one of the 72
//! rounds (subkey `r % 19` before round `r`) instead of every fourth round
//! as in the Skein 1.3 paper, and uses two orderings of the Mix function:
//!
//! - rounds with `r % 8 == 0`: `x0 += x1; x1 = rotl(x1, R) ^ x0`
//! - all other rounds: `x1 = rotl(x1, R); x0 += x1; x1 ^= x0`
//!
//! followed by the word permutation `[0, 3, 2, 1]` on each half of the
//! state. Ciphertexts are therefore **not** interoperable with Skein's
//! Threefish.
//!
//! The permutation never moves a word between halves, so words 0..4 and
//! 4..8 are enciphered independently: changing one half of a plaintext
//! block leaves the other half of the ciphertext unchanged.
//!
//! # Example
//! ```
//! use velocipher_threefish::{Key, Threefish512, Tweak};
//! use velocipher_threefish::cipher::{Block, BlockDecrypt, BlockEncrypt};
//!
//! let key = Key::clone_from_slice(&[7u8; 64]);
//! let cipher = Threefish512::new_with_tweak(&key, &Tweak::from([1u8; 16]));
//!
//! let plaintext = Block::<Threefish512>::clone_from_slice(&[0x42u8; 64]);
//! let mut block = plaintext.clone();
//! cipher.encrypt_block(&mut block);
//! assert_ne!(block, plaintext);
//!
//! cipher.decrypt_block(&mut block);
//! assert_eq!(block, plaintext);
//! ```
//!
//! [Threefish-512]: https://www.schneier.com/academic/skein/threefish/

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use cipher;
pub use velocipher_core::{Strategy, UnsupportedStrategy};

use cipher::{
    consts::{U16, U64},
    generic_array::GenericArray,
    BlockCipher, BlockClosure, BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit, KeySizeUser,
};
use velocipher_core::StrategyCache;

#[cfg(feature = "zeroize")]
use zeroize::ZeroizeOnDrop;

mod backends;
mod schedule;

pub use schedule::KeySchedule;

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Number of 64-bit words in a block (and in a key).
pub const WORDS: usize = 8;

/// Number of rounds.
pub const ROUNDS: usize = 72;

/// Number of subkeys in the schedule.
pub const SUBKEYS: usize = 19;

/// Key type: 512 bits.
pub type Key = GenericArray<u8, U64>;

/// Tweak type: 128 bits.
pub type Tweak = GenericArray<u8, U16>;

/// Rotation constants `R[r % 8][j]` for the Mix on words `(2j, 2j + 1)`.
pub(crate) const ROTATIONS: [[u32; 4]; 8] = [
    [46, 36, 19, 37],
    [33, 27, 14, 42],
    [17, 49, 36, 39],
    [44, 9, 54, 56],
    [39, 30, 34, 24],
    [13, 50, 10, 17],
    [25, 29, 39, 43],
    [8, 35, 56, 22],
];

/// Process-wide backend selection for Threefish.
pub static STRATEGIES: StrategyCache = StrategyCache::new(
    "threefish512",
    &[
        Strategy::Avx2,
        Strategy::Neon,
        Strategy::Sse2,
        Strategy::Soft,
    ],
);

/// Threefish-512 keyed with a fixed tweak.
#[derive(Clone)]
pub struct Threefish512 {
    schedule: KeySchedule,
    strategy: Strategy,
}

impl Threefish512 {
    /// Expand `key` under `tweak`, using the cached strategy.
    #[must_use]
    pub fn new_with_tweak(key: &Key, tweak: &Tweak) -> Self {
        Self {
            schedule: KeySchedule::new(key, tweak),
            strategy: STRATEGIES.get(),
        }
    }

    /// Expand `key` under `tweak` and always run on `strategy`.
    ///
    /// # Errors
    /// Returns [`UnsupportedStrategy`] if the running CPU cannot execute the
    /// requested backend.
    pub fn with_strategy(
        key: &Key,
        tweak: &Tweak,
        strategy: Strategy,
    ) -> Result<Self, UnsupportedStrategy> {
        if !STRATEGIES.supported().any(|s| s == strategy) {
            return Err(UnsupportedStrategy(strategy));
        }
        Ok(Self {
            schedule: KeySchedule::new(key, tweak),
            strategy,
        })
    }

    /// Backend this instance dispatches to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The expanded key schedule.
    #[must_use]
    pub fn schedule(&self) -> &KeySchedule {
        &self.schedule
    }
}

impl core::fmt::Debug for Threefish512 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Threefish512")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl BlockSizeUser for Threefish512 {
    type BlockSize = U64;
}

impl KeySizeUser for Threefish512 {
    type KeySize = U64;
}

impl KeyInit for Threefish512 {
    /// Expand `key` under the all-zero tweak.
    fn new(key: &Key) -> Self {
        Self::new_with_tweak(key, &Tweak::default())
    }
}

impl BlockCipher for Threefish512 {}

impl BlockEncrypt for Threefish512 {
    fn encrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U64>) {
        let keys = &self.schedule;
        match self.strategy {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Avx2 => unsafe { backends::avx2::encrypt(keys, f) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Sse2 => unsafe { backends::sse2::encrypt(keys, f) },
            #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
            Strategy::Neon => unsafe { backends::neon::encrypt(keys, f) },
            _ => f.call(&mut backends::soft::Encryptor(keys)),
        }
    }
}

impl BlockDecrypt for Threefish512 {
    fn decrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U64>) {
        let keys = &self.schedule;
        match self.strategy {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Avx2 => unsafe { backends::avx2::decrypt(keys, f) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Sse2 => unsafe { backends::sse2::decrypt(keys, f) },
            #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
            Strategy::Neon => unsafe { backends::neon::decrypt(keys, f) },
            _ => f.call(&mut backends::soft::Decryptor(keys)),
        }
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Threefish512 {
    fn drop(&mut self) {
        self.schedule.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for Threefish512 {}
