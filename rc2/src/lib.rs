//! Implementation of the [RC2] block cipher.
//!
//! Cipher functionality is accessed using traits from the re-exported
//! [`cipher`] crate.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! RC2 has a 64-bit block and is considered weak. It is provided only so
//! that data framed with it can still be read. Do not use it for new data.
//!
//! # Example
//! ```
//! use velocipher_rc2::Rc2;
//! use velocipher_rc2::cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};
//! use hex_literal::hex;
//!
//! let key = hex!("88bca90e90875a7f0f79c384627bafb2");
//! let cipher = Rc2::new(&key.into());
//!
//! let mut block = Block::<Rc2>::default();
//! cipher.encrypt_block(&mut block);
//! assert_eq!(block, hex!("2269552ab0f85ca6").into());
//!
//! cipher.decrypt_block(&mut block);
//! assert_eq!(block, Block::<Rc2>::default());
//! ```
//!
//! [RC2]: https://tools.ietf.org/html/rfc2268

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use cipher;

use cipher::{
    consts::{U1, U16, U8},
    generic_array::GenericArray,
    inout::InOut,
    Block, BlockBackend, BlockCipher, BlockClosure, BlockDecrypt, BlockEncrypt, BlockSizeUser,
    InvalidLength, KeyInit, KeySizeUser, ParBlocksSizeUser,
};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

mod consts;

use consts::PI_TABLE;

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 8;

/// Default key size in bytes.
pub const KEY_SIZE: usize = 16;

/// Longest accepted key in bytes.
pub const MAX_KEY_SIZE: usize = 128;

/// Key type for the default 128-bit key size.
pub type Key = GenericArray<u8, U16>;

/// Rotation amounts of the four 16-bit words in a mixing round.
const SHIFTS: [u32; 4] = [1, 2, 3, 5];

/// RC2 with an expanded key.
#[derive(Clone)]
pub struct Rc2 {
    keys: [u16; 64],
}

impl Rc2 {
    /// Expand `key` (1 to 128 bytes) with an explicit effective key length
    /// in bits.
    ///
    /// # Errors
    /// Returns [`InvalidLength`] if `key` is empty or longer than
    /// [`MAX_KEY_SIZE`], or if `effective_bits` is not in `1..=1024`.
    pub fn new_with_eff_key_len(key: &[u8], effective_bits: usize) -> Result<Self, InvalidLength> {
        if key.is_empty() || key.len() > MAX_KEY_SIZE || !(1..=1024).contains(&effective_bits) {
            return Err(InvalidLength);
        }
        Ok(Self {
            keys: expand_key(key, effective_bits),
        })
    }

    #[inline(always)]
    fn encrypt_words(&self, r: &mut [u16; 4]) {
        let mut j = 0;
        for round in 0..16 {
            for i in 0..4 {
                let mix = self.keys[j]
                    .wrapping_add(r[(i + 3) % 4] & r[(i + 2) % 4])
                    .wrapping_add(!r[(i + 3) % 4] & r[(i + 1) % 4]);
                r[i] = r[i].wrapping_add(mix).rotate_left(SHIFTS[i]);
                j += 1;
            }
            if round == 4 || round == 10 {
                for i in 0..4 {
                    r[i] = r[i].wrapping_add(self.keys[usize::from(r[(i + 3) % 4] & 63)]);
                }
            }
        }
    }

    #[inline(always)]
    fn decrypt_words(&self, r: &mut [u16; 4]) {
        let mut j = 64;
        for round in (0..16).rev() {
            for i in (0..4).rev() {
                j -= 1;
                r[i] = r[i].rotate_right(SHIFTS[i]);
                let mix = self.keys[j]
                    .wrapping_add(r[(i + 3) % 4] & r[(i + 2) % 4])
                    .wrapping_add(!r[(i + 3) % 4] & r[(i + 1) % 4]);
                r[i] = r[i].wrapping_sub(mix);
            }
            if round == 5 || round == 11 {
                for i in (0..4).rev() {
                    r[i] = r[i].wrapping_sub(self.keys[usize::from(r[(i + 3) % 4] & 63)]);
                }
            }
        }
    }
}

/// RFC 2268 §2 key expansion.
fn expand_key(key: &[u8], effective_bits: usize) -> [u16; 64] {
    let t = key.len();
    let t8 = (effective_bits + 7) / 8;
    let tm = 0xffu8 >> (8 * t8 - effective_bits);

    let mut l = [0u8; 128];
    l[..t].copy_from_slice(key);
    for i in t..128 {
        l[i] = PI_TABLE[usize::from(l[i - 1].wrapping_add(l[i - t]))];
    }

    l[128 - t8] = PI_TABLE[usize::from(l[128 - t8] & tm)];
    for i in (0..128 - t8).rev() {
        l[i] = PI_TABLE[usize::from(l[i + 1] ^ l[i + t8])];
    }

    let mut keys = [0u16; 64];
    for (k, pair) in keys.iter_mut().zip(l.chunks_exact(2)) {
        *k = u16::from_le_bytes([pair[0], pair[1]]);
    }

    #[cfg(feature = "zeroize")]
    l.zeroize();

    keys
}

impl core::fmt::Debug for Rc2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Rc2 { .. }")
    }
}

impl KeySizeUser for Rc2 {
    type KeySize = U16;
}

impl KeyInit for Rc2 {
    #[inline]
    fn new(key: &Key) -> Self {
        Self {
            keys: expand_key(key, 8 * key.len()),
        }
    }

    /// Accepts any key of 1 to 128 bytes, with an effective key length of
    /// eight bits per key byte.
    #[inline]
    fn new_from_slice(key: &[u8]) -> Result<Self, InvalidLength> {
        Self::new_with_eff_key_len(key, 8 * key.len())
    }
}

impl BlockSizeUser for Rc2 {
    type BlockSize = U8;
}

impl BlockCipher for Rc2 {}

impl BlockEncrypt for Rc2 {
    fn encrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U8>) {
        f.call(&mut Encryptor(self));
    }
}

impl BlockDecrypt for Rc2 {
    fn decrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U8>) {
        f.call(&mut Decryptor(self));
    }
}

impl Drop for Rc2 {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.keys.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for Rc2 {}

macro_rules! block_backend {
    ($name:ident, $words:ident) => {
        struct $name<'a>(&'a Rc2);

        impl BlockSizeUser for $name<'_> {
            type BlockSize = U8;
        }

        impl ParBlocksSizeUser for $name<'_> {
            type ParBlocksSize = U1;
        }

        impl BlockBackend for $name<'_> {
            #[inline(always)]
            fn proc_block(&mut self, mut block: InOut<'_, '_, Block<Self>>) {
                let input = block.get_in();
                let mut r = [0u16; 4];
                for (w, pair) in r.iter_mut().zip(input.chunks_exact(2)) {
                    *w = u16::from_le_bytes([pair[0], pair[1]]);
                }
                self.0.$words(&mut r);
                let output = block.get_out();
                for (pair, w) in output.chunks_exact_mut(2).zip(r) {
                    pair.copy_from_slice(&w.to_le_bytes());
                }
            }
        }
    };
}

block_backend!(Encryptor, encrypt_words);
block_backend!(Decryptor, decrypt_words);
