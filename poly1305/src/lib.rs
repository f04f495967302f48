//! Implementation of the [Poly1305] one-time authenticator.
//!
//! # ⚠️ Security Warning
//!
//! A Poly1305 key must authenticate exactly one message. Reusing a key lets
//! an attacker forge tags. In an AEAD the key is derived per nonce from the
//! cipher's keystream.
//!
//! # Example
//! ```
//! use velocipher_poly1305::Poly1305;
//! use hex_literal::hex;
//!
//! let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
//! let mut mac = Poly1305::new(&key);
//! mac.update(b"Cryptographic Forum Research Group");
//! let tag = mac.clone().finalize();
//! assert_eq!(tag, hex!("a8061dc1305136c6c22b8baf0c0127a9"));
//! assert!(mac.verify(&tag).is_ok());
//! ```
//!
//! [Poly1305]: https://tools.ietf.org/html/rfc8439#section-2.5

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use core::fmt;

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

mod soft;

/// Size of a Poly1305 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a Poly1305 block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of a Poly1305 tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Poly1305 one-time key: clamped `r` followed by `s`.
pub type Key = [u8; KEY_SIZE];

/// Poly1305 authentication tag.
pub type Tag = [u8; TAG_SIZE];

/// Error returned when a computed tag does not match the expected one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagMismatch;

impl fmt::Display for TagMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Poly1305 tag mismatch")
    }
}

impl core::error::Error for TagMismatch {}

/// Incremental Poly1305 computation.
#[derive(Clone)]
pub struct Poly1305 {
    state: soft::State,
    buffer: [u8; BLOCK_SIZE],
    pos: usize,
}

impl Poly1305 {
    /// Initialize with a one-time key.
    #[must_use]
    pub fn new(key: &Key) -> Self {
        Self {
            state: soft::State::new(key),
            buffer: [0u8; BLOCK_SIZE],
            pos: 0,
        }
    }

    /// Absorb `data`.
    ///
    /// Calls may split the message anywhere; only the final partial block of
    /// the whole message is padded, with `0x01` followed by zeros.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pos > 0 {
            let take = (BLOCK_SIZE - self.pos).min(data.len());
            self.buffer[self.pos..self.pos + take].copy_from_slice(&data[..take]);
            self.pos += take;
            data = &data[take..];
            if self.pos < BLOCK_SIZE {
                return;
            }
            self.state.compute_block(&self.buffer, false);
            self.pos = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            self.state.compute_block(block, false);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.pos = rest.len();
    }

    /// Absorb `data` zero-padded to a multiple of 16 bytes, treating each
    /// padded chunk as a full block.
    ///
    /// This is the message formatting of the RFC 8439 AEAD construction.
    /// Any partially buffered input from [`Poly1305::update`] is flushed the
    /// same way first.
    pub fn update_padded(&mut self, data: &[u8]) {
        if self.pos > 0 {
            self.buffer[self.pos..].fill(0);
            self.state.compute_block(&self.buffer, false);
            self.pos = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            self.state.compute_block(block, false);
        }

        let rest = blocks.remainder();
        if !rest.is_empty() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..rest.len()].copy_from_slice(rest);
            self.state.compute_block(&block, false);
        }
    }

    /// Produce the tag for everything absorbed so far.
    #[must_use]
    pub fn finalize(mut self) -> Tag {
        if self.pos > 0 {
            self.buffer[self.pos] = 1;
            self.buffer[self.pos + 1..].fill(0);
            let block = self.buffer;
            self.state.compute_block(&block, true);
        }
        self.state.finalize()
    }

    /// Compare the computed tag with `expected` in constant time.
    ///
    /// # Errors
    /// Returns [`TagMismatch`] if the tags differ.
    pub fn verify(self, expected: &Tag) -> Result<(), TagMismatch> {
        if ct_eq(&self.finalize(), expected) {
            Ok(())
        } else {
            Err(TagMismatch)
        }
    }
}

impl fmt::Debug for Poly1305 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Poly1305 { .. }")
    }
}

impl Drop for Poly1305 {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        {
            self.state.zeroize();
            self.buffer.zeroize();
        }
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for Poly1305 {}

/// Compute the tag of `data` under `key` in one call.
#[must_use]
pub fn mac(key: &Key, data: &[u8]) -> Tag {
    let mut poly = Poly1305::new(key);
    poly.update(data);
    poly.finalize()
}

/// Compare two byte strings without branching on their contents.
///
/// Differences are accumulated with XOR over the full length; lengths are
/// public and compared first.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    core::hint::black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ct_eq_compares_contents() {
        assert!(ct_eq(b"", b""));
        assert!(ct_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!ct_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!ct_eq(&[0x80, 2, 3], &[0, 2, 3]));
        assert!(!ct_eq(&[1, 2], &[1, 2, 3]));
    }

    #[test]
    fn split_updates_match_one_shot() {
        let key = [0x3cu8; KEY_SIZE];
        let data: [u8; 77] = core::array::from_fn(|i| i as u8);
        let expected = mac(&key, &data);
        for split in [0, 1, 15, 16, 17, 33, 76, 77] {
            let mut poly = Poly1305::new(&key);
            poly.update(&data[..split]);
            poly.update(&data[split..]);
            assert_eq!(poly.finalize(), expected, "split at {split}");
        }
    }

    #[test]
    fn padded_update_differs_from_plain_update() {
        let key = [7u8; KEY_SIZE];
        let mut a = Poly1305::new(&key);
        a.update(b"short");
        let mut b = Poly1305::new(&key);
        b.update_padded(b"short");
        assert_ne!(a.finalize(), b.finalize());

        let mut c = Poly1305::new(&key);
        c.update(b"short\0\0\0\0\0\0\0\0\0\0\0");
        let mut d = Poly1305::new(&key);
        d.update_padded(b"short");
        assert_eq!(c.finalize(), d.finalize());
    }
}
