//! Whole-buffer encryption with self-framing output.
//!
//! Each algorithm is a unit struct implementing [`FramedCipher`]: it
//! generates keys, and turns a plaintext into a framed ciphertext (and
//! back) whose fixed-offset layout carries everything needed to decrypt
//! except the key.
//!
//! | Algorithm                 | Layout                                                   |
//! |---------------------------|----------------------------------------------------------|
//! | [`AesGcm`]                | `nonce(12) ‖ ciphertext ‖ tag(16)`                       |
//! | [`ChaCha20Poly1305`]      | `nonce(12) ‖ ciphertext ‖ tag(16)`                       |
//! | [`XChaCha20Poly1305`]     | `nonce(24) ‖ ciphertext ‖ tag(16)`                       |
//! | [`Salsa20`]               | `nonce(8) ‖ ciphertext`                                  |
//! | [`Threefish512`]          | `tweak(16) ‖ le32(length) ‖ ciphertext padded to 64`     |
//! | [`Rc2`]                   | `iv(8) ‖ CBC(PKCS7(le32(length) ‖ plaintext))`           |
//!
//! The stream and block ciphers run on whichever backend their family's
//! [`StrategyCache`](velocipher_core::StrategyCache) selected for this CPU.
//!
//! # ⚠️ Security Warning
//!
//! [`Salsa20`], [`Threefish512`] and [`Rc2`] are not authenticated: a
//! modified ciphertext decrypts to modified plaintext without any error.
//! Nonces are random, so a key must not be used for more messages than its
//! nonce size safely allows.
//!
//! # Example
//! ```
//! use velocipher::{Algorithm, FramedCipher, XChaCha20Poly1305};
//!
//! let key = XChaCha20Poly1305.generate_key()?;
//! let framed = XChaCha20Poly1305.encrypt(b"attack at dawn", &key)?;
//! assert_eq!(framed.len(), 14 + XChaCha20Poly1305.overhead());
//! assert_eq!(XChaCha20Poly1305.decrypt(&framed, &key)?, b"attack at dawn");
//!
//! let algorithm: Algorithm = "xchacha20-poly1305".parse()?;
//! assert_eq!(algorithm.decrypt(&framed, &key)?, b"attack at dawn");
//! # Ok::<(), velocipher::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod algorithm;
mod chacha;
mod error;
mod gcm;
mod random;
mod rc2;
mod salsa;
mod threefish;

pub use algorithm::Algorithm;
pub use chacha::{ChaCha20Poly1305, XChaCha20Poly1305};
pub use error::{Error, Result};
pub use gcm::AesGcm;
#[cfg(feature = "parallel")]
pub use gcm::DEFAULT_CHUNK_SIZE;
pub use rc2::Rc2;
pub use salsa::Salsa20;
pub use threefish::Threefish512;
pub use velocipher_core::Strategy;

/// A cipher with a fixed on-wire framing.
pub trait FramedCipher {
    /// Required key length in bytes.
    const KEY_SIZE: usize;

    /// Length of the random nonce, tweak or IV leading the framed output.
    const NONCE_SIZE: usize;

    /// Length of the trailing authentication tag, zero if unauthenticated.
    const TAG_SIZE: usize;

    /// Generate a fresh random key of [`Self::KEY_SIZE`] bytes.
    ///
    /// # Errors
    /// Returns [`Error::Random`] if the operating system RNG fails.
    fn generate_key(&self) -> Result<Vec<u8>> {
        random::key(Self::KEY_SIZE)
    }

    /// Encrypt `plaintext` under `key` with a fresh nonce.
    ///
    /// # Errors
    /// Fails on empty plaintext, a wrong key length or an RNG failure.
    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a framed ciphertext produced by [`FramedCipher::encrypt`].
    ///
    /// # Errors
    /// Fails on a wrong key length, input shorter than
    /// [`FramedCipher::overhead`], malformed framing, or (for authenticated
    /// ciphers) a tag mismatch.
    fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Fixed number of bytes framing adds around the body, not counting
    /// block padding.
    fn overhead(&self) -> usize {
        Self::NONCE_SIZE + Self::TAG_SIZE
    }
}
