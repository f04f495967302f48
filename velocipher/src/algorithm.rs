//! Runtime selection of a framed cipher by name.

use crate::{
    AesGcm, ChaCha20Poly1305, Error, FramedCipher, Rc2, Result, Salsa20, Strategy, Threefish512,
    XChaCha20Poly1305,
};
use core::{fmt, str::FromStr};

/// Every framed cipher this crate provides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// [`AesGcm`]
    AesGcm,
    /// [`ChaCha20Poly1305`]
    ChaCha20Poly1305,
    /// [`XChaCha20Poly1305`]
    XChaCha20Poly1305,
    /// [`Salsa20`]
    Salsa20,
    /// [`Threefish512`]
    Threefish512,
    /// [`Rc2`]
    Rc2,
}

macro_rules! forward {
    ($self:expr, $method:ident($($arg:expr),*)) => {
        match $self {
            Algorithm::AesGcm => AesGcm.$method($($arg),*),
            Algorithm::ChaCha20Poly1305 => ChaCha20Poly1305.$method($($arg),*),
            Algorithm::XChaCha20Poly1305 => XChaCha20Poly1305.$method($($arg),*),
            Algorithm::Salsa20 => Salsa20.$method($($arg),*),
            Algorithm::Threefish512 => Threefish512.$method($($arg),*),
            Algorithm::Rc2 => Rc2.$method($($arg),*),
        }
    };
}

impl Algorithm {
    /// All algorithms.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::AesGcm,
        Algorithm::ChaCha20Poly1305,
        Algorithm::XChaCha20Poly1305,
        Algorithm::Salsa20,
        Algorithm::Threefish512,
        Algorithm::Rc2,
    ];

    /// Canonical lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::AesGcm => "aes-gcm",
            Algorithm::ChaCha20Poly1305 => "chacha20-poly1305",
            Algorithm::XChaCha20Poly1305 => "xchacha20-poly1305",
            Algorithm::Salsa20 => "salsa20",
            Algorithm::Threefish512 => "threefish-512",
            Algorithm::Rc2 => "rc2",
        }
    }

    /// Whether decryption detects tampering.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(
            self,
            Algorithm::AesGcm | Algorithm::ChaCha20Poly1305 | Algorithm::XChaCha20Poly1305
        )
    }

    /// Key length in bytes expected by [`Algorithm::encrypt`].
    #[must_use]
    pub const fn key_size(self) -> usize {
        match self {
            Algorithm::AesGcm => AesGcm::KEY_SIZE,
            Algorithm::ChaCha20Poly1305 => ChaCha20Poly1305::KEY_SIZE,
            Algorithm::XChaCha20Poly1305 => XChaCha20Poly1305::KEY_SIZE,
            Algorithm::Salsa20 => Salsa20::KEY_SIZE,
            Algorithm::Threefish512 => Threefish512::KEY_SIZE,
            Algorithm::Rc2 => Rc2::KEY_SIZE,
        }
    }

    /// Fixed framing overhead in bytes, not counting block padding.
    #[must_use]
    pub fn overhead(self) -> usize {
        forward!(self, overhead())
    }

    /// Backend currently selected for this algorithm's cipher family, or
    /// `None` if the cipher does its own dispatch (AES) or has a single
    /// implementation (RC2).
    #[must_use]
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Algorithm::ChaCha20Poly1305 | Algorithm::XChaCha20Poly1305 => {
                Some(velocipher_chacha20::STRATEGIES.get())
            }
            Algorithm::Salsa20 => Some(velocipher_salsa20::STRATEGIES.get()),
            Algorithm::Threefish512 => Some(velocipher_threefish::STRATEGIES.get()),
            Algorithm::AesGcm | Algorithm::Rc2 => None,
        }
    }

    /// See [`FramedCipher::generate_key`].
    ///
    /// # Errors
    /// Returns [`Error::Random`] if the operating system RNG fails.
    pub fn generate_key(self) -> Result<Vec<u8>> {
        forward!(self, generate_key())
    }

    /// See [`FramedCipher::encrypt`].
    ///
    /// # Errors
    /// Fails on empty plaintext, a wrong key length or an RNG failure.
    pub fn encrypt(self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        log::trace!("{self}: encrypt {} bytes", plaintext.len());
        forward!(self, encrypt(plaintext, key))
    }

    /// See [`FramedCipher::decrypt`].
    ///
    /// # Errors
    /// Fails on a wrong key length, malformed or truncated input, or a tag
    /// mismatch for authenticated algorithms.
    pub fn decrypt(self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        log::trace!("{self}: decrypt {} bytes", framed.len());
        forward!(self, decrypt(framed, key))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse a canonical name, ignoring ASCII case and treating `_` as `-`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_owned()))
    }
}
