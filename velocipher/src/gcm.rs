//! AES-GCM framing: `nonce(12) ‖ ciphertext ‖ tag(16)`.
//!
//! The AES implementation (AES-NI, ARMv8 or portable) is selected at
//! runtime by the `aes` crate.

use crate::{
    error::{check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use aes_gcm::{
    aead::{consts::U12, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm as Gcm,
};

#[cfg(feature = "parallel")]
mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::DEFAULT_CHUNK_SIZE;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Largest plaintext GCM can encrypt under one nonce.
const MAX_PLAINTEXT: u64 = (1 << 36) - 32;

type Aes192Gcm = Gcm<Aes192, U12>;

/// AES-GCM with a random 96-bit nonce.
///
/// Keys of 16, 24 and 32 bytes select AES-128, AES-192 and AES-256;
/// [`FramedCipher::KEY_SIZE`] (and [`FramedCipher::generate_key`]) use
/// AES-256.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AesGcm;

/// A keyed AES-GCM instance of any supported key size.
#[derive(Clone)]
pub(crate) enum GcmCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

macro_rules! dispatch {
    ($cipher:expr, $inner:ident => $body:expr) => {
        match $cipher {
            GcmCipher::Aes128($inner) => $body,
            GcmCipher::Aes192($inner) => $body,
            GcmCipher::Aes256($inner) => $body,
        }
    };
}

impl GcmCipher {
    pub(crate) fn new(key: &[u8]) -> Result<Self> {
        let invalid = |_| Error::InvalidKeyLength {
            expected: AesGcm::KEY_SIZE,
            actual: key.len(),
        };
        let cipher = match key.len() {
            16 => Self::Aes128(Aes128Gcm::new_from_slice(key).map_err(invalid)?),
            24 => Self::Aes192(Aes192Gcm::new_from_slice(key).map_err(invalid)?),
            32 => Self::Aes256(Aes256Gcm::new_from_slice(key).map_err(invalid)?),
            actual => {
                return Err(Error::InvalidKeyLength {
                    expected: AesGcm::KEY_SIZE,
                    actual,
                })
            }
        };
        log::trace!("aes-gcm: AES-{}", key.len() * 8);
        Ok(cipher)
    }

    /// Encrypt `buf` in place and return its tag.
    pub(crate) fn seal(&self, nonce: &[u8; NONCE_SIZE], buf: &mut [u8]) -> Result<[u8; TAG_SIZE]> {
        let nonce = GenericArray::from_slice(nonce);
        let tag = dispatch!(self, c => c.encrypt_in_place_detached(nonce, &[], buf))
            .map_err(|_| Error::PlaintextTooLong {
                maximum: usize::try_from(MAX_PLAINTEXT).unwrap_or(usize::MAX),
                actual: buf.len(),
            })?;
        let mut out = [0u8; TAG_SIZE];
        out.copy_from_slice(&tag);
        Ok(out)
    }

    /// Verify `tag` over `buf` and decrypt it in place. On failure `buf` is
    /// left as ciphertext.
    pub(crate) fn open(&self, nonce: &[u8], buf: &mut [u8], tag: &[u8]) -> Result<()> {
        let nonce = GenericArray::from_slice(nonce);
        let tag = GenericArray::from_slice(tag);
        dispatch!(self, c => c.decrypt_in_place_detached(nonce, &[], buf, tag))
            .map_err(|_| Error::AuthenticationFailed)
    }
}

impl FramedCipher for AesGcm {
    const KEY_SIZE: usize = 32;
    const NONCE_SIZE: usize = NONCE_SIZE;
    const TAG_SIZE: usize = TAG_SIZE;

    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_plaintext(plaintext)?;
        let cipher = GcmCipher::new(key)?;
        let nonce = random::array::<NONCE_SIZE>()?;

        let mut out = Vec::with_capacity(NONCE_SIZE + plaintext.len() + TAG_SIZE);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(plaintext);
        let tag = cipher.seal(&nonce, &mut out[NONCE_SIZE..])?;
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let cipher = GcmCipher::new(key)?;
        check_len(framed, self.overhead())?;

        let (nonce, rest) = framed.split_at(NONCE_SIZE);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);
        let mut plaintext = ciphertext.to_vec();
        cipher.open(nonce, &mut plaintext, tag)?;
        Ok(plaintext)
    }
}
