//! ChaCha20-Poly1305 and XChaCha20-Poly1305 (RFC 8439 §2.8).
//!
//! The Poly1305 key is the first half of keystream block 0, the body is
//! encrypted from block 1, and the MAC covers
//! `aad ‖ pad16 ‖ ciphertext ‖ pad16 ‖ le64(|aad|) ‖ le64(|ciphertext|)`.

use crate::{
    error::{check_key, check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use cipher::{KeyIvInit, StreamCipher, StreamCipherCoreWrapper};
use velocipher_chacha20::{ChaChaCore, XChaChaCore};
use velocipher_poly1305::{Poly1305, Tag, TAG_SIZE};

const KEY_SIZE: usize = 32;

/// Derive the one-time Poly1305 key from keystream block 0, leaving the
/// cipher positioned at block 1.
fn poly1305<C: StreamCipher>(cipher: &mut C) -> Poly1305 {
    let mut block = [0u8; 64];
    cipher.apply_keystream(&mut block);
    let mut key = [0u8; 32];
    key.copy_from_slice(&block[..32]);
    Poly1305::new(&key)
}

fn authenticate(mut poly: Poly1305, aad: &[u8], ciphertext: &[u8]) -> Poly1305 {
    poly.update_padded(aad);
    poly.update_padded(ciphertext);
    let mut lengths = [0u8; 16];
    lengths[..8].copy_from_slice(&(aad.len() as u64).to_le_bytes());
    lengths[8..].copy_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    poly.update(&lengths);
    poly
}

/// Append `ciphertext ‖ tag` for `plaintext` to `out`.
fn seal<C: StreamCipher>(mut cipher: C, aad: &[u8], plaintext: &[u8], out: &mut Vec<u8>) {
    let poly = poly1305(&mut cipher);
    let start = out.len();
    out.extend_from_slice(plaintext);
    cipher.apply_keystream(&mut out[start..]);
    let tag = authenticate(poly, aad, &out[start..]).finalize();
    out.extend_from_slice(&tag);
}

/// Verify and decrypt `ciphertext ‖ tag`.
fn open<C: StreamCipher>(mut cipher: C, aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);
    let mut expected: Tag = [0u8; TAG_SIZE];
    expected.copy_from_slice(tag);

    let poly = poly1305(&mut cipher);
    authenticate(poly, aad, ciphertext)
        .verify(&expected)
        .map_err(|_| Error::AuthenticationFailed)?;

    let mut plaintext = ciphertext.to_vec();
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}

macro_rules! chacha_aead {
    ($name:ident, $core:ty, $nonce_size:expr, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            /// Encrypt `plaintext` under `key` with a fresh random nonce,
            /// authenticating `aad` alongside it.
            ///
            /// # Errors
            /// Fails on empty plaintext, a wrong key length or an RNG
            /// failure.
            pub fn encrypt_with_aad(&self, plaintext: &[u8], aad: &[u8], key: &[u8]) -> Result<Vec<u8>> {
                check_plaintext(plaintext)?;
                check_key(key, KEY_SIZE)?;
                let nonce = random::array::<$nonce_size>()?;
                self.encrypt_with_nonce(plaintext, aad, key, &nonce)
            }

            /// Encrypt with a caller-chosen nonce. The nonce must never be
            /// repeated under the same key.
            ///
            /// # Errors
            /// Fails on empty plaintext or a wrong key length.
            pub fn encrypt_with_nonce(
                &self,
                plaintext: &[u8],
                aad: &[u8],
                key: &[u8],
                nonce: &[u8; $nonce_size],
            ) -> Result<Vec<u8>> {
                check_plaintext(plaintext)?;
                let cipher = Self::cipher(key, nonce)?;
                let mut out = Vec::with_capacity($nonce_size + plaintext.len() + TAG_SIZE);
                out.extend_from_slice(nonce);
                seal(cipher, aad, plaintext, &mut out);
                Ok(out)
            }

            /// Verify and decrypt a framed ciphertext whose tag covers `aad`.
            ///
            /// # Errors
            /// Fails on a wrong key length, input shorter than nonce and
            /// tag, or [`Error::AuthenticationFailed`].
            pub fn decrypt_with_aad(&self, framed: &[u8], aad: &[u8], key: &[u8]) -> Result<Vec<u8>> {
                check_key(key, KEY_SIZE)?;
                check_len(framed, self.overhead())?;
                let (nonce, sealed) = framed.split_at($nonce_size);
                open(Self::cipher(key, nonce)?, aad, sealed)
            }

            fn cipher(key: &[u8], nonce: &[u8]) -> Result<StreamCipherCoreWrapper<$core>> {
                let core = <$core>::new_from_slices(key, nonce).map_err(|_| {
                    Error::InvalidKeyLength {
                        expected: KEY_SIZE,
                        actual: key.len(),
                    }
                })?;
                log::trace!(concat!($label, ": {} backend"), core.strategy());
                Ok(StreamCipherCoreWrapper::from_core(core))
            }
        }

        impl FramedCipher for $name {
            const KEY_SIZE: usize = KEY_SIZE;
            const NONCE_SIZE: usize = $nonce_size;
            const TAG_SIZE: usize = TAG_SIZE;

            fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
                self.encrypt_with_aad(plaintext, &[], key)
            }

            fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
                self.decrypt_with_aad(framed, &[], key)
            }
        }
    };
}

chacha_aead!(
    ChaCha20Poly1305,
    ChaChaCore,
    12,
    "chacha20-poly1305",
    "ChaCha20-Poly1305 AEAD with a random 96-bit nonce."
);

chacha_aead!(
    XChaCha20Poly1305,
    XChaChaCore,
    24,
    "xchacha20-poly1305",
    "XChaCha20-Poly1305 AEAD with a random 192-bit nonce."
);

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const KEY: [u8; 32] = hex!("808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f");
    const AAD: [u8; 12] = hex!("50515253c0c1c2c3c4c5c6c7");
    const PLAINTEXT: &[u8] = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";

    #[test]
    fn lengths_block_is_little_endian() {
        let key = [9u8; 32];
        let mut manual = Poly1305::new(&key);
        manual.update_padded(b"ab");
        manual.update_padded(b"cde");
        manual.update(&hex!("0200000000000000 0300000000000000"));
        assert_eq!(
            authenticate(Poly1305::new(&key), b"ab", b"cde").finalize(),
            manual.finalize()
        );
    }

    #[test]
    fn aad_is_authenticated() {
        let framed = ChaCha20Poly1305
            .encrypt_with_aad(PLAINTEXT, &AAD, &KEY)
            .unwrap();
        assert_eq!(
            ChaCha20Poly1305.decrypt_with_aad(&framed, &AAD, &KEY).unwrap(),
            PLAINTEXT
        );
        assert!(matches!(
            ChaCha20Poly1305.decrypt_with_aad(&framed, b"other", &KEY),
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            ChaCha20Poly1305.decrypt(&framed, &KEY),
            Err(Error::AuthenticationFailed)
        ));
    }
}
