//! Threefish-512 framing: `tweak(16) ‖ le32(length) ‖ body`.
//!
//! The body is the plaintext padded to a multiple of 64 bytes with
//! `pad_len` copies of the byte `pad_len`, `pad_len = (64 - len % 64) % 64`,
//! each block enciphered independently under the random tweak. A
//! block-aligned plaintext gets no padding at all, so only the length
//! field tells where the plaintext ends.

use crate::{
    error::{check_key, check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt};
use velocipher_threefish::{Key, Threefish512 as Cipher, Tweak, BLOCK_SIZE};

const LENGTH_SIZE: usize = 4;

/// Threefish-512 with a random tweak, an explicit length field and no
/// authentication tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Threefish512;

/// Number of padding bytes appended to a plaintext of `len` bytes.
fn pad_len(len: usize) -> usize {
    (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

fn cipher(key: &[u8], tweak: &[u8]) -> Cipher {
    let cipher = Cipher::new_with_tweak(Key::from_slice(key), Tweak::from_slice(tweak));
    log::trace!("threefish-512: {} backend", cipher.strategy());
    cipher
}

impl FramedCipher for Threefish512 {
    const KEY_SIZE: usize = 64;
    const NONCE_SIZE: usize = 16;
    const TAG_SIZE: usize = 0;

    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_plaintext(plaintext)?;
        check_key(key, Self::KEY_SIZE)?;
        let length = u32::try_from(plaintext.len()).map_err(|_| Error::PlaintextTooLong {
            maximum: u32::MAX as usize,
            actual: plaintext.len(),
        })?;
        let tweak = random::array::<16>()?;
        let pad = pad_len(plaintext.len());

        let header = self.overhead();
        let mut out = Vec::with_capacity(header + plaintext.len() + pad);
        out.extend_from_slice(&tweak);
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(plaintext);
        out.resize(out.len() + pad, pad as u8);

        let cipher = cipher(key, &tweak);
        for block in out[header..].chunks_exact_mut(BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        Ok(out)
    }

    fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_key(key, Self::KEY_SIZE)?;
        check_len(framed, self.overhead() + BLOCK_SIZE)?;

        let (tweak, rest) = framed.split_at(Self::NONCE_SIZE);
        let (length, body) = rest.split_at(LENGTH_SIZE);
        if body.len() % BLOCK_SIZE != 0 {
            return Err(Error::MalformedCiphertext(
                "body is not a multiple of the block size",
            ));
        }

        let mut length_bytes = [0u8; LENGTH_SIZE];
        length_bytes.copy_from_slice(length);
        let length = u32::from_le_bytes(length_bytes) as usize;
        if length == 0 || length > body.len() || length + pad_len(length) != body.len() {
            return Err(Error::MalformedCiphertext(
                "length field does not match the body size",
            ));
        }

        let cipher = cipher(key, tweak);
        let mut plaintext = body.to_vec();
        for block in plaintext.chunks_exact_mut(BLOCK_SIZE) {
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
        plaintext.truncate(length);
        Ok(plaintext)
    }

    fn overhead(&self) -> usize {
        Self::NONCE_SIZE + LENGTH_SIZE
    }
}
