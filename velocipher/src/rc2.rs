//! Legacy RC2 framing: `iv(8) ‖ CBC(PKCS7(le32(length) ‖ plaintext))`.

use crate::{
    error::{check_key, check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use velocipher_rc2::{Rc2 as Cipher, BLOCK_SIZE};

const LENGTH_SIZE: usize = 4;

/// RC2-CBC with a random IV, an embedded length and no authentication tag.
///
/// Only provided to read and write data in the legacy format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rc2;

fn cipher(key: &[u8]) -> Result<Cipher> {
    Cipher::new_from_slice(key).map_err(|_| Error::InvalidKeyLength {
        expected: Rc2::KEY_SIZE,
        actual: key.len(),
    })
}

fn xor_in_place(block: &mut [u8], mask: &[u8]) {
    for (b, m) in block.iter_mut().zip(mask) {
        *b ^= m;
    }
}

impl FramedCipher for Rc2 {
    const KEY_SIZE: usize = 16;
    const NONCE_SIZE: usize = 8;
    const TAG_SIZE: usize = 0;

    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_plaintext(plaintext)?;
        check_key(key, Self::KEY_SIZE)?;
        let length = u32::try_from(plaintext.len()).map_err(|_| Error::PlaintextTooLong {
            maximum: u32::MAX as usize,
            actual: plaintext.len(),
        })?;
        let iv = random::array::<8>()?;
        let cipher = cipher(key)?;

        let inner = LENGTH_SIZE + plaintext.len();
        let pad = BLOCK_SIZE - inner % BLOCK_SIZE;
        let mut out = Vec::with_capacity(iv.len() + inner + pad);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(plaintext);
        out.resize(out.len() + pad, pad as u8);

        // c[0] = iv, c[i] = E(p[i] ^ c[i - 1])
        let mut prev = iv;
        for block in out[Self::NONCE_SIZE..].chunks_exact_mut(BLOCK_SIZE) {
            xor_in_place(block, &prev);
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
            prev.copy_from_slice(block);
        }
        Ok(out)
    }

    fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_key(key, Self::KEY_SIZE)?;
        check_len(framed, Self::NONCE_SIZE + BLOCK_SIZE)?;
        let (iv, body) = framed.split_at(Self::NONCE_SIZE);
        if body.len() % BLOCK_SIZE != 0 {
            return Err(Error::MalformedCiphertext(
                "body is not a multiple of the block size",
            ));
        }
        let cipher = cipher(key)?;

        let mut inner = body.to_vec();
        for (i, block) in inner.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            let prev = if i == 0 {
                iv
            } else {
                &body[(i - 1) * BLOCK_SIZE..i * BLOCK_SIZE]
            };
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
            xor_in_place(block, prev);
        }

        let pad = usize::from(inner[inner.len() - 1]);
        let padding_ok = (1..=BLOCK_SIZE).contains(&pad)
            && inner[inner.len() - pad..].iter().all(|&b| usize::from(b) == pad);
        if !padding_ok {
            return Err(Error::MalformedCiphertext("invalid padding"));
        }
        inner.truncate(inner.len() - pad);

        if inner.len() < LENGTH_SIZE {
            return Err(Error::MalformedCiphertext("missing length field"));
        }
        let mut length = [0u8; LENGTH_SIZE];
        length.copy_from_slice(&inner[..LENGTH_SIZE]);
        let length = u32::from_le_bytes(length) as usize;
        if length != inner.len() - LENGTH_SIZE {
            return Err(Error::MalformedCiphertext(
                "length field does not match the body size",
            ));
        }

        Ok(inner.split_off(LENGTH_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkcs7_always_adds_a_block_when_aligned() {
        let key = [1u8; 16];
        // 4 length bytes + 4 plaintext bytes fill exactly one block
        let framed = Rc2.encrypt(b"abcd", &key).unwrap();
        assert_eq!(framed.len(), 8 + 16);
        assert_eq!(Rc2.decrypt(&framed, &key).unwrap(), b"abcd");
    }

    #[test]
    fn cbc_chains_blocks() {
        let key = [2u8; 16];
        let framed = Rc2.encrypt(&[0u8; 20], &key).unwrap();
        // identical plaintext blocks must not give identical ciphertext
        let body = &framed[8..];
        assert_ne!(body[8..16], body[16..24]);
    }
}
