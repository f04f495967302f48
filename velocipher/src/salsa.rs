//! Unauthenticated Salsa20 framing: `nonce(8) ‖ ciphertext`.

use crate::{
    error::{check_key, check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use cipher::{KeyIvInit, StreamCipher, StreamCipherCoreWrapper};
use velocipher_salsa20::SalsaCore;

/// Salsa20/20 with a random 64-bit nonce and no authentication tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Salsa20;

impl Salsa20 {
    fn apply(key: &[u8], nonce: &[u8], data: &mut [u8]) -> Result<()> {
        let core = SalsaCore::new_from_slices(key, nonce).map_err(|_| Error::InvalidKeyLength {
            expected: Self::KEY_SIZE,
            actual: key.len(),
        })?;
        log::trace!("salsa20: {} backend", core.strategy());
        StreamCipherCoreWrapper::from_core(core).apply_keystream(data);
        Ok(())
    }
}

impl FramedCipher for Salsa20 {
    const KEY_SIZE: usize = 32;
    const NONCE_SIZE: usize = 8;
    const TAG_SIZE: usize = 0;

    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_plaintext(plaintext)?;
        check_key(key, Self::KEY_SIZE)?;
        let nonce = random::array::<8>()?;

        let mut out = Vec::with_capacity(nonce.len() + plaintext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(plaintext);
        Self::apply(key, &nonce, &mut out[Self::NONCE_SIZE..])?;
        Ok(out)
    }

    fn decrypt(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        check_key(key, Self::KEY_SIZE)?;
        check_len(framed, self.overhead() + 1)?;
        let (nonce, body) = framed.split_at(Self::NONCE_SIZE);
        let mut plaintext = body.to_vec();
        Self::apply(key, nonce, &mut plaintext)?;
        Ok(plaintext)
    }
}
