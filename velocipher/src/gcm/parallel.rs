//! Chunked AES-GCM for large buffers, sealed and opened with rayon.
//!
//! Layout: `master_nonce(12) ‖ le32(chunk_size) ‖ (chunk ‖ tag(16))* ‖ hmac(32)`.
//! Chunk `i` uses the master nonce with `be64(i)` XORed into bytes 4..12.
//! The trailing HMAC-SHA256, keyed with the AES key, covers the
//! concatenated chunk tags and binds their order and count.

use super::{AesGcm, GcmCipher, NONCE_SIZE, TAG_SIZE};
use crate::{
    error::{check_len, check_plaintext},
    random, Error, FramedCipher, Result,
};
use hmac::{Hmac, Mac};
use rayon::prelude::*;
use sha2::Sha256;

/// Chunk size used by [`AesGcm::encrypt_parallel`]: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

const CHUNK_FIELD_SIZE: usize = 4;
const HEADER_SIZE: usize = NONCE_SIZE + CHUNK_FIELD_SIZE;
const HMAC_SIZE: usize = 32;

type HmacSha256 = Hmac<Sha256>;

fn chunk_nonce(master: &[u8; NONCE_SIZE], index: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = *master;
    for (b, c) in nonce[4..].iter_mut().zip(index.to_be_bytes()) {
        *b ^= c;
    }
    nonce
}

fn combined_mac<'a>(key: &[u8], tags: impl Iterator<Item = &'a [u8]>) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| Error::InvalidKeyLength {
        expected: AesGcm::KEY_SIZE,
        actual: key.len(),
    })?;
    for tag in tags {
        mac.update(tag);
    }
    Ok(mac)
}

impl AesGcm {
    /// Encrypt `plaintext` in [`DEFAULT_CHUNK_SIZE`] chunks on the rayon
    /// thread pool.
    ///
    /// # Errors
    /// Fails on empty plaintext, a wrong key length or an RNG failure.
    pub fn encrypt_parallel(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_parallel_with_chunk_size(plaintext, key, DEFAULT_CHUNK_SIZE)
    }

    /// Encrypt `plaintext` in chunks of `chunk_size` bytes on the rayon
    /// thread pool. A plaintext no longer than one chunk is a single chunk.
    ///
    /// # Errors
    /// Fails on empty plaintext, a wrong key length, a chunk size of zero
    /// or above `u32::MAX`, or an RNG failure.
    pub fn encrypt_parallel_with_chunk_size(
        &self,
        plaintext: &[u8],
        key: &[u8],
        chunk_size: usize,
    ) -> Result<Vec<u8>> {
        check_plaintext(plaintext)?;
        let cipher = GcmCipher::new(key)?;
        let chunk_field = u32::try_from(chunk_size)
            .ok()
            .filter(|&size| size > 0)
            .ok_or(Error::InvalidChunkSize(chunk_size))?;
        let master = random::array::<NONCE_SIZE>()?;

        let sealed: Vec<Vec<u8>> = plaintext
            .par_chunks(chunk_size)
            .enumerate()
            .map_init(
                || cipher.clone(),
                |cipher, (i, chunk)| {
                    let mut record = Vec::with_capacity(chunk.len() + TAG_SIZE);
                    record.extend_from_slice(chunk);
                    let tag = cipher.seal(&chunk_nonce(&master, i as u64), &mut record)?;
                    record.extend_from_slice(&tag);
                    Ok(record)
                },
            )
            .collect::<Result<_>>()?;
        log::trace!("aes-gcm: sealed {} chunks in parallel", sealed.len());

        let tags = sealed.iter().map(|r| &r[r.len() - TAG_SIZE..]);
        let combined = combined_mac(key, tags)?.finalize().into_bytes();

        let body: usize = sealed.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(HEADER_SIZE + body + HMAC_SIZE);
        out.extend_from_slice(&master);
        out.extend_from_slice(&chunk_field.to_le_bytes());
        for record in &sealed {
            out.extend_from_slice(record);
        }
        out.extend_from_slice(&combined);
        Ok(out)
    }

    /// Decrypt the output of [`AesGcm::encrypt_parallel`] or
    /// [`AesGcm::encrypt_parallel_with_chunk_size`].
    ///
    /// The combined HMAC is checked first, then every chunk tag. Any
    /// failure rejects the whole input.
    ///
    /// # Errors
    /// Fails on a wrong key length, truncated or malformed framing, or
    /// [`Error::AuthenticationFailed`].
    pub fn decrypt_parallel(&self, framed: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let cipher = GcmCipher::new(key)?;
        check_len(framed, HEADER_SIZE + 1 + TAG_SIZE + HMAC_SIZE)?;

        let (header, rest) = framed.split_at(HEADER_SIZE);
        let (records, combined) = rest.split_at(rest.len() - HMAC_SIZE);

        let mut master = [0u8; NONCE_SIZE];
        master.copy_from_slice(&header[..NONCE_SIZE]);
        let mut chunk_field = [0u8; CHUNK_FIELD_SIZE];
        chunk_field.copy_from_slice(&header[NONCE_SIZE..]);
        let chunk_size = u32::from_le_bytes(chunk_field) as usize;
        if chunk_size == 0 {
            return Err(Error::MalformedCiphertext("zero chunk size"));
        }
        let record_size = chunk_size
            .checked_add(TAG_SIZE)
            .ok_or(Error::MalformedCiphertext("chunk size too large"))?;
        let last = records.len() % record_size;
        if last != 0 && last <= TAG_SIZE {
            return Err(Error::MalformedCiphertext("truncated final chunk"));
        }

        let tags = records.chunks(record_size).map(|r| &r[r.len() - TAG_SIZE..]);
        combined_mac(key, tags)?
            .verify_slice(combined)
            .map_err(|_| Error::AuthenticationFailed)?;

        let chunks: Vec<Vec<u8>> = records
            .par_chunks(record_size)
            .enumerate()
            .map_init(
                || cipher.clone(),
                |cipher, (i, record)| {
                    let (ciphertext, tag) = record.split_at(record.len() - TAG_SIZE);
                    let mut chunk = ciphertext.to_vec();
                    cipher.open(&chunk_nonce(&master, i as u64), &mut chunk, tag)?;
                    Ok(chunk)
                },
            )
            .collect::<Result<_>>()?;
        log::trace!("aes-gcm: opened {} chunks in parallel", chunks.len());

        Ok(chunks.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_nonces_xor_big_endian_index() {
        let master = [0xffu8; NONCE_SIZE];
        assert_eq!(chunk_nonce(&master, 0), master);
        let n = chunk_nonce(&master, 0x0102);
        assert_eq!(&n[..4], &[0xff; 4]);
        assert_eq!(&n[4..], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xfd]);
    }
}
