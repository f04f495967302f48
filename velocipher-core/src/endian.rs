//! Little-endian conversions between byte slices and machine words.
//!
//! All functions process `min(words.len(), bytes.len() / N)` words; callers
//! size both sides to match.

/// Decode `bytes` into `words`, four bytes per word.
#[inline]
pub fn read_u32_le(bytes: &[u8], words: &mut [u32]) {
    debug_assert_eq!(bytes.len(), words.len() * 4);
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

/// Encode `words` into `bytes`, four bytes per word.
#[inline]
pub fn write_u32_le(words: &[u32], bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), words.len() * 4);
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

/// Decode `bytes` into `words`, eight bytes per word.
#[inline]
pub fn read_u64_le(bytes: &[u8], words: &mut [u64]) {
    debug_assert_eq!(bytes.len(), words.len() * 8);
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *word = u64::from_le_bytes(buf);
    }
}

/// Encode `words` into `bytes`, eight bytes per word.
#[inline]
pub fn write_u64_le(words: &[u64], bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), words.len() * 8);
    for (chunk, word) in bytes.chunks_exact_mut(8).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
