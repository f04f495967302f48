use crate::STATE_WORDS;
use cfg_if::cfg_if;

pub(crate) mod soft;

cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        pub(crate) mod avx2;
        pub(crate) mod sse2;
    } else if #[cfg(all(target_arch = "aarch64", target_feature = "neon"))] {
        pub(crate) mod neon;
    }
}

/// State word indices held by each SIMD row, arranged so that a column
/// round is four lane-wise quarter rounds over rows `(a, b, c, d)`.
#[allow(dead_code)]
pub(crate) const DIAGONALS: [[usize; 4]; 4] = [
    [0, 5, 10, 15],
    [4, 9, 14, 3],
    [8, 13, 2, 7],
    [12, 1, 6, 11],
];

/// Position of each state word within the flattened [`DIAGONALS`] layout.
#[allow(dead_code)]
pub(crate) const DIAGONALS_INVERSE: [usize; STATE_WORDS] =
    [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];

#[inline(always)]
pub(crate) fn counter(state: &[u32; STATE_WORDS]) -> u64 {
    u64::from(state[8]) | (u64::from(state[9]) << 32)
}

#[inline(always)]
pub(crate) fn set_counter(state: &mut [u32; STATE_WORDS], pos: u64) {
    state[8] = pos as u32;
    state[9] = (pos >> 32) as u32;
}

/// `state` in diagonal order with both counter words cleared.
///
/// The low counter word lands in lane 0 of row `c`, the high word in lane 1
/// of row `b`; the SIMD backends OR the live counter into those lanes.
#[allow(dead_code)]
#[inline(always)]
pub(crate) fn diagonal_words(state: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut out = [0u32; STATE_WORDS];
    for (word, &i) in out.iter_mut().zip(DIAGONALS.iter().flatten()) {
        *word = state[i];
    }
    out[DIAGONALS_INVERSE[8]] = 0;
    out[DIAGONALS_INVERSE[9]] = 0;
    out
}

/// Serialize a block held in diagonal order as little-endian state words.
#[allow(dead_code)]
#[inline(always)]
pub(crate) fn write_diagonal(words: &[u32; STATE_WORDS], block: &mut [u8]) {
    for (chunk, &i) in block.chunks_exact_mut(4).zip(DIAGONALS_INVERSE.iter()) {
        chunk.copy_from_slice(&words[i].to_le_bytes());
    }
}
