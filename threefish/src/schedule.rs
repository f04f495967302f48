//! Threefish-512 key schedule.

use crate::{Key, Tweak, SUBKEYS, WORDS};
use velocipher_core::endian;

/// Key schedule parity constant.
const C240: u64 = 0x1BD1_1BDA_A9FC_1A22;

/// The 19 subkeys of 8 words each, derived from a key and tweak.
#[derive(Clone)]
pub struct KeySchedule {
    subkeys: [[u64; WORDS]; SUBKEYS],
}

impl core::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("KeySchedule { .. }")
    }
}

impl KeySchedule {
    /// Expand `key` and `tweak`.
    ///
    /// The key is extended with the parity word `C240 ^ k0 ^ .. ^ k7` and the
    /// tweak with `t0 ^ t1`; subkey `s` is `k[(s + i) % 9]` for word `i`,
    /// with `t[s % 3]` added to word 0, `t[(s + 1) % 3]` to word 1 and the
    /// subkey index `s` to word 2.
    #[must_use]
    pub fn new(key: &Key, tweak: &Tweak) -> Self {
        let mut k = [0u64; WORDS + 1];
        endian::read_u64_le(key, &mut k[..WORDS]);
        k[WORDS] = k[..WORDS].iter().fold(C240, |acc, w| acc ^ w);

        let mut t = [0u64; 3];
        endian::read_u64_le(tweak, &mut t[..2]);
        t[2] = t[0] ^ t[1];

        let mut subkeys = [[0u64; WORDS]; SUBKEYS];
        for (s, subkey) in subkeys.iter_mut().enumerate() {
            for (i, word) in subkey.iter_mut().enumerate() {
                *word = k[(s + i) % (WORDS + 1)];
            }
            subkey[0] = subkey[0].wrapping_add(t[s % 3]);
            subkey[1] = subkey[1].wrapping_add(t[(s + 1) % 3]);
            subkey[2] = subkey[2].wrapping_add(s as u64);
        }

        Self { subkeys }
    }

    /// Subkey added before round `round`.
    #[inline(always)]
    pub(crate) fn for_round(&self, round: usize) -> &[u64; WORDS] {
        &self.subkeys[round % SUBKEYS]
    }

    /// All subkeys, in schedule order.
    #[must_use]
    pub fn subkeys(&self) -> &[[u64; WORDS]; SUBKEYS] {
        &self.subkeys
    }

    #[cfg(feature = "zeroize")]
    pub(crate) fn zeroize(&mut self) {
        use zeroize::Zeroize;
        self.subkeys.zeroize();
    }
}
