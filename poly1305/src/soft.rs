//! Portable Poly1305 using five 26-bit limbs ("donna-32").

use crate::{Key, Tag, BLOCK_SIZE};
use velocipher_core::endian;

const MASK: u32 = 0x03ff_ffff;

#[derive(Clone)]
pub(crate) struct State {
    r: [u32; 5],
    h: [u32; 5],
    pad: [u32; 4],
}

#[inline(always)]
fn le32(bytes: &[u8], at: usize) -> u32 {
    let mut w = [0u32; 1];
    endian::read_u32_le(&bytes[at..at + 4], &mut w);
    w[0]
}

impl State {
    pub(crate) fn new(key: &Key) -> Self {
        // r &= 0xffffffc0ffffffc0ffffffc0fffffff, split into 26-bit limbs
        let r = [
            le32(key, 0) & 0x03ff_ffff,
            (le32(key, 3) >> 2) & 0x03ff_ff03,
            (le32(key, 6) >> 4) & 0x03ff_c0ff,
            (le32(key, 9) >> 6) & 0x03f0_3fff,
            (le32(key, 12) >> 8) & 0x000f_ffff,
        ];

        let mut pad = [0u32; 4];
        endian::read_u32_le(&key[16..], &mut pad);

        Self { r, h: [0; 5], pad }
    }

    /// `h = (h + m) * r mod 2^130 - 5`. Full blocks carry the implicit
    /// 2^128 bit; a `partial` block has its `0x01` terminator in place.
    pub(crate) fn compute_block(&mut self, block: &[u8], partial: bool) {
        debug_assert_eq!(block.len(), BLOCK_SIZE);
        let hibit = if partial { 0 } else { 1 << 24 };

        let [r0, r1, r2, r3, r4] = self.r;
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let h0 = self.h[0] + (le32(block, 0) & MASK);
        let h1 = self.h[1] + ((le32(block, 3) >> 2) & MASK);
        let h2 = self.h[2] + ((le32(block, 6) >> 4) & MASK);
        let h3 = self.h[3] + ((le32(block, 9) >> 6) & MASK);
        let h4 = self.h[4] + ((le32(block, 12) >> 8) | hibit);

        let m = |a: u32, b: u32| u64::from(a) * u64::from(b);
        let d0 = m(h0, r0) + m(h1, s4) + m(h2, s3) + m(h3, s2) + m(h4, s1);
        let mut d1 = m(h0, r1) + m(h1, r0) + m(h2, s4) + m(h3, s3) + m(h4, s2);
        let mut d2 = m(h0, r2) + m(h1, r1) + m(h2, r0) + m(h3, s4) + m(h4, s3);
        let mut d3 = m(h0, r3) + m(h1, r2) + m(h2, r1) + m(h3, r0) + m(h4, s4);
        let mut d4 = m(h0, r4) + m(h1, r3) + m(h2, r2) + m(h3, r1) + m(h4, r0);

        let mut c = (d0 >> 26) as u32;
        let mut h0 = d0 as u32 & MASK;
        d1 += u64::from(c);
        c = (d1 >> 26) as u32;
        let mut h1 = d1 as u32 & MASK;
        d2 += u64::from(c);
        c = (d2 >> 26) as u32;
        let h2 = d2 as u32 & MASK;
        d3 += u64::from(c);
        c = (d3 >> 26) as u32;
        let h3 = d3 as u32 & MASK;
        d4 += u64::from(c);
        c = (d4 >> 26) as u32;
        let h4 = d4 as u32 & MASK;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= MASK;
        h1 += c;

        self.h = [h0, h1, h2, h3, h4];
    }

    /// Fully reduce `h`, add `s` and serialize the low 128 bits.
    pub(crate) fn finalize(&self) -> Tag {
        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        let mut c = h1 >> 26;
        h1 &= MASK;
        h2 += c;
        c = h2 >> 26;
        h2 &= MASK;
        h3 += c;
        c = h3 >> 26;
        h3 &= MASK;
        h4 += c;
        c = h4 >> 26;
        h4 &= MASK;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= MASK;
        h1 += c;

        // g = h + 5 - 2^130; keep g if it did not borrow
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= MASK;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= MASK;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= MASK;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= MASK;
        let mut g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        let mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        let mask = !mask;
        h0 = (h0 & mask) | g0;
        h1 = (h1 & mask) | g1;
        h2 = (h2 & mask) | g2;
        h3 = (h3 & mask) | g3;
        h4 = (h4 & mask) | g4;

        let words = [
            h0 | (h1 << 26),
            (h1 >> 6) | (h2 << 20),
            (h2 >> 12) | (h3 << 14),
            (h3 >> 18) | (h4 << 8),
        ];

        let mut out = [0u32; 4];
        let mut f = 0u64;
        for i in 0..4 {
            f = u64::from(words[i]) + u64::from(self.pad[i]) + (f >> 32);
            out[i] = f as u32;
        }

        let mut tag = [0u8; 16];
        endian::write_u32_le(&out, &mut tag);
        tag
    }

    #[cfg(feature = "zeroize")]
    pub(crate) fn zeroize(&mut self) {
        use zeroize::Zeroize;
        self.r.zeroize();
        self.h.zeroize();
        self.pad.zeroize();
    }
}
