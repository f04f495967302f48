//! Nonce, tweak and key generation from the operating system RNG.

use crate::Result;
use rand_core::{OsRng, RngCore};

/// Fill `buf` from the operating system CSPRNG.
pub(crate) fn fill(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf)?;
    Ok(())
}

/// A fresh random array, used for nonces and tweaks.
pub(crate) fn array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill(&mut out)?;
    Ok(out)
}

/// A fresh random key of `len` bytes.
pub(crate) fn key(len: usize) -> Result<Vec<u8>> {
    let mut key = vec![0u8; len];
    fill(&mut key)?;
    Ok(key)
}
