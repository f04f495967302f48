//! Error taxonomy shared by every framed cipher.

use thiserror::Error;

/// Result type of all framed cipher operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure of a framed cipher operation.
///
/// Input validation errors are raised before any cryptographic work starts.
/// [`Error::AuthenticationFailed`] never carries partial plaintext or any
/// hint of where the mismatch was.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Plaintext was empty.
    #[error("plaintext must not be empty")]
    EmptyPlaintext,

    /// Plaintext is longer than the framing can describe.
    #[error("plaintext of {actual} bytes exceeds the maximum of {maximum}")]
    PlaintextTooLong {
        /// Largest accepted plaintext length.
        maximum: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Key has the wrong length for the algorithm.
    #[error("invalid key length {actual}, expected {expected}")]
    InvalidKeyLength {
        /// Required key length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Framed input is shorter than the fixed overhead.
    #[error("ciphertext of {actual} bytes is shorter than the minimum of {minimum}")]
    CiphertextTooShort {
        /// Smallest possible framed length.
        minimum: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Framed input is structurally invalid.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(&'static str),

    /// Chunk size for parallel mode is zero or does not fit the 32-bit
    /// chunk size field.
    #[error("invalid chunk size {0}")]
    InvalidChunkSize(usize),

    /// Authentication tag did not verify.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Algorithm name was not recognized.
    #[error("unknown algorithm {0:?}")]
    UnknownAlgorithm(String),

    /// The operating system random number generator failed.
    #[error("random number generator failure: {0}")]
    Random(#[from] rand_core::Error),
}

/// Check `key` against the single accepted length `expected`.
pub(crate) fn check_key(key: &[u8], expected: usize) -> Result<()> {
    if key.len() != expected {
        return Err(Error::InvalidKeyLength {
            expected,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Check that `framed` holds at least `minimum` bytes.
pub(crate) fn check_len(framed: &[u8], minimum: usize) -> Result<()> {
    if framed.len() < minimum {
        return Err(Error::CiphertextTooShort {
            minimum,
            actual: framed.len(),
        });
    }
    Ok(())
}

/// Reject empty plaintext.
pub(crate) fn check_plaintext(plaintext: &[u8]) -> Result<()> {
    if plaintext.is_empty() {
        return Err(Error::EmptyPlaintext);
    }
    Ok(())
}
