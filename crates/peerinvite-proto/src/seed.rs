//! The 32-byte secret embedded in every invite code.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ParseError;

/// Length of an invite seed in bytes.
pub const SEED_LEN: usize = 32;

/// Secret seed from which the invite's bearer keypair is regenerated.
///
/// Zeroed on drop. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Wrap raw seed bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a standard-base64 seed.
    pub fn from_base64(s: &str) -> Result<Self, ParseError> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| ParseError::InvalidSeed(e.to_string()))?;
        let len = bytes.len();
        let bytes: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidSeed(format!("expected {SEED_LEN} bytes, got {len}")))?;
        Ok(Self(bytes))
    }

    /// Standard-base64 rendering used inside invite codes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Raw seed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}
