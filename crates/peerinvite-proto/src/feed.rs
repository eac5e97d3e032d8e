//! Feed identifiers.
//!
//! A feed id is the public half of an ed25519 keypair rendered as
//! `@<standard base64>.ed25519`. The same key appears bare (without sigil
//! and suffix) inside multiserver `shs` segments.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ParseError;

/// Length of an ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// A validated `@<base64>.ed25519` feed identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct FeedId(String);

impl FeedId {
    /// Leading sigil of every feed id.
    pub const SIGIL: char = '@';
    /// Algorithm suffix of every feed id.
    pub const SUFFIX: &'static str = ".ed25519";

    /// Build a feed id from raw public key bytes.
    pub fn from_public_key(key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        Self(format!("{}{}{}", Self::SIGIL, STANDARD.encode(key), Self::SUFFIX))
    }

    /// Build a feed id from the bare base64 key used in `shs` segments.
    pub fn from_key_base64(key: &str) -> Result<Self, ParseError> {
        decode_key(key).map_err(|_| ParseError::InvalidFeedId(key.to_string()))?;
        Ok(Self(format!("{}{}{}", Self::SIGIL, key, Self::SUFFIX)))
    }

    /// The full `@....ed25519` string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare base64 key: the id without its one-character sigil and
    /// eight-character suffix.
    #[inline]
    pub fn key_base64(&self) -> &str {
        &self.0[1..self.0.len() - Self::SUFFIX.len()]
    }

    /// Decoded public key bytes.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        // Validated on construction.
        decode_key(self.key_base64()).unwrap_or([0u8; PUBLIC_KEY_LEN])
    }
}

fn decode_key(key: &str) -> Result<[u8; PUBLIC_KEY_LEN], ()> {
    let bytes = STANDARD.decode(key).map_err(|_| ())?;
    bytes.try_into().map_err(|_| ())
}

impl FromStr for FeedId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .strip_prefix(Self::SIGIL)
            .and_then(|rest| rest.strip_suffix(Self::SUFFIX))
            .ok_or_else(|| ParseError::InvalidFeedId(s.to_string()))?;
        decode_key(key).map_err(|_| ParseError::InvalidFeedId(s.to_string()))?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for FeedId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeedId> for String {
    fn from(id: FeedId) -> Self {
        id.0
    }
}

impl AsRef<str> for FeedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", self.0)
    }
}
