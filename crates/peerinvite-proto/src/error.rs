//! Error types for invite and address parsing.

use thiserror::Error;

/// Convenience type alias for Results using [`ParseError`].
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Failures while decoding feed ids, addresses, seeds and invite codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Input was empty after trimming quotes.
    #[error("empty input")]
    Empty,

    /// Feed identifier did not have the `@<base64>.ed25519` shape.
    #[error("invalid feed id: {0}")]
    InvalidFeedId(String),

    /// Multiserver or legacy address could not be split into its parts.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Port component was missing or not a number in range.
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// Transport prefix is not one of `net`, `onion`, `ws`, `wss`.
    #[error("unknown transport scheme: {0}")]
    UnknownScheme(String),

    /// Address carried a secret-handshake segment other than `shs`.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Invite code has no `~<seed>` secret.
    #[error("invite code has no secret seed")]
    MissingSeed,

    /// Seed was not base64 or did not decode to 32 bytes.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}
