//! Invite codes.
//!
//! Two encodings exist in the wild:
//!
//! | Kind | Shape |
//! |------|-------|
//! | legacy plain | `<host>:<port>:<feed id>` |
//! | legacy with secret | `<host>:<port>:<feed id>~<base64 seed>` |
//! | modern | `<transport>~shs:<key>:<base64 seed>` |
//!
//! Classification is structural: a transport scheme prefix marks a modern
//! code, anything else is read as legacy.

use std::fmt;
use std::str::FromStr;

use crate::address::{split_host_port, MultiAddress, Transport};
use crate::error::ParseError;
use crate::feed::FeedId;
use crate::seed::Seed;

const MODERN_PREFIXES: [&str; 4] = ["net:", "onion:", "ws://", "wss://"];

/// Remove surrounding whitespace and one pair of surrounding double quotes.
pub fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Structural kind of an invite code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InviteKind {
    /// Legacy address without a secret.
    LegacyPlain,
    /// Legacy address with a `~seed` secret.
    LegacyWithSecret,
    /// Multiserver address with the seed appended to the `shs` segment.
    Modern,
}

/// `host:port:feed[~seed]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyInvite {
    /// Issuer host.
    pub host: String,
    /// Issuer port.
    pub port: u16,
    /// Issuer feed id.
    pub key: FeedId,
    /// Invite secret, absent for plain addresses.
    pub seed: Option<Seed>,
}

impl LegacyInvite {
    /// Rewrite into the modern encoding.
    ///
    /// Onion hosts get the `onion` transport, everything else `net`. The
    /// `shs` key is the feed id with its sigil and `.ed25519` suffix removed.
    pub fn to_modern(&self) -> Result<ModernInvite, ParseError> {
        let seed = self.seed.clone().ok_or(ParseError::MissingSeed)?;
        Ok(ModernInvite {
            remote: MultiAddress::new(Transport::for_host(self.host.clone(), self.port), &self.key),
            seed,
        })
    }
}

impl FromStr for LegacyInvite {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, seed) = match s.split_once('~') {
            Some((addr, seed)) => (addr, Some(Seed::from_base64(seed)?)),
            None => (s, None),
        };
        let (host_port, key) = addr
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidAddress(addr.to_string()))?;
        let key: FeedId = key.parse()?;
        let (host, port) = split_host_port(host_port, None)?;
        Ok(Self { host, port, key, seed })
    }
}

impl fmt::Display for LegacyInvite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.port, self.key)?;
        if let Some(seed) = &self.seed {
            write!(f, "~{}", seed.to_base64())?;
        }
        Ok(())
    }
}

/// `<multiserver address>:<seed>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModernInvite {
    /// Address of the issuing peer.
    pub remote: MultiAddress,
    /// Invite secret.
    pub seed: Seed,
}

impl ModernInvite {
    /// Feed id of the issuing peer.
    pub fn issuer(&self) -> Result<FeedId, ParseError> {
        self.remote.feed_id()
    }
}

impl FromStr for ModernInvite {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (transport, protocol) = s
            .split_once('~')
            .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;
        let mut parts = protocol.splitn(3, ':');
        let (name, key, seed) = (parts.next(), parts.next(), parts.next());
        if name != Some("shs") {
            return Err(ParseError::UnsupportedProtocol(protocol.to_string()));
        }
        let key = key.ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;
        let seed = seed.ok_or(ParseError::MissingSeed)?;
        FeedId::from_key_base64(key)?;
        Ok(Self {
            remote: MultiAddress {
                transport: transport.parse()?,
                key: key.to_string(),
            },
            seed: Seed::from_base64(seed)?,
        })
    }
}

impl fmt::Display for ModernInvite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.remote, self.seed.to_base64())
    }
}

/// Any invite code, classified by shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InviteCode {
    /// `host:port:feed[~seed]`.
    Legacy(LegacyInvite),
    /// `<transport>~shs:<key>:<seed>`.
    Modern(ModernInvite),
}

impl InviteCode {
    /// Structural kind of this code.
    pub fn kind(&self) -> InviteKind {
        match self {
            Self::Legacy(LegacyInvite { seed: None, .. }) => InviteKind::LegacyPlain,
            Self::Legacy(_) => InviteKind::LegacyWithSecret,
            Self::Modern(_) => InviteKind::Modern,
        }
    }

    /// Normalize into the modern representation.
    ///
    /// Fails with [`ParseError::MissingSeed`] for a legacy plain address.
    pub fn into_modern(self) -> Result<ModernInvite, ParseError> {
        match self {
            Self::Legacy(legacy) => legacy.to_modern(),
            Self::Modern(modern) => Ok(modern),
        }
    }
}

impl FromStr for InviteCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = strip_quotes(s);
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if MODERN_PREFIXES.iter().any(|prefix| s.starts_with(prefix)) {
            s.parse().map(Self::Modern)
        } else {
            s.parse().map(Self::Legacy)
        }
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy(legacy) => legacy.fmt(f),
            Self::Modern(modern) => modern.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> FeedId {
        FeedId::from_public_key(&[5u8; 32])
    }

    fn seed() -> Seed {
        Seed::from_bytes([6u8; 32])
    }

    #[test]
    fn strips_one_quote_pair() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("  \"abc\"\n"), "abc");
        assert_eq!(strip_quotes("\"abc"), "\"abc");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn classifies_legacy_plain() {
        let raw = format!("203.0.113.5:8008:{}", feed());
        let code: InviteCode = raw.parse().unwrap();
        assert_eq!(code.kind(), InviteKind::LegacyPlain);
        assert_eq!(code.to_string(), raw);
        assert_eq!(code.into_modern(), Err(ParseError::MissingSeed));
    }

    #[test]
    fn classifies_legacy_with_secret() {
        let raw = format!("203.0.113.5:8008:{}~{}", feed(), seed().to_base64());
        let code: InviteCode = raw.parse().unwrap();
        assert_eq!(code.kind(), InviteKind::LegacyWithSecret);
        assert_eq!(code.to_string(), raw);
    }

    #[test]
    fn legacy_converts_to_net_modern() {
        let raw = format!("203.0.113.5:8008:{}~{}", feed(), seed().to_base64());
        let modern = raw.parse::<InviteCode>().unwrap().into_modern().unwrap();
        assert_eq!(
            modern.to_string(),
            format!(
                "net:203.0.113.5:8008~shs:{}:{}",
                feed().key_base64(),
                seed().to_base64()
            )
        );
        assert_eq!(modern.issuer().unwrap(), feed());
    }

    #[test]
    fn legacy_onion_converts_to_onion_modern() {
        let raw = format!("abcdefgh.onion:8008:{}~{}", feed(), seed().to_base64());
        let modern = raw.parse::<InviteCode>().unwrap().into_modern().unwrap();
        assert_eq!(modern.remote.transport.scheme(), "onion");
    }

    #[test]
    fn parses_modern_websocket_code() {
        let raw = format!(
            "ws://pub.example.net:8989~shs:{}:{}",
            feed().key_base64(),
            seed().to_base64()
        );
        let code: InviteCode = raw.parse().unwrap();
        assert_eq!(code.kind(), InviteKind::Modern);
        let InviteCode::Modern(modern) = code else {
            panic!("expected modern code");
        };
        assert!(modern.remote.transport.is_websocket());
        assert_eq!(modern.seed, seed());
    }

    #[test]
    fn modern_without_seed_is_missing_seed() {
        let raw = format!("net:203.0.113.5:8008~shs:{}", feed().key_base64());
        assert_eq!(raw.parse::<InviteCode>(), Err(ParseError::MissingSeed));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<InviteCode>(), Err(ParseError::Empty));
        assert_eq!("\"\"".parse::<InviteCode>(), Err(ParseError::Empty));
        assert!("hello".parse::<InviteCode>().is_err());
        assert!("host:notaport:@x.ed25519~abc".parse::<InviteCode>().is_err());
    }
}
