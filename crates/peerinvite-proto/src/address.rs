//! Multiserver addresses.
//!
//! A multiserver address pairs a transport with a secret-handshake key:
//!
//! ```text
//! net:203.0.113.5:8008~shs:<base64 key>
//! onion:abcdef.onion:8008~shs:<base64 key>
//! ws://203.0.113.5:8989~shs:<base64 key>
//! ```
//!
//! A peer may advertise several of these joined with `;`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::feed::FeedId;

/// Network transport of a multiserver address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transport {
    /// Plain TCP (`net:host:port`).
    Net {
        /// Hostname or IP literal.
        host: String,
        /// TCP port.
        port: u16,
    },
    /// Tor hidden service (`onion:host:port`).
    Onion {
        /// `.onion` hostname.
        host: String,
        /// Virtual port.
        port: u16,
    },
    /// WebSocket (`ws://host:port` or `wss://host:port`).
    Ws {
        /// Whether the socket is TLS-wrapped (`wss`).
        secure: bool,
        /// Hostname or IP literal.
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl Transport {
    /// Plain TCP for ordinary hosts, onion for `.onion` hosts.
    pub fn for_host(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        if host.ends_with(".onion") {
            Self::Onion { host, port }
        } else {
            Self::Net { host, port }
        }
    }

    /// Scheme name (`net`, `onion`, `ws`, `wss`).
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Net { .. } => "net",
            Self::Onion { .. } => "onion",
            Self::Ws { secure: false, .. } => "ws",
            Self::Ws { secure: true, .. } => "wss",
        }
    }

    /// Hostname component.
    pub fn host(&self) -> &str {
        match self {
            Self::Net { host, .. } | Self::Onion { host, .. } | Self::Ws { host, .. } => host,
        }
    }

    /// Port component.
    pub fn port(&self) -> u16 {
        match self {
            Self::Net { port, .. } | Self::Onion { port, .. } | Self::Ws { port, .. } => *port,
        }
    }

    /// Whether this transport is a websocket.
    #[inline]
    pub fn is_websocket(&self) -> bool {
        matches!(self, Self::Ws { .. })
    }
}

impl FromStr for Transport {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("wss://") {
            let (host, port) = split_host_port(rest, Some(443))?;
            return Ok(Self::Ws { secure: true, host, port });
        }
        if let Some(rest) = s.strip_prefix("ws://") {
            let (host, port) = split_host_port(rest, Some(80))?;
            return Ok(Self::Ws { secure: false, host, port });
        }
        let (scheme, rest) = s
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;
        match scheme {
            "net" => {
                let (host, port) = split_host_port(rest, None)?;
                Ok(Self::Net { host, port })
            }
            "onion" => {
                let (host, port) = split_host_port(rest, None)?;
                Ok(Self::Onion { host, port })
            }
            other => Err(ParseError::UnknownScheme(other.to_string())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Net { host, port } => write!(f, "net:{host}:{port}"),
            Self::Onion { host, port } => write!(f, "onion:{host}:{port}"),
            Self::Ws { secure, host, port } => {
                let scheme = if *secure { "wss" } else { "ws" };
                write!(f, "{scheme}://{host}:{port}")
            }
        }
    }
}

/// Split `host:port`, tolerating a trailing path on websocket addresses and
/// IPv6 hosts (the port is always the last `:` segment).
pub(crate) fn split_host_port(
    s: &str,
    default_port: Option<u16>,
) -> Result<(String, u16), ParseError> {
    let s = s.split('/').next().unwrap_or(s);
    if s.is_empty() {
        return Err(ParseError::InvalidAddress(s.to_string()));
    }
    match s.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ParseError::InvalidPort(port.to_string()))?;
            Ok((host.trim_start_matches('[').trim_end_matches(']').to_string(), port))
        }
        _ => match default_port {
            Some(port) => Ok((s.to_string(), port)),
            None => Err(ParseError::InvalidPort(s.to_string())),
        },
    }
}

/// A transport plus the secret-handshake public key of the peer behind it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiAddress {
    /// How to reach the peer.
    pub transport: Transport,
    /// Bare base64 ed25519 key (no sigil, no suffix).
    pub key: String,
}

impl MultiAddress {
    /// Pair a transport with a peer feed id.
    pub fn new(transport: Transport, feed: &FeedId) -> Self {
        Self {
            transport,
            key: feed.key_base64().to_string(),
        }
    }

    /// Feed id of the peer behind this address.
    pub fn feed_id(&self) -> Result<FeedId, ParseError> {
        FeedId::from_key_base64(&self.key)
    }

    /// Hostname component of the transport.
    #[inline]
    pub fn host(&self) -> &str {
        self.transport.host()
    }

    /// Port component of the transport.
    #[inline]
    pub fn port(&self) -> u16 {
        self.transport.port()
    }
}

impl FromStr for MultiAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (transport, protocol) = s
            .split_once('~')
            .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;
        let key = match protocol.split_once(':') {
            Some(("shs", key)) => key,
            _ => return Err(ParseError::UnsupportedProtocol(protocol.to_string())),
        };
        FeedId::from_key_base64(key)?;
        Ok(Self {
            transport: transport.parse()?,
            key: key.to_string(),
        })
    }
}

impl fmt::Display for MultiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~shs:{}", self.transport, self.key)
    }
}

/// Parse a `;`-separated list of multiserver addresses.
///
/// Empty entries are skipped; any malformed entry fails the whole list.
pub fn parse_address_list(s: &str) -> Result<Vec<MultiAddress>, ParseError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
