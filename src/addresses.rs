//! Advertised addresses and their classification.

use crate::config::AddressesConfig;
use ipnet::IpNet;
use peerinvite_proto::FeedId;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Reachability class of an advertised address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScope {
    Public,
    Local,
    Private,
}

/// Where a node's own advertised addresses come from.
pub trait AddressSource: Send + Sync {
    /// `;`-separated multiserver addresses for `scope`, if any.
    fn get_address(&self, scope: AddressScope) -> Option<String>;
}

/// Addresses taken from the `[addresses]` configuration section.
#[derive(Debug, Clone, Default)]
pub struct ConfigAddresses {
    public: Option<String>,
    local: Option<String>,
    private: Option<String>,
}

impl ConfigAddresses {
    /// Advertise every configured transport with `key` as the `shs` key.
    pub fn new(config: &AddressesConfig, key: &FeedId) -> Self {
        let join = |transports: &[String]| {
            if transports.is_empty() {
                None
            } else {
                Some(
                    transports
                        .iter()
                        .map(|t| format!("{t}~shs:{}", key.key_base64()))
                        .collect::<Vec<_>>()
                        .join(";"),
                )
            }
        };
        Self {
            public: join(&config.public),
            local: join(&config.local),
            private: join(&config.private),
        }
    }
}

impl AddressSource for ConfigAddresses {
    fn get_address(&self, scope: AddressScope) -> Option<String> {
        match scope {
            AddressScope::Public => self.public.clone(),
            AddressScope::Local => self.local.clone(),
            AddressScope::Private => self.private.clone(),
        }
    }
}

/// Pick the address list to embed in invites.
///
/// Only the public scope is considered unless `allow_private` is set, in
/// which case local and then private addresses are fallbacks.
pub fn invite_address(source: &dyn AddressSource, allow_private: bool) -> Option<String> {
    let public = source.get_address(AddressScope::Public);
    if !allow_private {
        return public;
    }
    public
        .or_else(|| source.get_address(AddressScope::Local))
        .or_else(|| source.get_address(AddressScope::Private))
}

fn private_nets() -> &'static [IpNet] {
    static NETS: OnceLock<Vec<IpNet>> = OnceLock::new();
    NETS.get_or_init(|| {
        [
            "10.0.0.0/8",
            "172.16.0.0/12",
            "192.168.0.0/16",
            "127.0.0.0/8",
            "169.254.0.0/16",
            "fc00::/7",
            "fe80::/10",
            "::1/128",
            "::/128",
        ]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
    })
}

/// Whether `host` cannot be dialed from outside the local network.
///
/// Empty hosts and `localhost` count as private. Hostnames other than
/// `localhost` are assumed to be public.
pub fn is_private_host(host: &str) -> bool {
    if host.is_empty() || host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let host = host.trim_start_matches('[').trim_end_matches(']');
    match host.parse::<IpAddr>() {
        Ok(ip) => {
            let ip = ip.to_canonical();
            private_nets().iter().any(|net| net.contains(&ip))
        }
        Err(_) => false,
    }
}
