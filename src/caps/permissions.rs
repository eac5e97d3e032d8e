//! Permission descriptors and remote method names.

use serde::{Deserialize, Serialize};

/// Redeem one use of an invite.
pub const INVITE_USE: &str = "invite.use";
/// Ask a peer for its advertised address.
pub const GET_ADDRESS: &str = "getAddress";
/// Issue a new invite (master only).
pub const INVITE_CREATE: &str = "invite.create";
/// Redeem a code received out-of-band (local only).
pub const INVITE_ACCEPT: &str = "invite.accept";

/// An `{allow, deny}` capability grant.
///
/// `allow: None` means every method is allowed; `deny` is consulted first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub allow: Option<Vec<String>>,
    pub deny: Option<Vec<String>>,
}

impl Permissions {
    /// Grant carried by a fresh invite.
    pub fn invite() -> Self {
        Self {
            allow: Some(vec![INVITE_USE.to_string(), GET_ADDRESS.to_string()]),
            deny: None,
        }
    }

    /// Grant that allows nothing.
    pub fn none() -> Self {
        Self {
            allow: Some(Vec::new()),
            deny: None,
        }
    }

    /// Grant that allows everything.
    pub fn unrestricted() -> Self {
        Self {
            allow: None,
            deny: None,
        }
    }

    /// Whether `method` may be called under this grant.
    pub fn allows(&self, method: &str) -> bool {
        if self
            .deny
            .as_ref()
            .is_some_and(|deny| deny.iter().any(|m| m == method))
        {
            return false;
        }
        match &self.allow {
            Some(allow) => allow.iter().any(|m| m == method),
            None => true,
        }
    }

    /// Whether this grant allows no method at all.
    pub fn is_empty(&self) -> bool {
        matches!(&self.allow, Some(allow) if allow.is_empty())
    }
}
