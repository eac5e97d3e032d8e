//! Unified error handling for peerinvite.
//!
//! Each layer has its own error enum; [`InviteError`] is what the invite
//! operations report to their callers, with the underlying cause attached.

use crate::rpc::RpcError;
use crate::social::SocialError;
use crate::store::StoreError;
use peerinvite_proto::ParseError;
use thiserror::Error;

// ============================================================================
// Invite Errors (issue, redeem, accept)
// ============================================================================

/// Errors raised by the invite lifecycle operations.
#[derive(Debug, Error)]
pub enum InviteError {
    #[error(
        "no address available for creating an invite, \
         configure [addresses] for this server"
    )]
    NoAddressAvailable,

    #[error("server has no public ip address, cannot create usable invitation")]
    NoPublicAddress,

    #[error("not a ws address: {0}")]
    NoWebSocketAddress(String),

    #[error("could not parse address: {0}")]
    AddressParse(#[from] ParseError),

    #[error("invite not found")]
    InviteNotFound,

    #[error("already following")]
    AlreadyFollowing,

    #[error("feed to follow is missing")]
    MissingFeed,

    #[error("invite has expired")]
    InviteExpired,

    #[error("could not connect to server: {0}")]
    ConnectFailure(#[source] RpcError),

    #[error("invite not accepted: {0}")]
    RedemptionRejected(#[source] RpcError),

    #[error("could not publish: {0}")]
    PublishFailure(#[source] SocialError),

    #[error("could not read follow graph: {0}")]
    FollowGraph(#[source] SocialError),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invite is being redeemed concurrently, try again")]
    Contended,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl InviteError {
    /// Get a static error code string, used on the wire and in logs.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoAddressAvailable => "no_address_available",
            Self::NoPublicAddress => "no_public_address",
            Self::NoWebSocketAddress(_) => "no_websocket_address",
            Self::AddressParse(_) => "address_parse_failure",
            Self::InviteNotFound => "invite_not_found",
            Self::AlreadyFollowing => "already_following",
            Self::MissingFeed => "missing_feed",
            Self::InviteExpired => "invite_expired",
            Self::ConnectFailure(_) => "connect_failure",
            Self::RedemptionRejected(_) => "redemption_rejected",
            Self::PublishFailure(_) => "publish_failure",
            Self::FollowGraph(_) => "follow_graph_failure",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Contended => "contended",
            Self::Store(_) => "store_error",
        }
    }

    /// Code carried by a remote rejection, if this error wraps one.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::ConnectFailure(RpcError::Remote { code, .. })
            | Self::RedemptionRejected(RpcError::Remote { code, .. }) => Some(code.as_str()),
            _ => None,
        }
    }
}

/// Result type for invite operations.
pub type InviteResult<T> = Result<T, InviteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case() {
        let errors = [
            InviteError::NoAddressAvailable,
            InviteError::NoPublicAddress,
            InviteError::InviteExpired,
            InviteError::Contended,
            InviteError::AddressParse(ParseError::Empty),
        ];
        for e in errors {
            let code = e.error_code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{code}");
        }
    }

    #[test]
    fn rejection_keeps_remote_code() {
        let err = InviteError::RedemptionRejected(RpcError::Remote {
            code: "already_following".into(),
            message: "already following".into(),
        });
        assert_eq!(err.remote_code(), Some("already_following"));
        assert!(err.to_string().starts_with("invite not accepted"));
        assert_eq!(InviteError::MissingFeed.remote_code(), None);
    }
}
