//! Telemetry utilities.

/// Standardized span constructors for invite observability.
pub mod spans {
    use peerinvite_proto::{FeedId, InviteKind};
    use tracing::{Span, info_span};

    /// Create a span for issuing an invite.
    pub fn issue(uses: u32, modern: bool) -> Span {
        info_span!("issue", uses, modern)
    }

    /// Create a span for serving `invite.use`.
    pub fn redeem(invite: &FeedId) -> Span {
        info_span!("redeem", invite = %invite)
    }

    /// Create a span for accepting an invite code.
    pub fn accept(kind: InviteKind) -> Span {
        info_span!("accept", kind = ?kind)
    }
}
