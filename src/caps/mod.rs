//! Capability grants and session authorization.
//!
//! Every inbound session presents a public key. The authenticator chain
//! decides which remote methods that key may call:
//!
//! 1. **[`Permissions`](permissions::Permissions)** - an `{allow, deny}`
//!    descriptor attached to a session.
//!
//! 2. **[`Authenticator`](authenticator::Authenticator)** - one source of
//!    authorization decisions. Sources compose by wrapping.
//!
//! 3. **[`InviteAuthHook`](hook::InviteAuthHook)** - wraps an existing
//!    authenticator and grants the temporary invite permission set to keys
//!    that match an unexhausted invite record.
//!
//! # Usage
//!
//! ```ignore
//! let master = MasterAuthenticator::new(vec![server_id.clone()]);
//! let auth = InviteAuthHook::new(Arc::new(master), store.clone());
//! match auth.authenticate(&peer).await? {
//!     AuthOutcome::Granted(perms) => { /* open session */ }
//!     AuthOutcome::Denied(reason) => { /* refuse with reason */ }
//!     AuthOutcome::NoOpinion => { /* refuse */ }
//! }
//! ```

mod authenticator;
mod hook;
mod permissions;

pub use authenticator::{AuthError, AuthOutcome, Authenticator, DenyReason, MasterAuthenticator};
pub use hook::{GrantLookup, InviteAuthHook, InviteGrant};
pub use permissions::{GET_ADDRESS, INVITE_ACCEPT, INVITE_CREATE, INVITE_USE, Permissions};
