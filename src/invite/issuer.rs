//! Invite issuance.

use super::{CreateOptions, InviteOptions};
use crate::addresses::{AddressSource, invite_address, is_private_host};
use crate::error::{InviteError, InviteResult};
use crate::keys::{Keypair, generate_seed};
use crate::store::{InviteRecord, InviteStore};
use crate::telemetry::spans;
use peerinvite_proto::{LegacyInvite, MultiAddress, Seed, parse_address_list};
use std::sync::Arc;
use tracing::{Instrument, info};

pub struct InviteIssuer {
    store: Arc<dyn InviteStore>,
    addresses: Arc<dyn AddressSource>,
    allow_private: bool,
}

impl InviteIssuer {
    pub fn new(
        store: Arc<dyn InviteStore>,
        addresses: Arc<dyn AddressSource>,
        allow_private: bool,
    ) -> Self {
        Self {
            store,
            addresses,
            allow_private,
        }
    }

    /// Issue a new invite and return its code.
    ///
    /// Nothing is written unless a usable address was found.
    pub async fn create(&self, opts: impl Into<CreateOptions>) -> InviteResult<String> {
        let opts = opts.into().resolve();
        let span = spans::issue(opts.uses, opts.modern);
        self.create_resolved(opts).instrument(span).await
    }

    async fn create_resolved(&self, opts: InviteOptions) -> InviteResult<String> {
        let advertised = invite_address(self.addresses.as_ref(), self.allow_private)
            .ok_or(InviteError::NoAddressAvailable)?;
        let addresses = parse_address_list(&advertised)?;
        let primary = addresses.first().ok_or(InviteError::NoAddressAvailable)?;

        let host = opts.external.as_deref().unwrap_or(primary.host());
        if !self.allow_private && is_private_host(host) {
            return Err(InviteError::NoPublicAddress);
        }

        let websocket = if opts.modern {
            Some(websocket_address(&addresses)?)
        } else {
            None
        };

        let seed = generate_seed();
        let keys = Keypair::from_seed(&seed);
        let record = InviteRecord::new(keys.id().clone(), opts.uses, opts.note.clone());
        self.store.put(keys.id(), &record).await?;
        info!(invite = %keys.id(), uses = record.total, "invite created");

        let code = match websocket {
            Some(remote) => format!("{remote}:{}", seed.to_base64()),
            None => legacy_code(primary, host, seed)?,
        };
        Ok(code)
    }
}

/// First websocket entry of the advertised list.
fn websocket_address(addresses: &[MultiAddress]) -> InviteResult<&MultiAddress> {
    addresses
        .iter()
        .find(|addr| addr.transport.is_websocket())
        .ok_or_else(|| {
            InviteError::NoWebSocketAddress(
                addresses
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )
        })
}

fn legacy_code(primary: &MultiAddress, host: &str, seed: Seed) -> InviteResult<String> {
    let invite = LegacyInvite {
        host: host.to_string(),
        port: primary.port(),
        key: primary.feed_id()?,
        seed: Some(seed),
    };
    Ok(invite.to_string())
}
