//! Keypairs derived from invite seeds.
//!
//! Every invite carries a 32-byte seed. The issuer derives an ed25519
//! keypair from it to key the invite record; the acceptor derives the same
//! keypair to authenticate its one-time session.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use peerinvite_proto::{FeedId, Seed};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroize;

/// Generate a fresh random invite seed.
pub fn generate_seed() -> Seed {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let seed = Seed::from_bytes(bytes);
    bytes.zeroize();
    seed
}

/// An ed25519 signing keypair and its feed id.
pub struct Keypair {
    signing: SigningKey,
    id: FeedId,
}

impl Keypair {
    /// Deterministically derive a keypair from a seed.
    pub fn from_seed(seed: &Seed) -> Self {
        let signing = SigningKey::from_bytes(seed.as_bytes());
        let id = FeedId::from_public_key(signing.verifying_key().as_bytes());
        Self { signing, id }
    }

    /// Generate a keypair from fresh randomness.
    pub fn generate() -> Self {
        Self::from_seed(&generate_seed())
    }

    /// Public identity of this keypair.
    #[inline]
    pub fn id(&self) -> &FeedId {
        &self.id
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair").field("id", &self.id).finish()
    }
}

/// Check a signature made by `id` over `message`.
pub fn verify(id: &FeedId, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(&id.public_key()) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(signature)).is_ok()
}
