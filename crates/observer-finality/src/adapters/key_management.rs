//! Ed25519 key management
//!
//! Signatures are over the 32-byte transaction id. Signing is deterministic,
//! so the same key and transaction always produce the same signature.

use crate::error::{FinalityError, FinalityResult};
use crate::ports::outbound::KeyManagementService;
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use parking_lot::RwLock;
use shared_types::{PublicKey, SignedTransaction, TransactionBuilder, TransactionSignature};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Public key for a 32-byte secret seed.
pub fn public_key_for_seed(seed: [u8; 32]) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&seed).verifying_key().to_bytes())
}

/// Check every signature on `stx` against its id.
///
/// Only validity is checked here, not completeness; see
/// [`SignedTransaction::missing_signers`] for that.
pub fn verify_signatures(stx: &SignedTransaction) -> Result<(), String> {
    let id = stx.id();
    for sig in &stx.sigs {
        let key = VerifyingKey::from_bytes(sig.by.as_bytes())
            .map_err(|_| format!("invalid public key {}", sig.by))?;
        let signature = ed25519_dalek::Signature::from_bytes(&sig.bytes);
        key.verify(&id, &signature)
            .map_err(|_| format!("bad signature by {}", sig.by))?;
    }
    Ok(())
}

/// Signing keys held in memory, indexed by public key.
#[derive(Default)]
pub struct InMemoryKeyManagement {
    keys: RwLock<HashMap<PublicKey, SigningKey>>,
}

impl InMemoryKeyManagement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key store holding one key per seed
    pub fn from_seeds(seeds: impl IntoIterator<Item = [u8; 32]>) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.add_seed(seed);
        }
        store
    }

    /// Add a key, returning its public half
    pub fn add_seed(&self, seed: [u8; 32]) -> PublicKey {
        let signing_key = SigningKey::from_bytes(&seed);
        let public = PublicKey(signing_key.verifying_key().to_bytes());
        self.keys.write().insert(public, signing_key);
        public
    }

    pub fn public_keys(&self) -> BTreeSet<PublicKey> {
        self.keys.read().keys().copied().collect()
    }

    /// Sign `stx`'s id with every key in `keys`
    pub fn sign(
        &self,
        stx: SignedTransaction,
        keys: &BTreeSet<PublicKey>,
    ) -> FinalityResult<SignedTransaction> {
        let id = stx.id();
        let store = self.keys.read();
        let sigs = keys
            .iter()
            .map(|key| {
                let signing_key =
                    store
                        .get(key)
                        .ok_or_else(|| FinalityError::SigningKeyUnavailable {
                            key: key.to_string(),
                        })?;
                Ok(TransactionSignature {
                    by: *key,
                    bytes: signing_key.sign(&id).to_bytes(),
                })
            })
            .collect::<FinalityResult<Vec<_>>>()?;
        Ok(stx.with_additional_signatures(sigs))
    }
}

#[async_trait]
impl KeyManagementService for InMemoryKeyManagement {
    async fn filter_my_keys(&self, keys: &BTreeSet<PublicKey>) -> BTreeSet<PublicKey> {
        let store = self.keys.read();
        keys.iter().filter(|k| store.contains_key(*k)).copied().collect()
    }

    async fn sign_initial_transaction(
        &self,
        builder: &TransactionBuilder,
        keys: &BTreeSet<PublicKey>,
    ) -> FinalityResult<SignedTransaction> {
        let unsigned = SignedTransaction::new(builder.to_wire_transaction(), vec![]);
        let stx = self.sign(unsigned, keys)?;
        debug!(
            tx_id = %hex::encode(stx.id()),
            signatures = stx.sigs.len(),
            "[finality] Initial transaction signed"
        );
        Ok(stx)
    }
}
