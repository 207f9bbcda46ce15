//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the finality flows need from the rest of the node. Each port
//! returns [`FinalityResult`] so collaborator failures surface unchanged.

use crate::domain::{RetentionPolicy, TransactionIntent};
use crate::error::{FinalityError, FinalityResult};
use async_trait::async_trait;
use shared_types::{
    AbstractParty, LedgerTransaction, Party, PublicKey, SignedTransaction, TransactionBuilder,
};
use std::collections::BTreeSet;

/// An open channel to exactly one counterparty.
///
/// Owned by the caller. The flows never open or close sessions.
#[async_trait]
pub trait FlowSession: Send + Sync {
    /// Well-known identity on the other end
    fn counterparty(&self) -> &Party;

    /// Send one payload; completes once the transport has accepted it
    async fn send(&self, payload: Vec<u8>) -> FinalityResult<()>;

    /// Next payload, or `None` once the counterparty has closed the session
    async fn receive(&self) -> FinalityResult<Option<Vec<u8>>>;
}

/// Resolves a transaction's inputs to the states they consume.
#[async_trait]
pub trait TransactionResolver: Send + Sync {
    /// Fails with `TransactionResolution` if an input cannot be found
    async fn resolve(&self, intent: &TransactionIntent) -> FinalityResult<LedgerTransaction>;
}

/// Identity lookups. Deterministic and side-effect free.
pub trait IdentityService: Send + Sync {
    /// Our own legal identity
    fn our_identity(&self) -> Party;

    /// Well-known party behind `party`, if known
    fn well_known_party(&self, party: &AbstractParty) -> Option<Party>;

    /// Resolve every party, failing on the first unknown one
    fn well_known_parties(&self, parties: &[AbstractParty]) -> FinalityResult<Vec<Party>> {
        parties
            .iter()
            .map(|party| {
                self.well_known_party(party)
                    .ok_or_else(|| FinalityError::UnknownIdentity {
                        identity: party.to_string(),
                    })
            })
            .collect()
    }

    /// Whether `party` is one of our own identities
    fn is_legal_identity(&self, party: &Party) -> bool {
        *party == self.our_identity()
    }
}

/// Local key storage and signing.
#[async_trait]
pub trait KeyManagementService: Send + Sync {
    /// Subset of `keys` held by this node
    async fn filter_my_keys(&self, keys: &BTreeSet<PublicKey>) -> BTreeSet<PublicKey>;

    /// Sign a builder's transaction with each of `keys`
    ///
    /// Fails with `SigningKeyUnavailable` if any key is not held locally.
    async fn sign_initial_transaction(
        &self,
        builder: &TransactionBuilder,
        keys: &BTreeSet<PublicKey>,
    ) -> FinalityResult<SignedTransaction>;
}

/// The ledger's own finality flow: notarise, record, broadcast.
#[async_trait]
pub trait FinalityGateway<S: FlowSession>: Send + Sync {
    async fn finalize(
        &self,
        transaction: SignedTransaction,
        sessions: &[&S],
    ) -> FinalityResult<SignedTransaction>;
}

/// The counterparty half of the ledger's finality flow.
#[async_trait]
pub trait ReceiveFinalityGateway<S: FlowSession>: Send + Sync {
    async fn receive_finality(
        &self,
        session: &S,
        policy: RetentionPolicy,
    ) -> FinalityResult<SignedTransaction>;
}
