//! Driving Ports (API - Inbound)

use crate::domain::TransactionIntent;
use crate::error::FinalityResult;
use crate::ports::outbound::FlowSession;
use async_trait::async_trait;
use shared_types::SignedTransaction;

/// Coordinator side.
///
/// Sends each counterparty its role, then runs the ledger's finality flow over
/// every session not opened to ourselves.
#[async_trait]
pub trait ObserverAwareFinalityApi<S: FlowSession>: Send + Sync {
    /// Finalize `intent` with every party reachable through `sessions`.
    ///
    /// # Arguments
    /// * `intent` - Builder to sign, or an already signed transaction
    /// * `sessions` - At least one session per participant and redeem issuer
    ///   other than ourselves; any extra sessions are treated as observers
    ///
    /// # Returns
    /// * The transaction returned by the underlying finality flow
    async fn finalize(
        &self,
        intent: TransactionIntent,
        sessions: &[S],
    ) -> FinalityResult<SignedTransaction>;
}

/// Counterparty side. One call per inbound session.
#[async_trait]
pub trait ObserverAwareFinalityHandlerApi<S: FlowSession>: Send + Sync {
    /// Receive our role and record the transaction accordingly.
    ///
    /// Returns `None` when the session's counterparty is one of our own
    /// identities: nothing is received in that case.
    async fn handle(&self, session: &S) -> FinalityResult<Option<SignedTransaction>>;
}
