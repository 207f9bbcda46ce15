//! Session-based finality gateways
//!
//! A minimal stand-in for the ledger's own finality flow: no notarisation,
//! just signature checks, local recording and distribution.
//!
//! ```text
//! coordinator                                  counterparty
//! verify sigs ─→ record (only relevant)
//!             ─→ send bincode(stx) ──────────→ receive ─→ verify sigs ─→ record (policy)
//! ```

use crate::adapters::key_management::verify_signatures;
use crate::adapters::vault::InMemoryVault;
use crate::domain::{RetentionPolicy, TransactionRole};
use crate::error::{FinalityError, FinalityResult};
use crate::ports::outbound::{FinalityGateway, FlowSession, ReceiveFinalityGateway};
use async_trait::async_trait;
use shared_types::SignedTransaction;
use std::sync::Arc;
use tracing::{debug, warn};

fn check_fully_signed(stx: &SignedTransaction) -> Result<(), String> {
    let missing = stx.missing_signers();
    if !missing.is_empty() {
        let keys: Vec<String> = missing.iter().map(|k| k.to_string()).collect();
        return Err(format!("missing signatures from [{}]", keys.join(", ")));
    }
    verify_signatures(stx)
}

/// Coordinator half
pub struct SessionFinalityGateway {
    vault: Arc<InMemoryVault>,
}

impl SessionFinalityGateway {
    pub fn new(vault: Arc<InMemoryVault>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl<S: FlowSession> FinalityGateway<S> for SessionFinalityGateway {
    async fn finalize(
        &self,
        transaction: SignedTransaction,
        sessions: &[&S],
    ) -> FinalityResult<SignedTransaction> {
        check_fully_signed(&transaction).map_err(|reason| {
            warn!("[finality] Refusing to finalize: {}", reason);
            FinalityError::FinalityFailed { reason }
        })?;

        self.vault
            .record(&transaction, RetentionPolicy::RecordOnlyRelevant);

        let payload = bincode::serialize(&transaction)?;
        for session in sessions {
            session.send(payload.clone()).await?;
            debug!(to = %session.counterparty(), "[finality] Transaction distributed");
        }
        Ok(transaction)
    }
}

/// Counterparty half
pub struct SessionReceiveFinality {
    vault: Arc<InMemoryVault>,
}

impl SessionReceiveFinality {
    pub fn new(vault: Arc<InMemoryVault>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl<S: FlowSession> ReceiveFinalityGateway<S> for SessionReceiveFinality {
    async fn receive_finality(
        &self,
        session: &S,
        policy: RetentionPolicy,
    ) -> FinalityResult<SignedTransaction> {
        let payload = session
            .receive()
            .await?
            .ok_or_else(|| FinalityError::SessionClosed {
                counterparty: session.counterparty().name.clone(),
            })?;
        if TransactionRole::from_wire(&payload).is_ok() {
            warn!(
                from = %session.counterparty(),
                "[finality] Second role where a transaction was expected"
            );
            return Err(FinalityError::DuplicateRole {
                counterparty: session.counterparty().name.clone(),
            });
        }
        let stx: SignedTransaction = bincode::deserialize(&payload)?;

        check_fully_signed(&stx)
            .map_err(|reason| FinalityError::ReceiveFinalityFailed { reason })?;

        self.vault.record(&stx, policy);
        Ok(stx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::key_management::{public_key_for_seed, InMemoryKeyManagement};
    use crate::adapters::session::ChannelSession;
    use crate::ports::outbound::KeyManagementService;
    use shared_types::{
        CommandData, IssuedTokenType, Party, TokenType, TransactionBuilder, TransactionState,
    };
    use std::collections::BTreeSet;

    struct Setup {
        issuer: Party,
        holder: Party,
        builder: TransactionBuilder,
        kms: InMemoryKeyManagement,
    }

    fn setup() -> Setup {
        let issuer = Party::new("O=Issuer", public_key_for_seed([1u8; 32]));
        let holder = Party::new("O=Holder", public_key_for_seed([2u8; 32]));
        let token = IssuedTokenType::new(issuer.clone(), TokenType::new("GBP", 2));
        let builder = TransactionBuilder::new(None)
            .add_output_state(TransactionState::held_by(token.clone(), 50, holder.clone()))
            .add_command(CommandData::IssueTokens { token }, vec![issuer.owning_key]);
        Setup {
            issuer,
            holder,
            builder,
            kms: InMemoryKeyManagement::from_seeds([[1u8; 32]]),
        }
    }

    #[tokio::test]
    async fn test_distributes_and_records() {
        let s = setup();
        let stx = s
            .kms
            .sign_initial_transaction(&s.builder, &BTreeSet::from([s.issuer.owning_key]))
            .await
            .unwrap();

        let issuer_vault = Arc::new(InMemoryVault::new([s.issuer.owning_key]));
        let holder_vault = Arc::new(InMemoryVault::new([s.holder.owning_key]));
        let (to_holder, to_issuer) = ChannelSession::pair(&s.issuer, &s.holder);

        let finalized = SessionFinalityGateway::new(issuer_vault.clone())
            .finalize(stx.clone(), &[&to_holder])
            .await
            .unwrap();
        let received = SessionReceiveFinality::new(holder_vault.clone())
            .receive_finality(&to_issuer, RetentionPolicy::RecordOnlyRelevant)
            .await
            .unwrap();

        assert_eq!(finalized, stx);
        assert_eq!(received, stx);
        assert!(issuer_vault.has_transaction(&stx.id()));
        assert!(issuer_vault.unconsumed_states().is_empty());
        assert_eq!(holder_vault.unconsumed_states().len(), 1);
    }

    #[tokio::test]
    async fn test_unsigned_transaction_refused() {
        let s = setup();
        let unsigned = SignedTransaction::new(s.builder.to_wire_transaction(), vec![]);
        let vault = Arc::new(InMemoryVault::new([s.issuer.owning_key]));
        let (to_holder, _to_issuer) = ChannelSession::pair(&s.issuer, &s.holder);

        let err = SessionFinalityGateway::new(vault.clone())
            .finalize(unsigned.clone(), &[&to_holder])
            .await
            .unwrap_err();

        assert!(matches!(err, FinalityError::FinalityFailed { .. }));
        assert!(!vault.has_transaction(&unsigned.id()));
    }

    #[tokio::test]
    async fn test_receive_on_closed_session() {
        let s = setup();
        let vault = Arc::new(InMemoryVault::new([s.holder.owning_key]));
        let (to_holder, to_issuer) = ChannelSession::pair(&s.issuer, &s.holder);
        drop(to_holder);

        let err = SessionReceiveFinality::new(vault)
            .receive_finality(&to_issuer, RetentionPolicy::RecordAllVisible)
            .await
            .unwrap_err();
        assert!(matches!(err, FinalityError::SessionClosed { .. }));
    }

    #[tokio::test]
    async fn test_second_role_is_protocol_violation() {
        let s = setup();
        let vault = Arc::new(InMemoryVault::new([s.holder.owning_key]));
        let (to_holder, to_issuer) = ChannelSession::pair(&s.issuer, &s.holder);
        to_holder
            .send(TransactionRole::Observer.to_wire().unwrap())
            .await
            .unwrap();

        let err = SessionReceiveFinality::new(vault.clone())
            .receive_finality(&to_issuer, RetentionPolicy::RecordAllVisible)
            .await
            .unwrap_err();

        match &err {
            FinalityError::DuplicateRole { counterparty } => assert_eq!(counterparty, "O=Issuer"),
            other => panic!("expected DuplicateRole, got {other:?}"),
        }
        assert!(err.is_protocol_violation());
        assert!(vault.unconsumed_states().is_empty());
    }

    #[tokio::test]
    async fn test_receive_rejects_forged_signature() {
        let s = setup();
        let mut stx = s
            .kms
            .sign_initial_transaction(&s.builder, &BTreeSet::from([s.issuer.owning_key]))
            .await
            .unwrap();
        stx.sigs[0].bytes[10] ^= 0xff;

        let vault = Arc::new(InMemoryVault::new([s.holder.owning_key]));
        let (to_holder, to_issuer) = ChannelSession::pair(&s.issuer, &s.holder);
        to_holder
            .send(bincode::serialize(&stx).unwrap())
            .await
            .unwrap();

        let err = SessionReceiveFinality::new(vault.clone())
            .receive_finality(&to_issuer, RetentionPolicy::RecordOnlyRelevant)
            .await
            .unwrap_err();
        assert!(matches!(err, FinalityError::ReceiveFinalityFailed { .. }));
        assert!(!vault.has_transaction(&stx.id()));
    }
}
