//! Transaction resolution against the local vault

use crate::adapters::vault::InMemoryVault;
use crate::domain::TransactionIntent;
use crate::error::{FinalityError, FinalityResult};
use crate::ports::outbound::TransactionResolver;
use async_trait::async_trait;
use shared_types::{LedgerTransaction, StateAndRef};
use std::sync::Arc;

/// Resolves inputs from transactions already recorded locally. No backchain
/// fetching: an input whose transaction is unknown fails resolution.
pub struct VaultTransactionResolver {
    vault: Arc<InMemoryVault>,
}

impl VaultTransactionResolver {
    pub fn new(vault: Arc<InMemoryVault>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl TransactionResolver for VaultTransactionResolver {
    async fn resolve(&self, intent: &TransactionIntent) -> FinalityResult<LedgerTransaction> {
        let wtx = intent.wire_transaction();
        let inputs = wtx
            .inputs
            .iter()
            .map(|reference| {
                self.vault
                    .output_state(reference)
                    .map(|state| StateAndRef {
                        state,
                        reference: *reference,
                    })
                    .ok_or_else(|| FinalityError::TransactionResolution {
                        reason: format!(
                            "unknown input {}:{}",
                            hex::encode(reference.tx_id),
                            reference.index
                        ),
                    })
            })
            .collect::<FinalityResult<Vec<_>>>()?;

        Ok(LedgerTransaction {
            id: wtx.id(),
            notary: wtx.notary,
            inputs,
            outputs: wtx.outputs,
            commands: wtx.commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RetentionPolicy;
    use shared_types::{
        AbstractParty, CommandData, IssuedTokenType, Party, PublicKey, SignedTransaction, StateRef,
        TokenType, TransactionBuilder, TransactionState,
    };

    #[tokio::test]
    async fn test_resolves_recorded_inputs() {
        let issuer = Party::new("O=Issuer", PublicKey([9; 32]));
        let alice = Party::new("O=Alice", PublicKey([1; 32]));
        let token = IssuedTokenType::new(issuer.clone(), TokenType::new("GBP", 2));

        let vault = Arc::new(InMemoryVault::new([alice.owning_key]));
        let issued = TransactionBuilder::new(None)
            .add_output_state(TransactionState::held_by(token.clone(), 5, alice.clone()))
            .add_command(
                CommandData::IssueTokens {
                    token: token.clone(),
                },
                vec![issuer.owning_key],
            )
            .to_wire_transaction();
        let issued = SignedTransaction::new(issued, vec![]);
        vault.record(&issued, RetentionPolicy::RecordOnlyRelevant);

        let redeem = TransactionBuilder::new(None)
            .add_input_state(StateRef::new(issued.id(), 0))
            .add_command(
                CommandData::RedeemTokens { token },
                vec![alice.owning_key, issuer.owning_key],
            );
        let intent = TransactionIntent::from(redeem.clone());

        let ltx = VaultTransactionResolver::new(vault)
            .resolve(&intent)
            .await
            .unwrap();

        assert_eq!(ltx.id, redeem.to_wire_transaction().id());
        assert_eq!(ltx.inputs.len(), 1);
        assert_eq!(ltx.participants(), vec![AbstractParty::from(alice)]);
    }

    #[tokio::test]
    async fn test_unknown_input_fails() {
        let vault = Arc::new(InMemoryVault::new([PublicKey([1; 32])]));
        let intent = TransactionIntent::from(
            TransactionBuilder::new(None).add_input_state(StateRef::new([3u8; 32], 1)),
        );

        let err = VaultTransactionResolver::new(vault)
            .resolve(&intent)
            .await
            .unwrap_err();
        assert!(matches!(err, FinalityError::TransactionResolution { .. }));
    }
}
