//! # Transactions
//!
//! The three shapes a transaction takes on its way to the ledger:
//!
//! ```text
//! TransactionBuilder ──sign──→ SignedTransaction (WireTransaction + sigs)
//!                                      │
//!                                      └──resolve inputs──→ LedgerTransaction
//! ```
//!
//! A `WireTransaction` only references its inputs by `StateRef`. Resolving those
//! references against a vault yields the `LedgerTransaction` whose participants
//! drive role classification.

use crate::entities::{
    AbstractParty, Command, CommandData, Hash, IssuedTokenType, Party, PublicKey, Signature,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Pointer to an output of a previously recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: Hash,
    pub index: u32,
}

impl StateRef {
    pub fn new(tx_id: Hash, index: u32) -> Self {
        Self { tx_id, index }
    }
}

/// A token holding produced or consumed by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    pub token: IssuedTokenType,
    pub amount: u64,
    /// Parties that must be informed of changes to this state.
    pub participants: Vec<AbstractParty>,
}

impl TransactionState {
    /// A fungible holding whose only participant is its holder.
    pub fn held_by(token: IssuedTokenType, amount: u64, holder: impl Into<AbstractParty>) -> Self {
        Self {
            token,
            amount,
            participants: vec![holder.into()],
        }
    }

    pub fn has_participant_key(&self, key: &PublicKey) -> bool {
        self.participants.iter().any(|p| p.owning_key() == *key)
    }
}

/// A resolved input: the state plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: TransactionState,
    pub reference: StateRef,
}

// =============================================================================
// BUILDER
// =============================================================================

/// Mutable transaction under construction. Not yet signed by anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    pub notary: Option<Party>,
    pub inputs: Vec<StateRef>,
    pub outputs: Vec<TransactionState>,
    pub commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new(notary: Option<Party>) -> Self {
        Self {
            notary,
            ..Self::default()
        }
    }

    pub fn add_input_state(mut self, reference: StateRef) -> Self {
        self.inputs.push(reference);
        self
    }

    pub fn add_output_state(mut self, state: TransactionState) -> Self {
        self.outputs.push(state);
        self
    }

    pub fn add_command(mut self, value: CommandData, signers: Vec<PublicKey>) -> Self {
        self.commands.push(Command::new(value, signers));
        self
    }

    /// Freeze the builder into its wire form.
    pub fn to_wire_transaction(&self) -> WireTransaction {
        WireTransaction {
            notary: self.notary.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            commands: self.commands.clone(),
        }
    }
}

// =============================================================================
// WIRE / SIGNED
// =============================================================================

/// Immutable transaction content. Its id is a SHA-256 digest over every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub notary: Option<Party>,
    pub inputs: Vec<StateRef>,
    pub outputs: Vec<TransactionState>,
    pub commands: Vec<Command>,
}

impl WireTransaction {
    /// Deterministic transaction id.
    pub fn id(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(b"observer-finality:tx:v1:");
        match &self.notary {
            Some(notary) => {
                hasher.update([1u8]);
                hash_party(&mut hasher, notary);
            }
            None => hasher.update([0u8]),
        }
        hasher.update((self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.tx_id);
            hasher.update(input.index.to_le_bytes());
        }
        hasher.update((self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            hash_state(&mut hasher, output);
        }
        hasher.update((self.commands.len() as u64).to_le_bytes());
        for command in &self.commands {
            hash_str(&mut hasher, command.value.name());
            hash_token(&mut hasher, command.value.token());
            hasher.update((command.signers.len() as u64).to_le_bytes());
            for signer in &command.signers {
                hasher.update(signer.0);
            }
        }
        hasher.finalize().into()
    }

    /// Union of all command signers.
    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        required_signers(&self.commands)
    }
}

/// A signature over a transaction id.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    #[serde_as(as = "Bytes")]
    pub bytes: Signature,
}

/// Wire transaction plus the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: WireTransaction,
    pub sigs: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: WireTransaction, sigs: Vec<TransactionSignature>) -> Self {
        Self { tx, sigs }
    }

    pub fn id(&self) -> Hash {
        self.tx.id()
    }

    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        self.tx.required_signing_keys()
    }

    pub fn signers(&self) -> BTreeSet<PublicKey> {
        self.sigs.iter().map(|s| s.by).collect()
    }

    /// Required keys that have not signed yet.
    pub fn missing_signers(&self) -> BTreeSet<PublicKey> {
        let signed = self.signers();
        self.required_signing_keys()
            .into_iter()
            .filter(|k| !signed.contains(k))
            .collect()
    }

    pub fn with_additional_signatures(
        mut self,
        sigs: impl IntoIterator<Item = TransactionSignature>,
    ) -> Self {
        self.sigs.extend(sigs);
        self
    }
}

// =============================================================================
// LEDGER VIEW
// =============================================================================

/// A transaction with every input resolved to the state it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub id: Hash,
    pub notary: Option<Party>,
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<TransactionState>,
    pub commands: Vec<Command>,
}

impl LedgerTransaction {
    /// Participants of consumed and produced states, first occurrence order.
    pub fn participants(&self) -> Vec<AbstractParty> {
        let mut seen = BTreeSet::new();
        self.inputs
            .iter()
            .map(|input| &input.state)
            .chain(self.outputs.iter())
            .flat_map(|state| state.participants.iter())
            .filter(|party| seen.insert((*party).clone()))
            .cloned()
            .collect()
    }

    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        required_signers(&self.commands)
    }
}

fn required_signers(commands: &[Command]) -> BTreeSet<PublicKey> {
    commands
        .iter()
        .flat_map(|c| c.signers.iter().copied())
        .collect()
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_party(hasher: &mut Sha256, party: &Party) {
    hash_str(hasher, &party.name);
    hasher.update(party.owning_key.0);
}

fn hash_token(hasher: &mut Sha256, token: &IssuedTokenType) {
    hash_party(hasher, &token.issuer);
    hash_str(hasher, &token.token_type.identifier);
    hasher.update(token.token_type.fraction_digits.to_le_bytes());
}

fn hash_state(hasher: &mut Sha256, state: &TransactionState) {
    hash_token(hasher, &state.token);
    hasher.update(state.amount.to_le_bytes());
    hasher.update((state.participants.len() as u64).to_le_bytes());
    for participant in &state.participants {
        match participant {
            AbstractParty::WellKnown(party) => {
                hasher.update([1u8]);
                hash_party(hasher, party);
            }
            AbstractParty::Anonymous(anon) => {
                hasher.update([0u8]);
                hasher.update(anon.owning_key.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TokenType;

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, PublicKey([seed; 32]))
    }

    fn gbp() -> IssuedTokenType {
        IssuedTokenType::new(party("O=Issuer", 9), TokenType::new("GBP", 2))
    }

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(Some(party("O=Notary", 7)))
            .add_output_state(TransactionState::held_by(gbp(), 100, party("O=Alice", 1)))
            .add_command(
                CommandData::IssueTokens { token: gbp() },
                vec![PublicKey([9; 32])],
            )
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = builder().to_wire_transaction();
        let b = builder().to_wire_transaction();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_id_changes_with_content() {
        let a = builder().to_wire_transaction();
        let b = builder()
            .add_output_state(TransactionState::held_by(gbp(), 1, party("O=Bob", 2)))
            .to_wire_transaction();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_missing_signers() {
        let wtx = builder()
            .add_command(CommandData::MoveTokens { token: gbp() }, vec![PublicKey([1; 32])])
            .to_wire_transaction();
        let stx = SignedTransaction::new(wtx, vec![]);
        assert_eq!(stx.missing_signers().len(), 2);

        let stx = stx.with_additional_signatures(vec![TransactionSignature {
            by: PublicKey([9; 32]),
            bytes: [0u8; 64],
        }]);
        let missing = stx.missing_signers();
        assert_eq!(missing.len(), 1);
        assert!(missing.contains(&PublicKey([1; 32])));
    }

    #[test]
    fn test_ledger_participants_deduplicated() {
        let alice = party("O=Alice", 1);
        let bob = party("O=Bob", 2);
        let ltx = LedgerTransaction {
            id: [0u8; 32],
            notary: None,
            inputs: vec![StateAndRef {
                state: TransactionState::held_by(gbp(), 10, alice.clone()),
                reference: StateRef::new([3u8; 32], 0),
            }],
            outputs: vec![
                TransactionState::held_by(gbp(), 5, bob.clone()),
                TransactionState::held_by(gbp(), 5, alice.clone()),
            ],
            commands: vec![],
        };

        let participants = ltx.participants();
        assert_eq!(
            participants,
            vec![AbstractParty::from(alice), AbstractParty::from(bob)]
        );
    }

    #[test]
    fn test_signed_transaction_bincode_roundtrip() {
        let stx = SignedTransaction::new(
            builder().to_wire_transaction(),
            vec![TransactionSignature {
                by: PublicKey([9; 32]),
                bytes: [5u8; 64],
            }],
        );
        let bytes = bincode::serialize(&stx).unwrap();
        let back: SignedTransaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(stx, back);
        assert_eq!(stx.id(), back.id());
    }
}
