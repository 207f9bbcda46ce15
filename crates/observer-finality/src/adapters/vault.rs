//! In-memory vault
//!
//! Two stores, as on a real node:
//! - transaction storage: every recorded transaction, in full
//! - vault: the states this node keeps, chosen by [`RetentionPolicy`]
//!
//! Input resolution reads transaction storage, so a node can resolve an input
//! it never kept as a state (e.g. an observer's view of someone else's holding).

use crate::domain::RetentionPolicy;
use parking_lot::RwLock;
use shared_types::{Hash, PublicKey, SignedTransaction, StateAndRef, StateRef, TransactionState};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

#[derive(Default)]
struct VaultStore {
    transactions: HashMap<Hash, SignedTransaction>,
    states: BTreeMap<StateRef, TransactionState>,
    consumed: BTreeSet<StateRef>,
}

pub struct InMemoryVault {
    owned_keys: BTreeSet<PublicKey>,
    store: RwLock<VaultStore>,
}

impl InMemoryVault {
    /// Empty vault for a node holding `owned_keys`
    pub fn new(owned_keys: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            owned_keys: owned_keys.into_iter().collect(),
            store: RwLock::new(VaultStore::default()),
        }
    }

    fn is_relevant(&self, state: &TransactionState) -> bool {
        self.owned_keys.iter().any(|k| state.has_participant_key(k))
    }

    /// Record `stx` and keep the output states `policy` selects.
    ///
    /// Inputs are marked consumed either way. Recording the same transaction
    /// again only adds states the new policy selects. Returns the number of
    /// states newly kept.
    pub fn record(&self, stx: &SignedTransaction, policy: RetentionPolicy) -> usize {
        let tx_id = stx.id();
        let mut store = self.store.write();

        let mut kept = 0;
        for (index, state) in stx.tx.outputs.iter().enumerate() {
            let keep = match policy {
                RetentionPolicy::RecordAllVisible => true,
                RetentionPolicy::RecordOnlyRelevant => self.is_relevant(state),
            };
            if keep {
                let reference = StateRef::new(tx_id, index as u32);
                if store.states.insert(reference, state.clone()).is_none() {
                    kept += 1;
                }
            }
        }
        store.consumed.extend(stx.tx.inputs.iter().copied());
        store.transactions.insert(tx_id, stx.clone());

        debug!(
            tx_id = %hex::encode(tx_id),
            %policy,
            kept,
            "[finality] Transaction recorded in vault"
        );
        kept
    }

    pub fn has_transaction(&self, tx_id: &Hash) -> bool {
        self.store.read().transactions.contains_key(tx_id)
    }

    pub fn transaction(&self, tx_id: &Hash) -> Option<SignedTransaction> {
        self.store.read().transactions.get(tx_id).cloned()
    }

    /// Output `reference` points at, from transaction storage
    pub fn output_state(&self, reference: &StateRef) -> Option<TransactionState> {
        self.store
            .read()
            .transactions
            .get(&reference.tx_id)
            .and_then(|stx| stx.tx.outputs.get(reference.index as usize))
            .cloned()
    }

    /// A kept state, consumed or not
    pub fn state(&self, reference: &StateRef) -> Option<TransactionState> {
        self.store.read().states.get(reference).cloned()
    }

    /// Kept states not yet consumed, in `StateRef` order
    pub fn unconsumed_states(&self) -> Vec<StateAndRef> {
        let store = self.store.read();
        store
            .states
            .iter()
            .filter(|(reference, _)| !store.consumed.contains(reference))
            .map(|(reference, state)| StateAndRef {
                state: state.clone(),
                reference: *reference,
            })
            .collect()
    }
}
