//! Transaction roles and the retention policy each one implies
//!
//! Observers are not participants in any state, so recording with
//! `RecordOnlyRelevant` would leave them with nothing. They record every
//! visible output instead. This is all or nothing: an observer sees every
//! output of the transaction, so holders that must not see each other's
//! states belong in separate finalizations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded size of a role: bincode writes the variant tag as a `u32`.
pub const ROLE_WIRE_LEN: usize = 4;

/// Role a counterparty plays in a finalization. Sent once per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionRole {
    Participant,
    Observer,
}

impl TransactionRole {
    pub fn retention_policy(self) -> RetentionPolicy {
        RetentionPolicy::from(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionRole::Participant => "participant",
            TransactionRole::Observer => "observer",
        }
    }

    pub fn to_wire(self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(&self)
    }

    /// Decode a role payload. Anything but exactly one encoded role is rejected.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != ROLE_WIRE_LEN {
            return Err(format!(
                "expected {} bytes, got {}",
                ROLE_WIRE_LEN,
                bytes.len()
            ));
        }
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }
}

impl fmt::Display for TransactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which states a receiving node keeps from a finalized transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Every output state, whoever it belongs to
    RecordAllVisible,
    /// Only states with a participant key held by this node
    RecordOnlyRelevant,
}

impl RetentionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionPolicy::RecordAllVisible => "all_visible",
            RetentionPolicy::RecordOnlyRelevant => "only_relevant",
        }
    }
}

impl From<TransactionRole> for RetentionPolicy {
    fn from(role: TransactionRole) -> Self {
        match role {
            TransactionRole::Participant => RetentionPolicy::RecordOnlyRelevant,
            TransactionRole::Observer => RetentionPolicy::RecordAllVisible,
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
