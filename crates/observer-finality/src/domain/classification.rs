//! Role classification
//!
//! Pure decisions only; sending the roles happens in the service. The
//! finalizer computes:
//!
//! ```text
//! participants (well-known) ∪ redeem issuers  = ParticipantSet
//! ParticipantSet − local identity              = required counterparties
//! sessions − sessions to local identity        = final sessions
//! final session ∈ ParticipantSet ? PARTICIPANT : OBSERVER
//! ```

use crate::domain::role::TransactionRole;
use crate::error::{FinalityError, FinalityResult};
use shared_types::{Command, Party};
use std::collections::BTreeSet;

/// Issuers named by redeem commands.
///
/// A redeeming issuer is usually not a participant of any state (the tokens
/// are destroyed), but it must still record the transaction as one.
pub fn redeem_issuers(commands: &[Command]) -> BTreeSet<Party> {
    commands
        .iter()
        .filter_map(|c| c.value.redeemed_issuer())
        .cloned()
        .collect()
}

/// Well-known participants and redeem issuers of one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    parties: BTreeSet<Party>,
}

impl ParticipantSet {
    pub fn new(
        participants: impl IntoIterator<Item = Party>,
        issuers: impl IntoIterator<Item = Party>,
    ) -> Self {
        Self {
            parties: participants.into_iter().chain(issuers).collect(),
        }
    }

    pub fn contains(&self, party: &Party) -> bool {
        self.parties.contains(party)
    }

    /// Everyone that must get a session: the set minus ourselves.
    pub fn required_counterparties(&self, local: &Party) -> BTreeSet<Party> {
        self.parties.iter().filter(|p| *p != local).cloned().collect()
    }

    pub fn classify(&self, counterparty: &Party) -> TransactionRole {
        if self.contains(counterparty) {
            TransactionRole::Participant
        } else {
            TransactionRole::Observer
        }
    }
}

/// Fail unless every required counterparty has at least one session.
pub fn require_sessions_for<'a>(
    required: &BTreeSet<Party>,
    counterparties: impl IntoIterator<Item = &'a Party>,
) -> FinalityResult<()> {
    let covered: BTreeSet<&Party> = counterparties.into_iter().collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|p| !covered.contains(p))
        .map(|p| p.name.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FinalityError::MissingSessions { parties: missing })
    }
}

/// Role for one session, keyed by the session's index in the caller's list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleAssignment {
    pub session_index: usize,
    pub counterparty: Party,
    pub role: TransactionRole,
}

/// Roles for every final session, plus the sessions left out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RolePlan {
    pub assignments: Vec<RoleAssignment>,
    /// Indices of sessions whose counterparty is the local identity.
    pub excluded: Vec<usize>,
}

impl RolePlan {
    pub fn final_session_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments.iter().map(|a| a.session_index)
    }

    pub fn role_for(&self, counterparty: &Party) -> Option<TransactionRole> {
        self.assignments
            .iter()
            .find(|a| &a.counterparty == counterparty)
            .map(|a| a.role)
    }

    pub fn count(&self, role: TransactionRole) -> usize {
        self.assignments.iter().filter(|a| a.role == role).count()
    }
}

/// Assign a role to every session not opened to `local`.
pub fn plan_roles(participants: &ParticipantSet, counterparties: &[Party], local: &Party) -> RolePlan {
    let mut plan = RolePlan::default();
    for (session_index, counterparty) in counterparties.iter().enumerate() {
        if counterparty == local {
            plan.excluded.push(session_index);
            continue;
        }
        plan.assignments.push(RoleAssignment {
            session_index,
            counterparty: counterparty.clone(),
            role: participants.classify(counterparty),
        });
    }
    plan
}
