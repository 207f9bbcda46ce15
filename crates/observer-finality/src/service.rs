//! Observer-Aware Finality Service - coordinator side
//!
//! ```text
//! resolve ─→ participants ∪ redeem issuers ─→ coverage check ─→ role plan
//!                                                                  │
//!   finalize ←── sign (builder only) ←── our signing keys ←── send roles
//! ```
//!
//! Every role is delivered before the underlying finality flow starts. A failed
//! send aborts the run, so finality never follows a partial role broadcast.

use crate::domain::{
    plan_roles, redeem_issuers, require_sessions_for, ParticipantSet, RolePlan,
    TransactionIntent, TransactionRole,
};
use crate::error::{FinalityError, FinalityResult};
use crate::metrics;
use crate::ports::inbound::ObserverAwareFinalityApi;
use crate::ports::outbound::{
    FinalityGateway, FlowSession, IdentityService, KeyManagementService, TransactionResolver,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use shared_types::{LedgerTransaction, Party, SignedTransaction};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown role dispatch mode: {0}")]
    UnknownRoleDispatch(String),

    #[error("Invalid session limit {0:?}: expected a positive integer")]
    InvalidMaxSessions(String),
}

/// How role messages are put on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RoleDispatch {
    /// One session after another, in the caller's session order
    #[default]
    Sequential,
    /// All sessions at once, joined before finality starts
    Concurrent,
}

impl FromStr for RoleDispatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(RoleDispatch::Sequential),
            "concurrent" => Ok(RoleDispatch::Concurrent),
            _ => Err(ConfigError::UnknownRoleDispatch(s.to_string())),
        }
    }
}

/// A session limit of zero would reject every finalization
fn parse_max_sessions(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::InvalidMaxSessions(value.to_string())),
    }
}

/// Finality configuration
#[derive(Clone, Debug)]
pub struct FinalityConfig {
    /// Sequential or concurrent role sends
    pub role_dispatch: RoleDispatch,
    /// Upper bound on sessions accepted per finalization
    pub max_sessions: usize,
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            role_dispatch: RoleDispatch::Sequential,
            max_sessions: 1024,
        }
    }
}

impl FinalityConfig {
    /// Read `OF_ROLE_DISPATCH` and `OF_MAX_SESSIONS`. Unset values keep their
    /// defaults; invalid ones are logged and also keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            role_dispatch: lookup("OF_ROLE_DISPATCH")
                .map(|v| or_default(v.parse(), defaults.role_dispatch))
                .unwrap_or(defaults.role_dispatch),
            max_sessions: lookup("OF_MAX_SESSIONS")
                .map(|v| or_default(parse_max_sessions(&v), defaults.max_sessions))
                .unwrap_or(defaults.max_sessions),
        }
    }
}

fn or_default<T: std::fmt::Debug>(parsed: Result<T, ConfigError>, default: T) -> T {
    parsed.unwrap_or_else(|e| {
        warn!("[finality] {}, using default {:?}", e, default);
        default
    })
}

/// Observer-aware finality service
pub struct ObserverAwareFinalityService<R, I, K, F>
where
    R: TransactionResolver,
    I: IdentityService,
    K: KeyManagementService,
{
    config: FinalityConfig,
    resolver: Arc<R>,
    identity: Arc<I>,
    keys: Arc<K>,
    finality: Arc<F>,
}

impl<R, I, K, F> ObserverAwareFinalityService<R, I, K, F>
where
    R: TransactionResolver,
    I: IdentityService,
    K: KeyManagementService,
{
    /// Create new finality service
    pub fn new(
        config: FinalityConfig,
        resolver: Arc<R>,
        identity: Arc<I>,
        keys: Arc<K>,
        finality: Arc<F>,
    ) -> Self {
        Self {
            config,
            resolver,
            identity,
            keys,
            finality,
        }
    }

    /// Well-known participants plus redeem issuers
    fn participant_set(&self, ltx: &LedgerTransaction) -> FinalityResult<ParticipantSet> {
        let participants = self.identity.well_known_parties(&ltx.participants())?;
        let issuers = redeem_issuers(&ltx.commands);
        Ok(ParticipantSet::new(participants, issuers))
    }

    async fn send_roles<S: FlowSession>(&self, plan: &RolePlan, sessions: &[S]) -> FinalityResult<()> {
        match self.config.role_dispatch {
            RoleDispatch::Sequential => {
                for assignment in &plan.assignments {
                    send_role(&sessions[assignment.session_index], assignment.role).await?;
                }
            }
            RoleDispatch::Concurrent => {
                try_join_all(
                    plan.assignments
                        .iter()
                        .map(|a| send_role(&sessions[a.session_index], a.role)),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Builders are signed with our required keys; signed transactions pass through
    async fn signed_transaction(
        &self,
        intent: TransactionIntent,
        ltx: &LedgerTransaction,
    ) -> FinalityResult<SignedTransaction> {
        match intent {
            TransactionIntent::Signed(stx) => Ok(stx),
            TransactionIntent::Builder(builder) => {
                let required = ltx.required_signing_keys();
                let our_keys = self.keys.filter_my_keys(&required).await;
                if our_keys.is_empty() {
                    let keys: Vec<String> = required.iter().map(|k| k.to_string()).collect();
                    return Err(FinalityError::SigningKeyUnavailable {
                        key: format!("none of [{}]", keys.join(", ")),
                    });
                }
                debug!("[finality] Signing with {} local key(s)", our_keys.len());
                self.keys.sign_initial_transaction(&builder, &our_keys).await
            }
        }
    }

    async fn run<S>(&self, intent: TransactionIntent, sessions: &[S]) -> FinalityResult<SignedTransaction>
    where
        S: FlowSession,
        F: FinalityGateway<S>,
    {
        if sessions.len() > self.config.max_sessions {
            return Err(FinalityError::TooManySessions {
                count: sessions.len(),
                limit: self.config.max_sessions,
            });
        }

        // 1. Resolve the ledger view
        let ltx = self.resolver.resolve(&intent).await?;
        debug!(tx_id = %hex::encode(ltx.id), "[finality] Transaction resolved");

        // 2-4. Participants and issuers, minus ourselves
        let us = self.identity.our_identity();
        let participants = self.participant_set(&ltx)?;
        let required = participants.required_counterparties(&us);

        // 5. Every required counterparty needs a session
        let counterparties: Vec<Party> = sessions.iter().map(|s| s.counterparty().clone()).collect();
        require_sessions_for(&required, counterparties.iter())?;

        // 6-7. Classify and notify
        let plan = plan_roles(&participants, &counterparties, &us);
        if !plan.excluded.is_empty() {
            debug!(
                "[finality] Ignoring {} session(s) to our own identity",
                plan.excluded.len()
            );
        }
        self.send_roles(&plan, sessions).await?;
        debug!(
            participants = plan.count(TransactionRole::Participant),
            observers = plan.count(TransactionRole::Observer),
            "[finality] Roles delivered"
        );

        // 8-9. Sign if needed
        let stx = self.signed_transaction(intent, &ltx).await?;

        // 10. Hand off to the ledger's finality flow
        let final_sessions: Vec<&S> = plan.final_session_indices().map(|i| &sessions[i]).collect();
        self.finality.finalize(stx, &final_sessions).await
    }
}

async fn send_role<S: FlowSession>(session: &S, role: TransactionRole) -> FinalityResult<()> {
    let payload = role.to_wire()?;
    session.send(payload).await?;
    metrics::record_role_sent(role.as_str());
    debug!(
        counterparty = %session.counterparty(),
        role = %role,
        "[finality] Role sent"
    );
    Ok(())
}

#[async_trait]
impl<S, R, I, K, F> ObserverAwareFinalityApi<S> for ObserverAwareFinalityService<R, I, K, F>
where
    S: FlowSession,
    R: TransactionResolver + 'static,
    I: IdentityService + 'static,
    K: KeyManagementService + 'static,
    F: FinalityGateway<S> + 'static,
{
    async fn finalize(
        &self,
        intent: TransactionIntent,
        sessions: &[S],
    ) -> FinalityResult<SignedTransaction> {
        let flow_id = Uuid::new_v4();
        let span = info_span!(
            "observer_aware_finality",
            %flow_id,
            intent = intent.kind(),
            sessions = sessions.len()
        );

        async move {
            info!("[finality] Observer-aware finality started");
            let result = self.run(intent, sessions).await;
            match &result {
                Ok(stx) => {
                    metrics::record_finalization_completed();
                    info!(tx_id = %hex::encode(stx.id()), "[finality] Observer-aware finality finished");
                }
                Err(e) => {
                    metrics::record_finalization_failed(e.kind().as_str());
                    warn!(kind = e.kind().as_str(), "[finality] Observer-aware finality failed: {}", e);
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}
