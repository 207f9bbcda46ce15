//! Observer-Aware Finality Handler - counterparty side
//!
//! State machine per run:
//! ```text
//! [AwaitingRole] ──role──→ [PolicyDerived] ──counterparty is us──→ [Done]
//!                                 │
//!                                 └──otherwise──→ [Delegating] ──→ [Done]
//! ```

use crate::domain::{RetentionPolicy, TransactionRole};
use crate::error::{FinalityError, FinalityResult};
use crate::metrics;
use crate::ports::inbound::ObserverAwareFinalityHandlerApi;
use crate::ports::outbound::{FlowSession, IdentityService, ReceiveFinalityGateway};
use async_trait::async_trait;
use shared_types::SignedTransaction;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Where a handler run is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerPhase {
    AwaitingRole,
    PolicyDerived(RetentionPolicy),
    Delegating(RetentionPolicy),
    Done,
}

impl HandlerPhase {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: &HandlerPhase) -> bool {
        matches!(
            (self, next),
            (HandlerPhase::AwaitingRole, HandlerPhase::PolicyDerived(_))
                | (HandlerPhase::PolicyDerived(_), HandlerPhase::Done)
                | (HandlerPhase::PolicyDerived(_), HandlerPhase::Delegating(_))
                | (HandlerPhase::Delegating(_), HandlerPhase::Done)
        )
    }

    fn advance(&mut self, next: HandlerPhase) {
        debug_assert!(
            self.can_transition_to(&next),
            "illegal handler transition {self:?} -> {next:?}"
        );
        trace!(from = ?self, to = ?next, "[finality] Handler phase");
        *self = next;
    }
}

/// Counterparty handler
pub struct ObserverAwareFinalityHandler<I, G> {
    identity: Arc<I>,
    receive: Arc<G>,
}

impl<I, G> ObserverAwareFinalityHandler<I, G>
where
    I: IdentityService,
{
    pub fn new(identity: Arc<I>, receive: Arc<G>) -> Self {
        Self { identity, receive }
    }
}

/// Read exactly one role from `session`.
pub async fn receive_role<S: FlowSession>(session: &S) -> FinalityResult<TransactionRole> {
    let counterparty = session.counterparty().name.clone();
    let payload = session
        .receive()
        .await?
        .ok_or_else(|| FinalityError::RoleMissing {
            counterparty: counterparty.clone(),
        })?;

    TransactionRole::from_wire(&payload)
        .map_err(|reason| FinalityError::MalformedRole { counterparty, reason })
}

#[async_trait]
impl<S, I, G> ObserverAwareFinalityHandlerApi<S> for ObserverAwareFinalityHandler<I, G>
where
    S: FlowSession,
    I: IdentityService + 'static,
    G: ReceiveFinalityGateway<S> + 'static,
{
    async fn handle(&self, session: &S) -> FinalityResult<Option<SignedTransaction>> {
        let mut phase = HandlerPhase::AwaitingRole;

        let role = receive_role(session).await?;
        let policy = role.retention_policy();
        phase.advance(HandlerPhase::PolicyDerived(policy));
        debug!(
            counterparty = %session.counterparty(),
            %role,
            %policy,
            "[finality] Role received"
        );

        if self.identity.is_legal_identity(session.counterparty()) {
            phase.advance(HandlerPhase::Done);
            metrics::record_handler_self_skip();
            debug!("[finality] Session is to ourselves, nothing to receive");
            return Ok(None);
        }

        phase.advance(HandlerPhase::Delegating(policy));
        let stx = self.receive.receive_finality(session, policy).await?;
        phase.advance(HandlerPhase::Done);

        metrics::record_handler_run(policy.as_str());
        info!(
            tx_id = %hex::encode(stx.id()),
            %policy,
            "[finality] Transaction recorded"
        );
        Ok(Some(stx))
    }
}
