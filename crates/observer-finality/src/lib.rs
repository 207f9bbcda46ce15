//! # observer-finality
//!
//! Observer-aware transaction finalization for a multi-party token ledger.
//!
//! ## Overview
//!
//! The ledger's standard finality flow records a transaction on each
//! counterparty keeping only the states that concern it. A party that is told
//! about a transaction without being in it (an observer: a regulator, an
//! auditor) would keep nothing. This crate wraps that flow:
//!
//! - **Finalizer**: tells every counterparty whether it is a `Participant` or an
//!   `Observer`, then runs the underlying finality flow
//! - **Handler**: receives its role, picks a retention policy, then runs the
//!   underlying receive flow with it
//! - **Redeem issuers**: an issuer taking back tokens is a participant even when
//!   it holds no state in the transaction
//!
//! ## Architecture
//!
//! ```text
//! Finalizer (A)                                   Handler (B, C, D)
//!     │                                               │
//!     ├── role ──────────────────────────────────────→├── policy = f(role)
//!     │   (every session, before finality)            │
//!     │                                               │
//!     └── FinalityGateway::finalize ── stx ──────────→└── ReceiveFinalityGateway
//!                                                          ::receive_finality(policy)
//! ```
//!
//! | Role | Retention policy |
//! |------|------------------|
//! | Participant | RecordOnlyRelevant |
//! | Observer | RecordAllVisible |
//!
//! ## Example
//!
//! ```rust,ignore
//! use observer_finality::{ObserverAwareFinalityService, FinalityConfig, TransactionIntent};
//! use observer_finality::ports::inbound::ObserverAwareFinalityApi;
//!
//! let service = ObserverAwareFinalityService::new(
//!     FinalityConfig::from_env(),
//!     resolver,
//!     identity,
//!     keys,
//!     finality,
//! );
//!
//! // Sessions to every participant and redeem issuer, plus any observers
//! let stx = service.finalize(TransactionIntent::Builder(builder), &sessions).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    plan_roles, redeem_issuers, ParticipantSet, RetentionPolicy, RoleAssignment, RolePlan,
    TransactionIntent, TransactionRole,
};
pub use error::{ErrorKind, FinalityError, FinalityResult};
pub use handler::{HandlerPhase, ObserverAwareFinalityHandler};
pub use ports::inbound::{ObserverAwareFinalityApi, ObserverAwareFinalityHandlerApi};
pub use ports::outbound::{
    FinalityGateway, FlowSession, IdentityService, KeyManagementService, ReceiveFinalityGateway,
    TransactionResolver,
};
pub use service::{ConfigError, FinalityConfig, ObserverAwareFinalityService, RoleDispatch};
