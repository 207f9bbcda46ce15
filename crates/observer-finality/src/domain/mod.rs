//! Domain module for observer-aware finality
//!
//! ## Core Modules
//! - role: transaction roles and retention policies
//! - intent: builder-or-signed input to the finalizer
//! - classification: participant sets, session coverage and role plans

pub mod classification;
pub mod intent;
pub mod role;

pub use classification::{
    plan_roles, redeem_issuers, require_sessions_for, ParticipantSet, RoleAssignment, RolePlan,
};
pub use intent::TransactionIntent;
pub use role::{RetentionPolicy, TransactionRole, ROLE_WIRE_LEN};
