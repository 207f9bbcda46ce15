//! # Shared Types Crate
//!
//! Ledger entities shared by the finality flows and their adapters.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, commands and transaction shapes are
//!   defined once here and consumed by every port and adapter.
//! - **Deterministic Ids**: a transaction id depends only on its content, so every
//!   party computes the same id for the same transaction.
//! - **Well-Known vs Anonymous**: states may carry anonymous keys; only
//!   [`Party`] values are used for session and role matching.

pub mod entities;
pub mod transaction;

pub use entities::*;
pub use transaction::*;
