//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports. Enough to run coordinator
//! and counterparties in one process over channel sessions.

mod finality;
mod identity;
mod key_management;
mod resolver;
mod session;
mod vault;

pub use finality::{SessionFinalityGateway, SessionReceiveFinality};
pub use identity::InMemoryIdentityService;
pub use key_management::{public_key_for_seed, verify_signatures, InMemoryKeyManagement};
pub use resolver::VaultTransactionResolver;
pub use session::ChannelSession;
pub use vault::InMemoryVault;
