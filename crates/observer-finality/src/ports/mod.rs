//! Ports module for observer-aware finality
//!
//! Inbound ports are what a node runtime calls; outbound ports are the
//! collaborators the flows call into.

pub mod inbound;
pub mod outbound;

pub use inbound::{ObserverAwareFinalityApi, ObserverAwareFinalityHandlerApi};
pub use outbound::{
    FinalityGateway, FlowSession, IdentityService, KeyManagementService, ReceiveFinalityGateway,
    TransactionResolver,
};
