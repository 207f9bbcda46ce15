//! Error types for the observer-aware finality flows
//!
//! Every failure aborts the whole run for the party that hit it. Collaborators
//! (resolver, identity service, sessions, signer, finality gateways) return
//! [`FinalityResult`] themselves, so their errors reach the caller unchanged.

use thiserror::Error;

/// Which side of the contract broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied inputs the flow cannot work with. Never retried.
    PreconditionViolation,
    /// The peer broke the role handshake.
    ProtocolViolation,
    /// A collaborator failed; surfaced as-is.
    DelegatedFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PreconditionViolation => "precondition",
            ErrorKind::ProtocolViolation => "protocol",
            ErrorKind::DelegatedFailure => "delegated",
        }
    }
}

/// Observer-aware finality errors
#[derive(Debug, Error)]
pub enum FinalityError {
    // =========================================================================
    // Precondition violations
    // =========================================================================
    /// Participants (or redeem issuers) with no session in the supplied list
    #[error("Flow sessions were not provided for the following transaction participants: {parties:?}")]
    MissingSessions { parties: Vec<String> },

    /// More sessions than the configured bound
    #[error("Too many sessions: got {count}, limit is {limit}")]
    TooManySessions { count: usize, limit: usize },

    /// A key required to sign is not held by this node
    #[error("Signing key not available locally: {key}")]
    SigningKeyUnavailable { key: String },

    // =========================================================================
    // Protocol violations
    // =========================================================================
    /// Session ended before the counterparty sent its role
    #[error("No transaction role received from {counterparty}")]
    RoleMissing { counterparty: String },

    /// Role payload could not be decoded
    #[error("Malformed transaction role from {counterparty}: {reason}")]
    MalformedRole { counterparty: String, reason: String },

    /// A second role arrived where the transaction was expected
    #[error("Duplicate transaction role from {counterparty}")]
    DuplicateRole { counterparty: String },

    // =========================================================================
    // Delegated failures
    // =========================================================================
    /// The transaction could not be resolved to its ledger form
    #[error("Transaction resolution failed: {reason}")]
    TransactionResolution { reason: String },

    /// An anonymous identity has no well-known mapping
    #[error("Unknown identity: {identity}")]
    UnknownIdentity { identity: String },

    /// The counterparty closed the session while a payload was expected
    #[error("Session with {counterparty} closed")]
    SessionClosed { counterparty: String },

    /// Underlying finality flow failed
    #[error("Finality failed: {reason}")]
    FinalityFailed { reason: String },

    /// Underlying receive-finality flow failed
    #[error("Receive finality failed: {reason}")]
    ReceiveFinalityFailed { reason: String },

    /// Payload encoding/decoding error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl FinalityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinalityError::MissingSessions { .. }
            | FinalityError::TooManySessions { .. }
            | FinalityError::SigningKeyUnavailable { .. } => ErrorKind::PreconditionViolation,
            FinalityError::RoleMissing { .. }
            | FinalityError::MalformedRole { .. }
            | FinalityError::DuplicateRole { .. } => ErrorKind::ProtocolViolation,
            FinalityError::TransactionResolution { .. }
            | FinalityError::UnknownIdentity { .. }
            | FinalityError::SessionClosed { .. }
            | FinalityError::FinalityFailed { .. }
            | FinalityError::ReceiveFinalityFailed { .. }
            | FinalityError::Serialization { .. } => ErrorKind::DelegatedFailure,
        }
    }

    pub fn is_precondition_violation(&self) -> bool {
        self.kind() == ErrorKind::PreconditionViolation
    }

    pub fn is_protocol_violation(&self) -> bool {
        self.kind() == ErrorKind::ProtocolViolation
    }
}

impl From<bincode::Error> for FinalityError {
    fn from(err: bincode::Error) -> Self {
        FinalityError::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Result type for finality operations
pub type FinalityResult<T> = Result<T, FinalityError>;
