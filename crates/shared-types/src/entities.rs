//! # Core Ledger Entities
//!
//! Identities, token definitions and commands referenced by transactions.
//!
//! ## Clusters
//!
//! - **Identity**: `PublicKey`, `Party`, `AnonymousParty`, `AbstractParty`
//! - **Tokens**: `TokenType`, `IssuedTokenType`
//! - **Commands**: `CommandData`, `Command`

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte Ed25519 verifying key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes, hex encoded. Used in log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.short())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// A well-known identity: a legal name bound to its owning key.
///
/// Sessions are opened to parties, and roles are matched against them, so this
/// is the only identity form the finality flows compare on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    /// Legal name, e.g. `O=Bank A, L=London, C=GB`.
    pub name: String,
    /// Key the party signs with.
    pub owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }

    /// Strip the name, leaving only the key.
    pub fn anonymise(&self) -> AnonymousParty {
        AnonymousParty {
            owning_key: self.owning_key,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An identity known only by its key (confidential identities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnonymousParty {
    pub owning_key: PublicKey,
}

impl AnonymousParty {
    pub fn new(owning_key: PublicKey) -> Self {
        Self { owning_key }
    }
}

/// Either form of identity, as it appears on a state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbstractParty {
    WellKnown(Party),
    Anonymous(AnonymousParty),
}

impl AbstractParty {
    pub fn owning_key(&self) -> PublicKey {
        match self {
            AbstractParty::WellKnown(party) => party.owning_key,
            AbstractParty::Anonymous(anon) => anon.owning_key,
        }
    }

    pub fn as_well_known(&self) -> Option<&Party> {
        match self {
            AbstractParty::WellKnown(party) => Some(party),
            AbstractParty::Anonymous(_) => None,
        }
    }
}

impl From<Party> for AbstractParty {
    fn from(party: Party) -> Self {
        AbstractParty::WellKnown(party)
    }
}

impl From<AnonymousParty> for AbstractParty {
    fn from(anon: AnonymousParty) -> Self {
        AbstractParty::Anonymous(anon)
    }
}

impl fmt::Display for AbstractParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractParty::WellKnown(party) => write!(f, "{party}"),
            AbstractParty::Anonymous(anon) => write!(f, "anonymous:{}", anon.owning_key.short()),
        }
    }
}

// =============================================================================
// CLUSTER B: TOKENS
// =============================================================================

/// A token definition, e.g. `GBP` with two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenType {
    pub identifier: String,
    pub fraction_digits: u32,
}

impl TokenType {
    pub fn new(identifier: impl Into<String>, fraction_digits: u32) -> Self {
        Self {
            identifier: identifier.into(),
            fraction_digits,
        }
    }
}

/// A token type together with the party that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuedTokenType {
    pub issuer: Party,
    pub token_type: TokenType,
}

impl IssuedTokenType {
    pub fn new(issuer: Party, token_type: TokenType) -> Self {
        Self { issuer, token_type }
    }
}

impl fmt::Display for IssuedTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issued by {}", self.token_type.identifier, self.issuer)
    }
}

// =============================================================================
// CLUSTER C: COMMANDS
// =============================================================================

/// Token instruction carried by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandData {
    IssueTokens { token: IssuedTokenType },
    MoveTokens { token: IssuedTokenType },
    /// Tokens returned to and destroyed by their issuer.
    RedeemTokens { token: IssuedTokenType },
}

impl CommandData {
    pub fn token(&self) -> &IssuedTokenType {
        match self {
            CommandData::IssueTokens { token }
            | CommandData::MoveTokens { token }
            | CommandData::RedeemTokens { token } => token,
        }
    }

    /// Issuer of the redeemed token, for redeem commands only.
    pub fn redeemed_issuer(&self) -> Option<&Party> {
        match self {
            CommandData::RedeemTokens { token } => Some(&token.issuer),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandData::IssueTokens { .. } => "IssueTokens",
            CommandData::MoveTokens { .. } => "MoveTokens",
            CommandData::RedeemTokens { .. } => "RedeemTokens",
        }
    }
}

/// A command and the keys that must sign for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub value: CommandData,
    pub signers: Vec<PublicKey>,
}

impl Command {
    pub fn new(value: CommandData, signers: Vec<PublicKey>) -> Self {
        Self { value, signers }
    }
}
