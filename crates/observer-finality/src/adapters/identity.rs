//! In-memory identity service

use crate::ports::outbound::IdentityService;
use parking_lot::RwLock;
use shared_types::{AbstractParty, Party, PublicKey};
use std::collections::HashMap;

/// Network map held in memory: well-known parties plus any anonymous keys
/// this node has learned the owner of.
pub struct InMemoryIdentityService {
    us: Party,
    by_key: RwLock<HashMap<PublicKey, Party>>,
}

impl InMemoryIdentityService {
    pub fn new(us: Party) -> Self {
        let by_key = HashMap::from([(us.owning_key, us.clone())]);
        Self {
            us,
            by_key: RwLock::new(by_key),
        }
    }

    /// Add a well-known party
    pub fn register(&self, party: &Party) {
        self.by_key.write().insert(party.owning_key, party.clone());
    }

    /// Map an anonymous key to the party that owns it
    pub fn register_anonymous(&self, key: PublicKey, owner: &Party) {
        self.by_key.write().insert(key, owner.clone());
    }
}

impl IdentityService for InMemoryIdentityService {
    fn our_identity(&self) -> Party {
        self.us.clone()
    }

    fn well_known_party(&self, party: &AbstractParty) -> Option<Party> {
        match party {
            AbstractParty::WellKnown(p) => Some(p.clone()),
            AbstractParty::Anonymous(anon) => self.by_key.read().get(&anon.owning_key).cloned(),
        }
    }
}
