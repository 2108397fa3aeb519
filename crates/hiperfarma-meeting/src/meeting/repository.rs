use serde::{Deserialize, Serialize};

use super::domain::{AwardTier, Store, StoreId, TierId, Vendor, VendorId};
use super::winners::WinnerLog;

/// Complete persisted state of one event; read and written as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub tiers: Vec<AwardTier>,
    #[serde(default)]
    pub winners: WinnerLog,
    #[serde(default)]
    pub sequence: u64,
}

impl EventSnapshot {
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
            && self.vendors.is_empty()
            && self.tiers.is_empty()
            && self.winners.is_empty()
    }

    /// Allocates the next record id, e.g. `store-000007`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{:06}", self.sequence)
    }

    pub fn store(&self, id: &StoreId) -> Option<&Store> {
        self.stores.iter().find(|store| &store.id == id)
    }

    pub fn store_mut(&mut self, id: &StoreId) -> Option<&mut Store> {
        self.stores.iter_mut().find(|store| &store.id == id)
    }

    pub fn vendor(&self, id: &VendorId) -> Option<&Vendor> {
        self.vendors.iter().find(|vendor| &vendor.id == id)
    }

    pub fn tier(&self, id: &TierId) -> Option<&AwardTier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    pub fn tier_mut(&mut self, id: &TierId) -> Option<&mut AwardTier> {
        self.tiers.iter_mut().find(|tier| &tier.id == id)
    }

    /// Tiers ordered the way they are presented to the operator.
    pub fn ordered_tiers(&self) -> Vec<&AwardTier> {
        let mut tiers: Vec<&AwardTier> = self.tiers.iter().collect();
        tiers.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        tiers
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EventRepository: Send + Sync {
    fn load(&self) -> Result<EventSnapshot, RepositoryError>;
    fn save(&self, snapshot: &EventSnapshot) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot io failure: {0}")]
    Io(#[from] std::io::Error),
}
