use serde::Serialize;

use super::super::domain::{AwardTier, Store, StoreId, TierId};
use super::thresholds::required_count;

/// A tier a store has reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierMilestone {
    pub tier_id: TierId,
    pub tier_name: String,
    pub required: u32,
}

/// The next tier a store is working towards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextTier {
    pub tier_id: TierId,
    pub tier_name: String,
    pub required: u32,
    pub missing: u32,
}

/// Where a store stands on the tier ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreProgress {
    pub store_id: StoreId,
    pub positivations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved: Option<TierMilestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextTier>,
}

/// Places the store on the tier ladder ordered by `sort_order`.
///
/// Progress is informational only: a store lacking a region is measured against the primary
/// threshold here but still never enters a draw pool.
pub fn store_progress(store: &Store, tiers: &[AwardTier]) -> StoreProgress {
    let mut ladder: Vec<&AwardTier> = tiers.iter().collect();
    ladder.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));

    let positivations = store.positivation_count();
    let mut achieved = None;
    let mut next = None;

    for tier in ladder {
        let required = required_count(tier, store.region.as_ref());
        if positivations >= required {
            achieved = Some(TierMilestone {
                tier_id: tier.id.clone(),
                tier_name: tier.name.clone(),
                required,
            });
        } else if next.is_none() {
            next = Some(NextTier {
                tier_id: tier.id.clone(),
                tier_name: tier.name.clone(),
                required,
                missing: required - positivations,
            });
        }
    }

    StoreProgress {
        store_id: store.id.clone(),
        positivations,
        achieved,
        next,
    }
}
