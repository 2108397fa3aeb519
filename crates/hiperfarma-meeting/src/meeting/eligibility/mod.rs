//! Per-tier qualification of stores for the sweepstake.
//!
//! Everything here is a pure function of the stores, tiers and winner log handed in. Callers
//! recompute on every request; nothing is cached between mutations.

mod progress;
mod thresholds;

pub use progress::{store_progress, NextTier, StoreProgress, TierMilestone};
pub use thresholds::required_count;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::domain::{AwardTier, Store, StoreId, SweepstakeWinnerRecord, TierId};
use super::winners::winning_store_ids;

/// Draw pool for a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierEligibility {
    pub tier_id: TierId,
    /// Unclamped; zero or negative means the tier is exhausted.
    pub remaining_slots: i64,
    pub eligible_stores: Vec<Store>,
}

impl TierEligibility {
    pub fn can_draw(&self) -> bool {
        self.remaining_slots > 0 && !self.eligible_stores.is_empty()
    }

    pub fn contains(&self, store_id: &StoreId) -> bool {
        self.eligible_stores.iter().any(|store| &store.id == store_id)
    }
}

pub type EligibilityMap = BTreeMap<TierId, TierEligibility>;

/// Computes the draw pool of every tier.
pub fn compute_eligibility(
    tiers: &[AwardTier],
    stores: &[Store],
    winners: &[SweepstakeWinnerRecord],
) -> EligibilityMap {
    let won = winning_store_ids(winners);
    tiers
        .iter()
        .map(|tier| (tier.id.clone(), evaluate_with(tier, stores, winners, &won)))
        .collect()
}

/// Computes the draw pool of one tier.
pub fn evaluate_tier(
    tier: &AwardTier,
    stores: &[Store],
    winners: &[SweepstakeWinnerRecord],
) -> TierEligibility {
    let won = winning_store_ids(winners);
    evaluate_with(tier, stores, winners, &won)
}

/// Whether `store` qualifies for `tier`, ignoring the winner log.
pub fn meets_requirements(tier: &AwardTier, store: &Store) -> bool {
    if !store.participating || !store.checked_in {
        return false;
    }
    match &store.region {
        Some(region) if !region.is_blank() => {
            store.positivation_count() >= required_count(tier, Some(region))
        }
        _ => false,
    }
}

fn evaluate_with(
    tier: &AwardTier,
    stores: &[Store],
    winners: &[SweepstakeWinnerRecord],
    won: &HashSet<&StoreId>,
) -> TierEligibility {
    let awarded = winners
        .iter()
        .filter(|record| record.tier_id == tier.id)
        .count();
    let remaining_slots =
        i64::from(tier.quantity_available) - i64::try_from(awarded).unwrap_or(i64::MAX);

    let eligible_stores = stores
        .iter()
        .filter(|store| !won.contains(&store.id) && meets_requirements(tier, store))
        .cloned()
        .collect();

    TierEligibility {
        tier_id: tier.id.clone(),
        remaining_slots,
        eligible_stores,
    }
}
