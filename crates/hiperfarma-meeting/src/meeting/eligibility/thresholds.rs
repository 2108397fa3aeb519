use super::super::domain::{AwardTier, RegionCode};

/// Positivations a store from `region` needs to reach `tier`.
///
/// Only the secondary region can carry its own threshold; every other case, including a
/// store without a region, falls back to the primary-region value.
pub fn required_count(tier: &AwardTier, region: Option<&RegionCode>) -> u32 {
    match (region, tier.thresholds.secondary) {
        (Some(region), Some(threshold)) if region.is_secondary() => threshold,
        _ => tier.thresholds.primary,
    }
}
