use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::domain::{AwardTier, Store, SweepstakeWinnerRecord, TierId, WinnerId};
use crate::config::DrawConfig;

/// Precondition failures; no store is selected when one is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("no eligible store for this tier")]
    NoEligibleStores,
    #[error("no prize remaining for this tier")]
    NoSlotsRemaining,
}

/// Outcome of a draw that has not been written to the winner log yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDraw {
    pub tier_id: TierId,
    pub tier_name: String,
    pub reward_name: String,
    pub store: Store,
    /// Names cycled on screen before the reveal; unrelated to `store`.
    pub preview: Vec<String>,
    pub pool_size: usize,
    pub remaining_slots: i64,
}

impl PendingDraw {
    pub fn into_record(self, id: WinnerId, drawn_at: DateTime<Utc>) -> SweepstakeWinnerRecord {
        SweepstakeWinnerRecord {
            id,
            tier_id: self.tier_id,
            tier_name: self.tier_name,
            reward_name: self.reward_name,
            store_id: self.store.id.clone(),
            store_description: self.store.description(),
            drawn_at,
        }
    }
}

/// Uniform single-winner selection over an eligible pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepstakeDrawEngine {
    preview_frames: usize,
}

impl SweepstakeDrawEngine {
    pub fn new(preview_frames: usize) -> Self {
        Self { preview_frames }
    }

    pub fn from_config(config: &DrawConfig) -> Self {
        Self::new(config.preview_frames())
    }

    pub fn preview_frames(&self) -> usize {
        self.preview_frames
    }

    /// Picks one store with probability `1 / eligible.len()`.
    pub fn pick<'a, R>(
        &self,
        rng: &mut R,
        eligible: &'a [Store],
        remaining_slots: i64,
    ) -> Result<&'a Store, DrawError>
    where
        R: Rng + ?Sized,
    {
        if remaining_slots <= 0 {
            return Err(DrawError::NoSlotsRemaining);
        }
        eligible.choose(rng).ok_or(DrawError::NoEligibleStores)
    }

    /// Cycling list of names from an independently shuffled copy of the pool.
    pub fn preview<R>(&self, rng: &mut R, eligible: &[Store]) -> Vec<String>
    where
        R: Rng + ?Sized,
    {
        let mut shuffled: Vec<&Store> = eligible.iter().collect();
        shuffled.shuffle(rng);
        shuffled
            .iter()
            .cycle()
            .take(self.preview_frames)
            .map(|store| store.description())
            .collect()
    }

    /// Runs a full draw for `tier`: preconditions, cosmetic preview, then a fresh pick.
    pub fn draw<R>(
        &self,
        rng: &mut R,
        tier: &AwardTier,
        eligible: &[Store],
        remaining_slots: i64,
    ) -> Result<PendingDraw, DrawError>
    where
        R: Rng + ?Sized,
    {
        if remaining_slots <= 0 {
            return Err(DrawError::NoSlotsRemaining);
        }
        if eligible.is_empty() {
            return Err(DrawError::NoEligibleStores);
        }

        let preview = self.preview(rng, eligible);
        let winner = self.pick(rng, eligible, remaining_slots)?;

        Ok(PendingDraw {
            tier_id: tier.id.clone(),
            tier_name: tier.name.clone(),
            reward_name: tier.reward_name.clone(),
            store: winner.clone(),
            preview,
            pool_size: eligible.len(),
            remaining_slots,
        })
    }
}

impl Default for SweepstakeDrawEngine {
    fn default() -> Self {
        Self::from_config(&DrawConfig::default())
    }
}
