use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    AwardTier, PositivationDetail, Store, StoreDraft, StoreId, SweepstakeWinnerRecord, TierDraft,
    TierId, Vendor, VendorDraft, VendorId, WinnerId,
};
use super::draw::{DrawError, PendingDraw, SweepstakeDrawEngine};
use super::eligibility::{compute_eligibility, evaluate_tier, store_progress, StoreProgress};
use super::repository::{EventRepository, EventSnapshot, RepositoryError};
use super::validation::{self, ValidationError};
use super::winners::WinnerLogError;

/// Per-tier line of the eligibility overview shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierOverview {
    pub tier: AwardTier,
    pub awarded: usize,
    pub remaining_slots: i64,
    pub eligible_stores: Vec<Store>,
}

/// Service composing the repository, record validation and the sweepstake core.
pub struct MeetingService<R> {
    repository: Arc<R>,
    engine: SweepstakeDrawEngine,
    rng: Mutex<StdRng>,
    write_lock: Mutex<()>,
}

impl<R> MeetingService<R>
where
    R: EventRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: SweepstakeDrawEngine) -> Self {
        Self::with_rng(repository, engine, StdRng::from_entropy())
    }

    pub fn with_rng(repository: Arc<R>, engine: SweepstakeDrawEngine, rng: StdRng) -> Self {
        Self {
            repository,
            engine,
            rng: Mutex::new(rng),
            write_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Result<EventSnapshot, MeetingServiceError> {
        Ok(self.repository.load()?)
    }

    /// Serializes a full read-modify-write cycle; nothing is saved when `op` fails.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut EventSnapshot) -> Result<T, MeetingServiceError>,
    ) -> Result<T, MeetingServiceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = self.repository.load()?;
        let value = op(&mut snapshot)?;
        self.repository.save(&snapshot)?;
        Ok(value)
    }

    /// Replaces an empty event with `seed`. Returns `false` when data already exists.
    pub fn seed_if_empty(&self, seed: EventSnapshot) -> Result<bool, MeetingServiceError> {
        validation::validate_snapshot(&seed)?;
        self.mutate(|snapshot| {
            if !snapshot.is_empty() {
                debug!("event already holds data, skipping seed");
                return Ok(false);
            }
            *snapshot = seed;
            info!(
                stores = snapshot.stores.len(),
                vendors = snapshot.vendors.len(),
                tiers = snapshot.tiers.len(),
                "seeded event with mock data"
            );
            Ok(true)
        })
    }

    pub fn create_store(&self, draft: StoreDraft) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            let store = Store {
                id: StoreId(snapshot.next_id("store")),
                code: draft.code.trim().to_string(),
                name: draft.name.trim().to_string(),
                participating: draft.participating,
                checked_in: false,
                region: draft.region,
                link: draft.link,
                positivations: Vec::new(),
            };
            validation::validate_store(&snapshot.stores, &store)?;
            snapshot.stores.push(store.clone());
            info!(store_id = %store.id, code = %store.code, "store registered");
            Ok(store)
        })
    }

    pub fn update_store(
        &self,
        store_id: &StoreId,
        draft: StoreDraft,
    ) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            let mut store = snapshot
                .store(store_id)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
            store.code = draft.code.trim().to_string();
            store.name = draft.name.trim().to_string();
            store.participating = draft.participating;
            store.region = draft.region;
            store.link = draft.link;
            validation::validate_store(&snapshot.stores, &store)?;

            if let Some(slot) = snapshot.store_mut(store_id) {
                *slot = store.clone();
            }
            info!(store_id = %store.id, "store updated");
            Ok(store)
        })
    }

    pub fn delete_store(&self, store_id: &StoreId) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            validation::ensure_store_removable(&snapshot.stores, store_id)?;
            let index = snapshot
                .stores
                .iter()
                .position(|store| &store.id == store_id)
                .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
            let removed = snapshot.stores.remove(index);
            info!(store_id = %removed.id, "store removed");
            Ok(removed)
        })
    }

    pub fn set_check_in(
        &self,
        store_id: &StoreId,
        checked_in: bool,
    ) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            let store = snapshot
                .store_mut(store_id)
                .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
            store.checked_in = checked_in;
            info!(store_id = %store.id, checked_in, "check-in updated");
            Ok(store.clone())
        })
    }

    pub fn create_vendor(&self, draft: VendorDraft) -> Result<Vendor, MeetingServiceError> {
        self.mutate(|snapshot| {
            let vendor = Vendor {
                id: VendorId(snapshot.next_id("vendor")),
                name: draft.name.trim().to_string(),
                logo: draft.logo,
            };
            validation::validate_vendor(&vendor)?;
            snapshot.vendors.push(vendor.clone());
            info!(vendor_id = %vendor.id, "vendor registered");
            Ok(vendor)
        })
    }

    pub fn delete_vendor(&self, vendor_id: &VendorId) -> Result<Vendor, MeetingServiceError> {
        self.mutate(|snapshot| {
            validation::ensure_vendor_removable(&snapshot.stores, vendor_id)?;
            let index = snapshot
                .vendors
                .iter()
                .position(|vendor| &vendor.id == vendor_id)
                .ok_or_else(|| ValidationError::UnknownVendor(vendor_id.clone()))?;
            let removed = snapshot.vendors.remove(index);
            info!(vendor_id = %removed.id, "vendor removed");
            Ok(removed)
        })
    }

    /// Records a vendor's positivation of a store; a vendor positivates a store at most once.
    pub fn record_positivation(
        &self,
        store_id: &StoreId,
        vendor_id: &VendorId,
    ) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            let vendor = snapshot
                .vendor(vendor_id)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownVendor(vendor_id.clone()))?;
            let store = snapshot
                .store_mut(store_id)
                .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
            validation::ensure_new_positivation(store, vendor_id)?;

            store.positivations.push(PositivationDetail {
                vendor_id: vendor.id,
                vendor_name: vendor.name,
                vendor_logo: vendor.logo,
                recorded_at: Utc::now(),
            });
            info!(
                store_id = %store.id,
                vendor_id = %vendor_id,
                total = store.positivations.len(),
                "positivation recorded"
            );
            Ok(store.clone())
        })
    }

    pub fn remove_positivation(
        &self,
        store_id: &StoreId,
        vendor_id: &VendorId,
    ) -> Result<Store, MeetingServiceError> {
        self.mutate(|snapshot| {
            let store = snapshot
                .store_mut(store_id)
                .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
            let before = store.positivations.len();
            store
                .positivations
                .retain(|detail| &detail.vendor_id != vendor_id);
            if store.positivations.len() == before {
                return Err(ValidationError::UnknownVendor(vendor_id.clone()).into());
            }
            info!(store_id = %store.id, vendor_id = %vendor_id, "positivation removed");
            Ok(store.clone())
        })
    }

    pub fn create_tier(&self, draft: TierDraft) -> Result<AwardTier, MeetingServiceError> {
        self.mutate(|snapshot| {
            let tier = AwardTier {
                id: TierId(snapshot.next_id("tier")),
                name: draft.name.trim().to_string(),
                reward_name: draft.reward_name.trim().to_string(),
                quantity_available: draft.quantity_available,
                thresholds: draft.thresholds,
                sort_order: draft.sort_order,
            };
            validation::validate_tier(&tier)?;
            snapshot.tiers.push(tier.clone());
            info!(tier_id = %tier.id, name = %tier.name, "award tier created");
            Ok(tier)
        })
    }

    pub fn update_tier(
        &self,
        tier_id: &TierId,
        draft: TierDraft,
    ) -> Result<AwardTier, MeetingServiceError> {
        self.mutate(|snapshot| {
            let tier = AwardTier {
                id: tier_id.clone(),
                name: draft.name.trim().to_string(),
                reward_name: draft.reward_name.trim().to_string(),
                quantity_available: draft.quantity_available,
                thresholds: draft.thresholds,
                sort_order: draft.sort_order,
            };
            validation::validate_tier(&tier)?;
            let slot = snapshot
                .tier_mut(tier_id)
                .ok_or_else(|| ValidationError::UnknownTier(tier_id.clone()))?;
            *slot = tier.clone();
            info!(tier_id = %tier.id, "award tier updated");
            Ok(tier)
        })
    }

    pub fn delete_tier(&self, tier_id: &TierId) -> Result<AwardTier, MeetingServiceError> {
        self.mutate(|snapshot| {
            validation::ensure_tier_removable(&snapshot.winners, tier_id)?;
            let index = snapshot
                .tiers
                .iter()
                .position(|tier| &tier.id == tier_id)
                .ok_or_else(|| ValidationError::UnknownTier(tier_id.clone()))?;
            let removed = snapshot.tiers.remove(index);
            info!(tier_id = %removed.id, "award tier removed");
            Ok(removed)
        })
    }

    /// Fresh per-tier draw pools, in presentation order.
    pub fn eligibility(&self) -> Result<Vec<TierOverview>, MeetingServiceError> {
        let snapshot = self.repository.load()?;
        let mut pools = compute_eligibility(
            &snapshot.tiers,
            &snapshot.stores,
            snapshot.winners.records(),
        );

        Ok(snapshot
            .ordered_tiers()
            .into_iter()
            .filter_map(|tier| {
                pools.remove(&tier.id).map(|pool| TierOverview {
                    awarded: snapshot.winners.count_for_tier(&tier.id),
                    tier: tier.clone(),
                    remaining_slots: pool.remaining_slots,
                    eligible_stores: pool.eligible_stores,
                })
            })
            .collect())
    }

    /// Draws a winner for the tier without touching the winner log.
    ///
    /// Dropping the returned [`PendingDraw`] is how a draw is cancelled.
    pub fn draw(&self, tier_id: &TierId) -> Result<PendingDraw, MeetingServiceError> {
        let snapshot = self.repository.load()?;
        let tier = snapshot
            .tier(tier_id)
            .ok_or_else(|| ValidationError::UnknownTier(tier_id.clone()))?;
        let pool = evaluate_tier(tier, &snapshot.stores, snapshot.winners.records());

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        match self
            .engine
            .draw(&mut *rng, tier, &pool.eligible_stores, pool.remaining_slots)
        {
            Ok(pending) => {
                info!(
                    tier_id = %tier.id,
                    store_id = %pending.store.id,
                    pool = pending.pool_size,
                    "sweepstake drawn, awaiting confirmation"
                );
                Ok(pending)
            }
            Err(err) => {
                warn!(tier_id = %tier.id, error = %err, "sweepstake draw refused");
                Err(err.into())
            }
        }
    }

    /// Commits a drawn store to the winner log after re-checking a fresh pool.
    pub fn confirm_draw(
        &self,
        tier_id: &TierId,
        store_id: &StoreId,
    ) -> Result<SweepstakeWinnerRecord, MeetingServiceError> {
        self.mutate(|snapshot| {
            let tier = snapshot
                .tier(tier_id)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownTier(tier_id.clone()))?;
            let pool = evaluate_tier(&tier, &snapshot.stores, snapshot.winners.records());

            if pool.remaining_slots <= 0 {
                return Err(DrawError::NoSlotsRemaining.into());
            }
            if let Some(existing) = snapshot.winners.winner_for_store(store_id) {
                return Err(WinnerLogError::StoreAlreadyWon {
                    store_id: store_id.clone(),
                    tier_id: existing.tier_id.clone(),
                }
                .into());
            }
            let store = pool
                .eligible_stores
                .iter()
                .find(|store| &store.id == store_id)
                .cloned()
                .ok_or_else(|| MeetingServiceError::StoreNotEligible {
                    store_id: store_id.clone(),
                    tier_id: tier_id.clone(),
                })?;

            let record = SweepstakeWinnerRecord {
                id: WinnerId(snapshot.next_id("winner")),
                tier_id: tier.id.clone(),
                tier_name: tier.name.clone(),
                reward_name: tier.reward_name.clone(),
                store_id: store.id.clone(),
                store_description: store.description(),
                drawn_at: Utc::now(),
            };
            let record = snapshot.winners.record(record)?.clone();
            info!(
                tier_id = %record.tier_id,
                store_id = %record.store_id,
                winner_id = %record.id,
                remaining = pool.remaining_slots - 1,
                "sweepstake winner confirmed"
            );
            Ok(record)
        })
    }

    /// Draws and immediately confirms, for unattended runs such as the CLI demo.
    pub fn draw_and_confirm(
        &self,
        tier_id: &TierId,
    ) -> Result<(PendingDraw, SweepstakeWinnerRecord), MeetingServiceError> {
        let pending = self.draw(tier_id)?;
        let record = self.confirm_draw(tier_id, &pending.store.id)?;
        Ok((pending, record))
    }

    pub fn winners(&self) -> Result<Vec<SweepstakeWinnerRecord>, MeetingServiceError> {
        Ok(self.repository.load()?.winners.records().to_vec())
    }

    pub fn reset_winner(
        &self,
        winner_id: &WinnerId,
    ) -> Result<SweepstakeWinnerRecord, MeetingServiceError> {
        self.mutate(|snapshot| {
            let removed = snapshot.winners.remove(winner_id)?;
            info!(winner_id = %removed.id, store_id = %removed.store_id, "winner record reset");
            Ok(removed)
        })
    }

    pub fn reset_tier_winners(&self, tier_id: &TierId) -> Result<usize, MeetingServiceError> {
        self.mutate(|snapshot| {
            if snapshot.tier(tier_id).is_none() {
                return Err(ValidationError::UnknownTier(tier_id.clone()).into());
            }
            let removed = snapshot.winners.reset_tier(tier_id);
            info!(tier_id = %tier_id, removed, "tier winners reset");
            Ok(removed)
        })
    }

    pub fn reset_all_winners(&self) -> Result<usize, MeetingServiceError> {
        self.mutate(|snapshot| {
            let removed = snapshot.winners.reset_all();
            info!(removed, "all winners reset");
            Ok(removed)
        })
    }

    pub fn store_progress(&self, store_id: &StoreId) -> Result<StoreProgress, MeetingServiceError> {
        let snapshot = self.repository.load()?;
        let store = snapshot
            .store(store_id)
            .ok_or_else(|| ValidationError::UnknownStore(store_id.clone()))?;
        Ok(store_progress(store, &snapshot.tiers))
    }
}

/// Error raised by the meeting service.
#[derive(Debug, thiserror::Error)]
pub enum MeetingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error(transparent)]
    Winners(#[from] WinnerLogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("store {store_id} is not eligible for tier {tier_id}")]
    StoreNotEligible { store_id: StoreId, tier_id: TierId },
}
