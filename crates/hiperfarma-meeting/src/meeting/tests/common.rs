use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::meeting::domain::{
    AwardTier, PositivationDetail, RegionCode, RegionThresholds, Store, StoreId, StoreLink,
    SweepstakeWinnerRecord, TierId, Vendor, VendorId, WinnerId,
};
use crate::meeting::repository::{EventRepository, EventSnapshot, RepositoryError};
use crate::meeting::{meeting_router, MeetingService, SweepstakeDrawEngine};

pub(super) fn tier(
    id: &str,
    quantity_available: u32,
    primary: u32,
    secondary: Option<u32>,
) -> AwardTier {
    AwardTier {
        id: TierId::from(id),
        name: id.to_uppercase(),
        reward_name: format!("{id} prize"),
        quantity_available,
        thresholds: RegionThresholds { primary, secondary },
        sort_order: 0,
    }
}

pub(super) fn positivations(count: usize) -> Vec<PositivationDetail> {
    let recorded_at = Utc
        .with_ymd_and_hms(2025, 5, 20, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    (0..count)
        .map(|index| PositivationDetail {
            vendor_id: VendorId(format!("vendor-{index}")),
            vendor_name: format!("Vendor {index}"),
            vendor_logo: None,
            recorded_at,
        })
        .collect()
}

pub(super) fn store(id: &str, positivation_count: usize, region: Option<&str>) -> Store {
    Store {
        id: StoreId::from(id),
        code: id.to_uppercase(),
        name: format!("Farmacia {id}"),
        participating: true,
        checked_in: true,
        region: region.map(RegionCode::new),
        link: StoreLink::Independent,
        positivations: positivations(positivation_count),
    }
}

pub(super) fn winner(id: &str, tier_id: &str, store_id: &str) -> SweepstakeWinnerRecord {
    SweepstakeWinnerRecord {
        id: WinnerId::from(id),
        tier_id: TierId::from(tier_id),
        tier_name: tier_id.to_uppercase(),
        reward_name: format!("{tier_id} prize"),
        store_id: StoreId::from(store_id),
        store_description: format!("{} - Farmacia {store_id}", store_id.to_uppercase()),
        drawn_at: Utc::now(),
    }
}

/// Tier "gold" (2 prizes, PR=5) with stores A(6), B(3) and C(7), all checked in PR stores.
pub(super) fn gold_snapshot() -> EventSnapshot {
    EventSnapshot {
        stores: vec![
            store("a", 6, Some("PR")),
            store("b", 3, Some("PR")),
            store("c", 7, Some("PR")),
        ],
        vendors: (0..8)
            .map(|index| Vendor {
                id: VendorId(format!("vendor-{index}")),
                name: format!("Vendor {index}"),
                logo: None,
            })
            .collect(),
        tiers: vec![tier("gold", 2, 5, None)],
        winners: Default::default(),
        sequence: 100,
    }
}

pub(super) fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5E10)
}

pub(super) fn build_service(
    snapshot: EventSnapshot,
) -> (MeetingService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::with_snapshot(snapshot));
    let service = MeetingService::with_rng(
        repository.clone(),
        SweepstakeDrawEngine::new(5),
        seeded_rng(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    snapshot: Arc<Mutex<EventSnapshot>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryRepository {
    pub(super) fn with_snapshot(snapshot: EventSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            saves: Arc::default(),
        }
    }

    pub(super) fn current(&self) -> EventSnapshot {
        self.snapshot.lock().expect("repository mutex poisoned").clone()
    }

    pub(super) fn saves(&self) -> usize {
        *self.saves.lock().expect("save counter poisoned")
    }
}

impl EventRepository for MemoryRepository {
    fn load(&self) -> Result<EventSnapshot, RepositoryError> {
        Ok(self.current())
    }

    fn save(&self, snapshot: &EventSnapshot) -> Result<(), RepositoryError> {
        *self.snapshot.lock().expect("repository mutex poisoned") = snapshot.clone();
        *self.saves.lock().expect("save counter poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl EventRepository for UnavailableRepository {
    fn load(&self) -> Result<EventSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn save(&self, _snapshot: &EventSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) fn router_with_service(service: MeetingService<MemoryRepository>) -> axum::Router {
    meeting_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn ids(stores: &[Store]) -> Vec<&str> {
    stores.iter().map(|store| store.id.0.as_str()).collect()
}
