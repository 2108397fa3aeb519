use std::collections::HashSet;

use super::domain::{
    AwardTier, RegionCode, Store, StoreId, StoreLink, TierId, Vendor, VendorId,
};
use super::repository::EventSnapshot;
use super::winners::WinnerLog;

/// Record-level problems rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("store code {code} is already in use")]
    DuplicateStoreCode { code: String },
    #[error("store id {0} is already in use")]
    DuplicateStoreId(StoreId),
    #[error("vendor id {0} is already in use")]
    DuplicateVendorId(VendorId),
    #[error("tier id {0} is already in use")]
    DuplicateTierId(TierId),
    #[error("store {store_id} references {matrix_id}, which is not a matrix store")]
    MissingMatrixReference {
        store_id: StoreId,
        matrix_id: StoreId,
    },
    #[error("matrix store {store_id} still has {branches} branch(es)")]
    MatrixHasBranches { store_id: StoreId, branches: usize },
    #[error("vendor {vendor_id} already positivated store {store_id}")]
    DuplicatePositivation {
        vendor_id: VendorId,
        store_id: StoreId,
    },
    #[error("vendor {vendor_id} has {positivations} positivation(s) recorded")]
    VendorHasPositivations {
        vendor_id: VendorId,
        positivations: usize,
    },
    #[error("tier {tier_id} has {winners} winner(s) recorded")]
    TierHasWinners { tier_id: TierId, winners: usize },
    #[error("store {0} not found")]
    UnknownStore(StoreId),
    #[error("vendor {0} not found")]
    UnknownVendor(VendorId),
    #[error("tier {0} not found")]
    UnknownTier(TierId),
    #[error("winner log is inconsistent: {0}")]
    InconsistentWinners(String),
}

impl ValidationError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ValidationError::UnknownStore(_)
                | ValidationError::UnknownVendor(_)
                | ValidationError::UnknownTier(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ValidationError::DuplicateStoreCode { .. }
                | ValidationError::DuplicateStoreId(_)
                | ValidationError::DuplicateVendorId(_)
                | ValidationError::DuplicateTierId(_)
                | ValidationError::DuplicatePositivation { .. }
                | ValidationError::MatrixHasBranches { .. }
                | ValidationError::VendorHasPositivations { .. }
                | ValidationError::TierHasWinners { .. }
        )
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::BlankField { field })
    } else {
        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

fn branch_count(stores: &[Store], matrix_id: &StoreId) -> usize {
    stores
        .iter()
        .filter(|store| store.matrix_id() == Some(matrix_id))
        .count()
}

/// Checks `candidate` against the other stores (any entry sharing its id is ignored).
pub fn validate_store(stores: &[Store], candidate: &Store) -> Result<(), ValidationError> {
    require(&candidate.code, "store code")?;
    require(&candidate.name, "store name")?;
    if candidate.region.as_ref().is_some_and(RegionCode::is_blank) {
        return Err(ValidationError::BlankField {
            field: "store region",
        });
    }

    let others: Vec<&Store> = stores
        .iter()
        .filter(|store| store.id != candidate.id)
        .collect();

    let code = normalize_code(&candidate.code);
    if others
        .iter()
        .any(|store| normalize_code(&store.code) == code)
    {
        return Err(ValidationError::DuplicateStoreCode {
            code: candidate.code.trim().to_string(),
        });
    }

    if let StoreLink::Branch { matrix_id } = &candidate.link {
        let resolves = matrix_id != &candidate.id
            && others
                .iter()
                .any(|store| &store.id == matrix_id && store.is_matrix());
        if !resolves {
            return Err(ValidationError::MissingMatrixReference {
                store_id: candidate.id.clone(),
                matrix_id: matrix_id.clone(),
            });
        }
    }

    if !candidate.is_matrix() {
        let branches = branch_count(stores, &candidate.id);
        if branches > 0 {
            return Err(ValidationError::MatrixHasBranches {
                store_id: candidate.id.clone(),
                branches,
            });
        }
    }

    Ok(())
}

pub fn ensure_store_removable(stores: &[Store], store_id: &StoreId) -> Result<(), ValidationError> {
    if !stores.iter().any(|store| &store.id == store_id) {
        return Err(ValidationError::UnknownStore(store_id.clone()));
    }
    let branches = branch_count(stores, store_id);
    if branches > 0 {
        return Err(ValidationError::MatrixHasBranches {
            store_id: store_id.clone(),
            branches,
        });
    }
    Ok(())
}

pub fn validate_vendor(vendor: &Vendor) -> Result<(), ValidationError> {
    require(&vendor.name, "vendor name")
}

pub fn ensure_vendor_removable(
    stores: &[Store],
    vendor_id: &VendorId,
) -> Result<(), ValidationError> {
    let positivations = stores
        .iter()
        .filter(|store| store.has_positivation_from(vendor_id))
        .count();
    if positivations > 0 {
        return Err(ValidationError::VendorHasPositivations {
            vendor_id: vendor_id.clone(),
            positivations,
        });
    }
    Ok(())
}

pub fn ensure_new_positivation(store: &Store, vendor_id: &VendorId) -> Result<(), ValidationError> {
    if store.has_positivation_from(vendor_id) {
        return Err(ValidationError::DuplicatePositivation {
            vendor_id: vendor_id.clone(),
            store_id: store.id.clone(),
        });
    }
    Ok(())
}

pub fn validate_tier(tier: &AwardTier) -> Result<(), ValidationError> {
    require(&tier.name, "tier name")?;
    require(&tier.reward_name, "reward name")
}

pub fn ensure_tier_removable(winners: &WinnerLog, tier_id: &TierId) -> Result<(), ValidationError> {
    let winners = winners.count_for_tier(tier_id);
    if winners > 0 {
        return Err(ValidationError::TierHasWinners {
            tier_id: tier_id.clone(),
            winners,
        });
    }
    Ok(())
}

/// Full consistency pass used when a whole snapshot is imported or seeded.
pub fn validate_snapshot(snapshot: &EventSnapshot) -> Result<(), ValidationError> {
    let mut store_ids = HashSet::new();
    for store in &snapshot.stores {
        if !store_ids.insert(&store.id) {
            return Err(ValidationError::DuplicateStoreId(store.id.clone()));
        }
    }
    for store in &snapshot.stores {
        validate_store(&snapshot.stores, store)?;
        let mut vendors = HashSet::new();
        for detail in &store.positivations {
            if !vendors.insert(&detail.vendor_id) {
                return Err(ValidationError::DuplicatePositivation {
                    vendor_id: detail.vendor_id.clone(),
                    store_id: store.id.clone(),
                });
            }
        }
    }

    let mut vendor_ids = HashSet::new();
    for vendor in &snapshot.vendors {
        validate_vendor(vendor)?;
        if !vendor_ids.insert(&vendor.id) {
            return Err(ValidationError::DuplicateVendorId(vendor.id.clone()));
        }
    }

    let mut tier_ids = HashSet::new();
    for tier in &snapshot.tiers {
        validate_tier(tier)?;
        if !tier_ids.insert(&tier.id) {
            return Err(ValidationError::DuplicateTierId(tier.id.clone()));
        }
    }

    WinnerLog::from_records(snapshot.winners.records().iter().cloned())
        .map_err(|err| ValidationError::InconsistentWinners(err.to_string()))?;

    Ok(())
}
