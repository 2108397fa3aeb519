use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{StoreId, SweepstakeWinnerRecord, TierId, WinnerId};

/// Errors raised when mutating the winner log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WinnerLogError {
    #[error("store {store_id} already won a prize in tier {tier_id}")]
    StoreAlreadyWon { store_id: StoreId, tier_id: TierId },
    #[error("winner record {0} already exists")]
    DuplicateRecord(WinnerId),
    #[error("winner record {0} not found")]
    NotFound(WinnerId),
}

/// Ordered log of confirmed draws; the only source of "already won" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WinnerLog {
    records: Vec<SweepstakeWinnerRecord>,
}

impl WinnerLog {
    /// Rebuilds a log from stored records, refusing any that break the single-win rule.
    pub fn from_records(
        records: impl IntoIterator<Item = SweepstakeWinnerRecord>,
    ) -> Result<Self, WinnerLogError> {
        let mut log = Self::default();
        for record in records {
            log.record(record)?;
        }
        Ok(log)
    }

    pub fn records(&self) -> &[SweepstakeWinnerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn winner_for_store(&self, store_id: &StoreId) -> Option<&SweepstakeWinnerRecord> {
        self.records
            .iter()
            .find(|record| &record.store_id == store_id)
    }

    pub fn has_won(&self, store_id: &StoreId) -> bool {
        self.winner_for_store(store_id).is_some()
    }

    pub fn count_for_tier(&self, tier_id: &TierId) -> usize {
        self.for_tier(tier_id).count()
    }

    pub fn for_tier<'a>(
        &'a self,
        tier_id: &'a TierId,
    ) -> impl Iterator<Item = &'a SweepstakeWinnerRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| &record.tier_id == tier_id)
    }

    /// Appends a confirmed draw. A store may appear at most once across every tier.
    pub fn record(
        &mut self,
        record: SweepstakeWinnerRecord,
    ) -> Result<&SweepstakeWinnerRecord, WinnerLogError> {
        if let Some(existing) = self.winner_for_store(&record.store_id) {
            return Err(WinnerLogError::StoreAlreadyWon {
                store_id: existing.store_id.clone(),
                tier_id: existing.tier_id.clone(),
            });
        }
        if self.records.iter().any(|existing| existing.id == record.id) {
            return Err(WinnerLogError::DuplicateRecord(record.id));
        }

        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    pub fn remove(&mut self, id: &WinnerId) -> Result<SweepstakeWinnerRecord, WinnerLogError> {
        let index = self
            .records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| WinnerLogError::NotFound(id.clone()))?;
        Ok(self.records.remove(index))
    }

    /// Drops every record for the tier, returning how many were removed.
    pub fn reset_tier(&mut self, tier_id: &TierId) -> usize {
        let before = self.records.len();
        self.records.retain(|record| &record.tier_id != tier_id);
        before - self.records.len()
    }

    pub fn reset_all(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}

/// Stored logs go through the same single-win guard as live draws.
impl<'de> Deserialize<'de> for WinnerLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let records = Vec::<SweepstakeWinnerRecord>::deserialize(deserializer)?;
        Self::from_records(records).map_err(serde::de::Error::custom)
    }
}

/// Store ids present anywhere in the log, regardless of tier.
pub fn winning_store_ids(records: &[SweepstakeWinnerRecord]) -> HashSet<&StoreId> {
    records.iter().map(|record| &record.store_id).collect()
}
