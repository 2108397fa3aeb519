//! Store check-in, positivation tracking, award tiers and the sweepstake draw.
//!
//! The eligibility evaluator and the draw engine are pure; the service wraps them with
//! record validation and a whole-snapshot repository so every request sees fresh state.

pub mod domain;
pub mod draw;
pub mod eligibility;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod validation;
pub mod winners;

#[cfg(test)]
mod tests;

pub use domain::{
    AwardTier, PositivationDetail, RegionCode, RegionThresholds, Store, StoreDraft, StoreId,
    StoreLink, SweepstakeWinnerRecord, TierDraft, TierId, Vendor, VendorDraft, VendorId, WinnerId,
};
pub use draw::{DrawError, PendingDraw, SweepstakeDrawEngine};
pub use eligibility::{
    compute_eligibility, evaluate_tier, required_count, store_progress, EligibilityMap,
    StoreProgress, TierEligibility,
};
pub use repository::{EventRepository, EventSnapshot, RepositoryError};
pub use router::meeting_router;
pub use service::{MeetingService, MeetingServiceError, TierOverview};
pub use validation::ValidationError;
pub use winners::{WinnerLog, WinnerLogError};
