use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier of a participating or non-participating store.
    StoreId
);
record_id!(
    /// Identifier of a vendor (supplier) attending the meeting.
    VendorId
);
record_id!(
    /// Identifier of an award tier.
    TierId
);
record_id!(
    /// Identifier of an entry in the winner log.
    WinnerId
);

/// State/region code a store operates in (e.g. `PR`, `SC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(pub String);

impl RegionCode {
    /// Region whose threshold applies whenever no specific one is configured.
    pub const PRIMARY: &'static str = "PR";
    /// Region that may carry its own threshold.
    pub const SECONDARY: &'static str = "SC";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn primary() -> Self {
        Self(Self::PRIMARY.to_string())
    }

    pub fn secondary() -> Self {
        Self(Self::SECONDARY.to_string())
    }

    pub fn is_secondary(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case(Self::SECONDARY)
    }

    /// A blank code carries no region and never counts as defined.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Reads an optional region, normalizing the code and mapping blank input to `None`.
fn optional_region<'de, D>(deserializer: D) -> Result<Option<RegionCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(RegionCode::new).filter(|region| !region.is_blank()))
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a store inside its retail chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreLink {
    #[default]
    Independent,
    Matrix,
    Branch { matrix_id: StoreId },
}

/// A single vendor-to-store endorsement ("selo").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositivationDetail {
    pub vendor_id: VendorId,
    pub vendor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_logo: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Retail outlet registered for the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub participating: bool,
    #[serde(default)]
    pub checked_in: bool,
    #[serde(default, deserialize_with = "optional_region")]
    pub region: Option<RegionCode>,
    #[serde(default)]
    pub link: StoreLink,
    #[serde(default)]
    pub positivations: Vec<PositivationDetail>,
}

impl Store {
    pub fn positivation_count(&self) -> u32 {
        u32::try_from(self.positivations.len()).unwrap_or(u32::MAX)
    }

    /// Label denormalized into winner records and draw previews.
    pub fn description(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self.link, StoreLink::Matrix)
    }

    pub fn matrix_id(&self) -> Option<&StoreId> {
        match &self.link {
            StoreLink::Branch { matrix_id } => Some(matrix_id),
            StoreLink::Independent | StoreLink::Matrix => None,
        }
    }

    pub fn has_positivation_from(&self, vendor_id: &VendorId) -> bool {
        self.positivations
            .iter()
            .any(|detail| &detail.vendor_id == vendor_id)
    }
}

/// Editable store fields; id, check-in state and positivations are owned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDraft {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub participating: bool,
    #[serde(default, deserialize_with = "optional_region")]
    pub region: Option<RegionCode>,
    #[serde(default)]
    pub link: StoreLink,
}

/// Supplier that hands out positivations during the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDraft {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Positivations required per region to reach a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionThresholds {
    #[serde(rename = "PR")]
    pub primary: u32,
    #[serde(rename = "SC", default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<u32>,
}

impl RegionThresholds {
    pub fn uniform(required: u32) -> Self {
        Self {
            primary: required,
            secondary: None,
        }
    }
}

/// Prize bracket with region-specific qualification thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardTier {
    pub id: TierId,
    pub name: String,
    pub reward_name: String,
    pub quantity_available: u32,
    pub thresholds: RegionThresholds,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDraft {
    pub name: String,
    pub reward_name: String,
    pub quantity_available: u32,
    pub thresholds: RegionThresholds,
    #[serde(default)]
    pub sort_order: i32,
}

/// Immutable log entry produced by one confirmed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepstakeWinnerRecord {
    pub id: WinnerId,
    pub tier_id: TierId,
    pub tier_name: String,
    pub reward_name: String,
    pub store_id: StoreId,
    pub store_description: String,
    pub drawn_at: DateTime<Utc>,
}
