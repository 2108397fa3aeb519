use chrono::{DateTime, Duration, Utc};

use super::domain::{
    AwardTier, PositivationDetail, RegionCode, RegionThresholds, Store, StoreId, StoreLink,
    TierId, Vendor, VendorId,
};
use super::repository::EventSnapshot;

const VENDORS: &[(&str, &str)] = &[
    ("vendor-000001", "Medley"),
    ("vendor-000002", "EMS"),
    ("vendor-000003", "Eurofarma"),
    ("vendor-000004", "Cimed"),
    ("vendor-000005", "Germed"),
    ("vendor-000006", "Prati-Donaduzzi"),
    ("vendor-000007", "Neo Quimica"),
    ("vendor-000008", "Genomma Lab"),
];

// (id, code, name, region, link, participating, checked in, positivations)
type StoreRow = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    bool,
    bool,
    usize,
);

#[rustfmt::skip]
const STORES: &[StoreRow] = &[
    ("store-000101", "1001", "Farmacia Curitiba Centro", Some("PR"), Some("matrix"), true, true, 8),
    ("store-000102", "1002", "Farmacia Curitiba Batel", Some("PR"), Some("store-000101"), true, true, 6),
    ("store-000103", "1003", "Drogaria Londrina", Some("PR"), None, true, true, 3),
    ("store-000104", "1004", "Farmacia Maringa", Some("PR"), None, true, false, 7),
    ("store-000105", "2001", "Farmacia Joinville", Some("SC"), Some("matrix"), true, true, 4),
    ("store-000106", "2002", "Farmacia Blumenau", Some("SC"), Some("store-000105"), true, true, 2),
    ("store-000107", "2003", "Drogaria Chapeco", Some("SC"), None, false, true, 8),
    ("store-000108", "3001", "Farmacia Ponta Grossa", None, None, true, true, 8),
    ("store-000109", "1005", "Farmacia Cascavel", Some("PR"), None, true, true, 1),
    ("store-000110", "2004", "Drogaria Florianopolis", Some("SC"), None, true, true, 6),
];

/// Demo event used when an empty event is started with mock data enabled.
pub fn mock_snapshot(now: DateTime<Utc>) -> EventSnapshot {
    let vendors: Vec<Vendor> = VENDORS
        .iter()
        .map(|(id, name)| Vendor {
            id: VendorId::from(*id),
            name: (*name).to_string(),
            logo: None,
        })
        .collect();

    let stores = STORES
        .iter()
        .map(
            |&(id, code, name, region, link, participating, checked_in, positivations)| {
                let link = match link {
                    None => StoreLink::Independent,
                    Some("matrix") => StoreLink::Matrix,
                    Some(matrix_id) => StoreLink::Branch {
                        matrix_id: StoreId::from(matrix_id),
                    },
                };
                Store {
                    id: StoreId::from(id),
                    code: code.to_string(),
                    name: name.to_string(),
                    participating,
                    checked_in,
                    region: region.map(RegionCode::new),
                    link,
                    positivations: vendors
                        .iter()
                        .take(positivations)
                        .enumerate()
                        .map(|(offset, vendor)| PositivationDetail {
                            vendor_id: vendor.id.clone(),
                            vendor_name: vendor.name.clone(),
                            vendor_logo: vendor.logo.clone(),
                            recorded_at: now - Duration::minutes(offset as i64 * 7),
                        })
                        .collect(),
                }
            },
        )
        .collect();

    let tiers = vec![
        AwardTier {
            id: TierId::from("tier-000001"),
            name: "Bronze".to_string(),
            reward_name: "Kit de brindes".to_string(),
            quantity_available: 4,
            thresholds: RegionThresholds {
                primary: 3,
                secondary: Some(2),
            },
            sort_order: 1,
        },
        AwardTier {
            id: TierId::from("tier-000002"),
            name: "Prata".to_string(),
            reward_name: "Smartphone".to_string(),
            quantity_available: 2,
            thresholds: RegionThresholds {
                primary: 5,
                secondary: Some(4),
            },
            sort_order: 2,
        },
        AwardTier {
            id: TierId::from("tier-000003"),
            name: "Ouro".to_string(),
            reward_name: "Smart TV 55\"".to_string(),
            quantity_available: 1,
            thresholds: RegionThresholds::uniform(7),
            sort_order: 3,
        },
    ];

    EventSnapshot {
        stores,
        vendors,
        tiers,
        winners: Default::default(),
        sequence: 1000,
    }
}
