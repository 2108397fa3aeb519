use std::collections::HashSet;
use std::sync::Arc;

use super::common::*;
use crate::meeting::domain::{
    RegionCode, RegionThresholds, StoreDraft, StoreId, StoreLink, TierDraft, TierId, VendorDraft,
    VendorId,
};
use crate::meeting::draw::{DrawError, SweepstakeDrawEngine};
use crate::meeting::repository::RepositoryError;
use crate::meeting::seed::mock_snapshot;
use crate::meeting::service::{MeetingService, MeetingServiceError};
use crate::meeting::validation::ValidationError;
use crate::meeting::winners::WinnerLogError;

fn gold() -> TierId {
    TierId::from("gold")
}

#[test]
fn gold_scenario_runs_to_exhaustion() {
    let (service, repository) = build_service(gold_snapshot());

    let overview = service.eligibility().expect("eligibility computed");
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].remaining_slots, 2);
    assert_eq!(ids(&overview[0].eligible_stores), vec!["a", "c"]);

    let (first, first_record) = service.draw_and_confirm(&gold()).expect("first draw");
    assert!(["a", "c"].contains(&first.store.id.0.as_str()));
    assert_eq!(first_record.store_id, first.store.id);

    let overview = service.eligibility().expect("eligibility computed");
    assert_eq!(overview[0].remaining_slots, 1);
    assert_eq!(overview[0].awarded, 1);
    assert_eq!(overview[0].eligible_stores.len(), 1);
    assert_ne!(overview[0].eligible_stores[0].id, first.store.id);

    let (second, _) = service.draw_and_confirm(&gold()).expect("second draw");
    assert_ne!(second.store.id, first.store.id);
    assert_eq!(second.pool_size, 1);

    let overview = service.eligibility().expect("eligibility computed");
    assert_eq!(overview[0].remaining_slots, 0);
    assert!(overview[0].eligible_stores.is_empty());

    match service.draw(&gold()) {
        Err(MeetingServiceError::Draw(DrawError::NoSlotsRemaining)) => {}
        other => panic!("expected no slots remaining, got {other:?}"),
    }
    assert_eq!(repository.current().winners.len(), 2);
}

#[test]
fn pool_shrinks_by_exactly_the_winner_each_draw() {
    let mut snapshot = gold_snapshot();
    snapshot.stores = (0..6)
        .map(|index| store(&format!("s{index}"), 6, Some("PR")))
        .collect();
    snapshot.tiers = vec![tier("gold", 6, 5, None)];
    let (service, _) = build_service(snapshot);

    let mut winners = HashSet::new();
    let mut previous: Vec<StoreId> = service.eligibility().expect("pool")[0]
        .eligible_stores
        .iter()
        .map(|store| store.id.clone())
        .collect();

    for expected_remaining in (0..6).rev() {
        let (pending, _) = service.draw_and_confirm(&gold()).expect("draw succeeds");
        assert!(winners.insert(pending.store.id.clone()), "store won twice");

        let overview = service.eligibility().expect("pool");
        let current: Vec<StoreId> = overview[0]
            .eligible_stores
            .iter()
            .map(|store| store.id.clone())
            .collect();
        let expected: Vec<StoreId> = previous
            .iter()
            .filter(|id| **id != pending.store.id)
            .cloned()
            .collect();
        assert_eq!(current, expected);
        assert_eq!(overview[0].remaining_slots, expected_remaining);
        previous = current;
    }

    assert_eq!(winners.len(), 6);
}

#[test]
fn draw_without_confirmation_leaves_the_log_untouched() {
    let (service, repository) = build_service(gold_snapshot());
    let saves_before = repository.saves();

    let pending = service.draw(&gold()).expect("draw succeeds");
    drop(pending);

    assert!(repository.current().winners.is_empty());
    assert_eq!(repository.saves(), saves_before);
    assert_eq!(service.eligibility().expect("pool")[0].remaining_slots, 2);
}

#[test]
fn confirm_rejects_stores_outside_the_fresh_pool() {
    let (service, repository) = build_service(gold_snapshot());

    match service.confirm_draw(&gold(), &StoreId::from("b")) {
        Err(MeetingServiceError::StoreNotEligible { store_id, tier_id }) => {
            assert_eq!(store_id, StoreId::from("b"));
            assert_eq!(tier_id, gold());
        }
        other => panic!("expected store not eligible, got {other:?}"),
    }

    service
        .confirm_draw(&gold(), &StoreId::from("a"))
        .expect("a is eligible");
    match service.confirm_draw(&gold(), &StoreId::from("a")) {
        Err(MeetingServiceError::Winners(WinnerLogError::StoreAlreadyWon { tier_id, .. })) => {
            assert_eq!(tier_id, gold());
        }
        other => panic!("expected store already won, got {other:?}"),
    }
    assert_eq!(repository.current().winners.len(), 1);
}

#[test]
fn resetting_one_winner_restores_only_that_store() {
    let mut snapshot = gold_snapshot();
    snapshot.tiers.push(tier("silver", 3, 1, None));
    let (service, _) = build_service(snapshot);

    let a = service
        .confirm_draw(&gold(), &StoreId::from("a"))
        .expect("a wins gold");
    service
        .confirm_draw(&TierId::from("silver"), &StoreId::from("b"))
        .expect("b wins silver");

    let overview = service.eligibility().expect("pool");
    let silver = overview
        .iter()
        .find(|line| line.tier.id == TierId::from("silver"))
        .expect("silver listed");
    assert_eq!(ids(&silver.eligible_stores), vec!["c"]);
    assert_eq!(silver.remaining_slots, 2);

    service.reset_winner(&a.id).expect("reset succeeds");

    let overview = service.eligibility().expect("pool");
    let gold_line = overview
        .iter()
        .find(|line| line.tier.id == gold())
        .expect("gold listed");
    let silver = overview
        .iter()
        .find(|line| line.tier.id == TierId::from("silver"))
        .expect("silver listed");
    assert_eq!(ids(&gold_line.eligible_stores), vec!["a", "c"]);
    assert_eq!(gold_line.remaining_slots, 2);
    assert_eq!(ids(&silver.eligible_stores), vec!["a", "c"]);
    assert_eq!(silver.remaining_slots, 2);

    match service.reset_winner(&a.id) {
        Err(MeetingServiceError::Winners(WinnerLogError::NotFound(_))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn tier_and_full_resets_clear_the_log() {
    let mut snapshot = gold_snapshot();
    snapshot.tiers.push(tier("silver", 3, 1, None));
    let (service, _) = build_service(snapshot);

    service
        .confirm_draw(&gold(), &StoreId::from("a"))
        .expect("a wins gold");
    service
        .confirm_draw(&TierId::from("silver"), &StoreId::from("b"))
        .expect("b wins silver");

    assert_eq!(service.reset_tier_winners(&gold()).expect("reset"), 1);
    let winners = service.winners().expect("winners listed");
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].store_id, StoreId::from("b"));

    assert_eq!(service.reset_all_winners().expect("reset"), 1);
    assert!(service.winners().expect("winners listed").is_empty());

    match service.reset_tier_winners(&TierId::from("missing")) {
        Err(MeetingServiceError::Validation(ValidationError::UnknownTier(_))) => {}
        other => panic!("expected unknown tier, got {other:?}"),
    }
}

#[test]
fn positivations_unlock_eligibility_once_per_vendor() {
    let (service, _) = build_service(gold_snapshot());
    let b = StoreId::from("b");

    for index in 3..5 {
        service
            .record_positivation(&b, &VendorId(format!("vendor-{index}")))
            .expect("new vendor positivation");
    }
    match service.record_positivation(&b, &VendorId::from("vendor-4")) {
        Err(MeetingServiceError::Validation(ValidationError::DuplicatePositivation { .. })) => {}
        other => panic!("expected duplicate positivation, got {other:?}"),
    }

    let overview = service.eligibility().expect("pool");
    assert_eq!(ids(&overview[0].eligible_stores), vec!["a", "b", "c"]);

    let store = service
        .remove_positivation(&b, &VendorId::from("vendor-4"))
        .expect("positivation removed");
    assert_eq!(store.positivation_count(), 4);
    let overview = service.eligibility().expect("pool");
    assert_eq!(ids(&overview[0].eligible_stores), vec!["a", "c"]);

    match service.record_positivation(&b, &VendorId::from("ghost")) {
        Err(MeetingServiceError::Validation(ValidationError::UnknownVendor(_))) => {}
        other => panic!("expected unknown vendor, got {other:?}"),
    }
}

#[test]
fn check_in_toggles_membership_in_the_pool() {
    let (service, _) = build_service(gold_snapshot());

    service
        .set_check_in(&StoreId::from("a"), false)
        .expect("check-out works");
    assert_eq!(
        ids(&service.eligibility().expect("pool")[0].eligible_stores),
        vec!["c"]
    );

    service
        .set_check_in(&StoreId::from("a"), true)
        .expect("check-in works");
    assert_eq!(
        ids(&service.eligibility().expect("pool")[0].eligible_stores),
        vec!["a", "c"]
    );
}

#[test]
fn store_crud_enforces_codes_and_matrix_links() {
    let (service, _) = build_service(gold_snapshot());

    let matrix = service
        .create_store(StoreDraft {
            code: "M1".to_string(),
            name: "Rede Matriz".to_string(),
            participating: true,
            region: Some(RegionCode::primary()),
            link: StoreLink::Matrix,
        })
        .expect("matrix created");
    assert!(matrix.id.0.starts_with("store-"));
    assert!(!matrix.checked_in);

    let branch = service
        .create_store(StoreDraft {
            code: "M1-F1".to_string(),
            name: "Rede Filial".to_string(),
            participating: true,
            region: Some(RegionCode::secondary()),
            link: StoreLink::Branch {
                matrix_id: matrix.id.clone(),
            },
        })
        .expect("branch created");

    match service.create_store(StoreDraft {
        code: "m1".to_string(),
        name: "Copy".to_string(),
        participating: false,
        region: None,
        link: StoreLink::Independent,
    }) {
        Err(MeetingServiceError::Validation(ValidationError::DuplicateStoreCode { .. })) => {}
        other => panic!("expected duplicate code, got {other:?}"),
    }

    match service.create_store(StoreDraft {
        code: "X9".to_string(),
        name: "Orphan".to_string(),
        participating: false,
        region: None,
        link: StoreLink::Branch {
            matrix_id: StoreId::from("a"),
        },
    }) {
        Err(MeetingServiceError::Validation(ValidationError::MissingMatrixReference {
            ..
        })) => {}
        other => panic!("expected missing matrix, got {other:?}"),
    }

    match service.delete_store(&matrix.id) {
        Err(MeetingServiceError::Validation(ValidationError::MatrixHasBranches {
            branches,
            ..
        })) => assert_eq!(branches, 1),
        other => panic!("expected matrix has branches, got {other:?}"),
    }

    service.delete_store(&branch.id).expect("branch removed");
    service.delete_store(&matrix.id).expect("matrix removed");

    let updated = service
        .update_store(
            &StoreId::from("a"),
            StoreDraft {
                code: "A".to_string(),
                name: "Farmacia Renomeada".to_string(),
                participating: true,
                region: Some(RegionCode::primary()),
                link: StoreLink::Independent,
            },
        )
        .expect("store updated");
    assert_eq!(updated.name, "Farmacia Renomeada");
    assert!(updated.checked_in, "check-in survives edits");
    assert_eq!(updated.positivation_count(), 6);
}

#[test]
fn vendors_with_positivations_cannot_be_removed() {
    let (service, _) = build_service(gold_snapshot());

    match service.delete_vendor(&VendorId::from("vendor-0")) {
        Err(MeetingServiceError::Validation(ValidationError::VendorHasPositivations {
            positivations,
            ..
        })) => assert_eq!(positivations, 3),
        other => panic!("expected vendor has positivations, got {other:?}"),
    }

    let vendor = service
        .create_vendor(VendorDraft {
            name: "Novo Lab".to_string(),
            logo: Some("novo.png".to_string()),
        })
        .expect("vendor created");
    service.delete_vendor(&vendor.id).expect("unused vendor removed");
}

#[test]
fn tiers_with_winners_cannot_be_removed() {
    let (service, _) = build_service(gold_snapshot());
    let draft = TierDraft {
        name: "Diamante".to_string(),
        reward_name: "Viagem".to_string(),
        quantity_available: 1,
        thresholds: RegionThresholds {
            primary: 7,
            secondary: Some(6),
        },
        sort_order: 9,
    };
    let diamond = service.create_tier(draft.clone()).expect("tier created");
    service
        .confirm_draw(&diamond.id, &StoreId::from("c"))
        .expect("c qualifies for diamond");

    match service.delete_tier(&diamond.id) {
        Err(MeetingServiceError::Validation(ValidationError::TierHasWinners { winners, .. })) => {
            assert_eq!(winners, 1)
        }
        other => panic!("expected tier has winners, got {other:?}"),
    }

    let raised = service
        .update_tier(
            &diamond.id,
            TierDraft {
                quantity_available: 2,
                ..draft
            },
        )
        .expect("tier updated");
    assert_eq!(raised.quantity_available, 2);
    let overview = service.eligibility().expect("pool");
    let line = overview
        .iter()
        .find(|line| line.tier.id == diamond.id)
        .expect("diamond listed");
    assert_eq!(line.remaining_slots, 1);
    assert!(line.eligible_stores.is_empty());

    service.delete_tier(&gold()).expect("unused tier removed");
}

#[test]
fn seeding_only_fills_an_empty_event() {
    let (service, repository) = build_service(Default::default());

    let now = chrono::Utc::now();
    assert!(service.seed_if_empty(mock_snapshot(now)).expect("seeded"));
    assert!(!service
        .seed_if_empty(mock_snapshot(now))
        .expect("second seed skipped"));

    let snapshot = repository.current();
    assert_eq!(snapshot.tiers.len(), 3);
    let overview = service.eligibility().expect("pool");
    assert!(overview.iter().all(|line| line
        .eligible_stores
        .iter()
        .all(|store| store.participating && store.checked_in && store.region.is_some())));
}

#[test]
fn repository_failures_propagate() {
    let service = MeetingService::with_rng(
        Arc::new(UnavailableRepository),
        SweepstakeDrawEngine::new(1),
        seeded_rng(),
    );

    match service.draw(&gold()) {
        Err(MeetingServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    match service.reset_all_winners() {
        Err(MeetingServiceError::Repository(_)) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[test]
fn progress_is_reported_per_store() {
    let (service, _) = build_service(gold_snapshot());

    let progress = service
        .store_progress(&StoreId::from("b"))
        .expect("progress computed");
    let next = progress.next.expect("gold pending");
    assert_eq!(next.missing, 2);

    match service.store_progress(&StoreId::from("missing")) {
        Err(MeetingServiceError::Validation(ValidationError::UnknownStore(_))) => {}
        other => panic!("expected unknown store, got {other:?}"),
    }
}
