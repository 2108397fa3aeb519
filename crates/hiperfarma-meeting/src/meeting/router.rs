use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{StoreDraft, StoreId, TierDraft, TierId, VendorDraft, VendorId, WinnerId};
use super::draw::DrawError;
use super::repository::EventRepository;
use super::service::{MeetingService, MeetingServiceError};
use super::winners::WinnerLogError;

type SharedService<R> = State<Arc<MeetingService<R>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct CheckInRequest {
    pub(crate) checked_in: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositivationRequest {
    pub(crate) vendor_id: VendorId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmDrawRequest {
    pub(crate) store_id: StoreId,
}

/// Router builder exposing the meeting records, eligibility and sweepstake endpoints.
pub fn meeting_router<R>(service: Arc<MeetingService<R>>) -> Router
where
    R: EventRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/meeting/stores",
            get(list_stores_handler::<R>).post(create_store_handler::<R>),
        )
        .route(
            "/api/v1/meeting/stores/:store_id",
            put(update_store_handler::<R>).delete(delete_store_handler::<R>),
        )
        .route(
            "/api/v1/meeting/stores/:store_id/check-in",
            post(check_in_handler::<R>),
        )
        .route(
            "/api/v1/meeting/stores/:store_id/progress",
            get(progress_handler::<R>),
        )
        .route(
            "/api/v1/meeting/stores/:store_id/positivations",
            post(record_positivation_handler::<R>),
        )
        .route(
            "/api/v1/meeting/stores/:store_id/positivations/:vendor_id",
            delete(remove_positivation_handler::<R>),
        )
        .route(
            "/api/v1/meeting/vendors",
            get(list_vendors_handler::<R>).post(create_vendor_handler::<R>),
        )
        .route(
            "/api/v1/meeting/vendors/:vendor_id",
            delete(delete_vendor_handler::<R>),
        )
        .route(
            "/api/v1/meeting/tiers",
            get(list_tiers_handler::<R>).post(create_tier_handler::<R>),
        )
        .route(
            "/api/v1/meeting/tiers/:tier_id",
            put(update_tier_handler::<R>).delete(delete_tier_handler::<R>),
        )
        .route(
            "/api/v1/meeting/tiers/:tier_id/winners",
            delete(reset_tier_winners_handler::<R>),
        )
        .route("/api/v1/meeting/eligibility", get(eligibility_handler::<R>))
        .route("/api/v1/meeting/draws/:tier_id", post(draw_handler::<R>))
        .route(
            "/api/v1/meeting/draws/:tier_id/confirm",
            post(confirm_draw_handler::<R>),
        )
        .route(
            "/api/v1/meeting/winners",
            get(list_winners_handler::<R>).delete(reset_all_winners_handler::<R>),
        )
        .route(
            "/api/v1/meeting/winners/:winner_id",
            delete(reset_winner_handler::<R>),
        )
        .with_state(service)
}

/// Maps service failures onto HTTP statuses with a JSON error body.
pub(crate) fn error_response(error: MeetingServiceError) -> Response {
    let status = match &error {
        MeetingServiceError::Validation(err) if err.is_not_found() => StatusCode::NOT_FOUND,
        MeetingServiceError::Validation(err) if err.is_conflict() => StatusCode::CONFLICT,
        MeetingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MeetingServiceError::Draw(_)
        | MeetingServiceError::StoreNotEligible { .. }
        | MeetingServiceError::Winners(WinnerLogError::StoreAlreadyWon { .. })
        | MeetingServiceError::Winners(WinnerLogError::DuplicateRecord(_)) => StatusCode::CONFLICT,
        MeetingServiceError::Winners(WinnerLogError::NotFound(_)) => StatusCode::NOT_FOUND,
        MeetingServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = match &error {
        MeetingServiceError::Draw(reason) => json!({
            "error": "no prize remaining or no eligible store",
            "reason": draw_reason(*reason),
        }),
        other => json!({ "error": other.to_string() }),
    };

    (status, Json(payload)).into_response()
}

fn draw_reason(error: DrawError) -> &'static str {
    match error {
        DrawError::NoEligibleStores => "no_eligible_stores",
        DrawError::NoSlotsRemaining => "no_slots_remaining",
    }
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, MeetingServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_stores_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.snapshot().map(|snapshot| snapshot.stores),
    )
}

pub(crate) async fn create_store_handler<R>(
    State(service): SharedService<R>,
    Json(draft): Json<StoreDraft>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_store(draft))
}

pub(crate) async fn update_store_handler<R>(
    State(service): SharedService<R>,
    Path(store_id): Path<String>,
    Json(draft): Json<StoreDraft>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_store(&StoreId(store_id), draft),
    )
}

pub(crate) async fn delete_store_handler<R>(
    State(service): SharedService<R>,
    Path(store_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.delete_store(&StoreId(store_id)))
}

pub(crate) async fn check_in_handler<R>(
    State(service): SharedService<R>,
    Path(store_id): Path<String>,
    Json(request): Json<CheckInRequest>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.set_check_in(&StoreId(store_id), request.checked_in),
    )
}

pub(crate) async fn progress_handler<R>(
    State(service): SharedService<R>,
    Path(store_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.store_progress(&StoreId(store_id)))
}

pub(crate) async fn record_positivation_handler<R>(
    State(service): SharedService<R>,
    Path(store_id): Path<String>,
    Json(request): Json<PositivationRequest>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.record_positivation(&StoreId(store_id), &request.vendor_id),
    )
}

pub(crate) async fn remove_positivation_handler<R>(
    State(service): SharedService<R>,
    Path((store_id, vendor_id)): Path<(String, String)>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.remove_positivation(&StoreId(store_id), &VendorId(vendor_id)),
    )
}

pub(crate) async fn list_vendors_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.snapshot().map(|snapshot| snapshot.vendors),
    )
}

pub(crate) async fn create_vendor_handler<R>(
    State(service): SharedService<R>,
    Json(draft): Json<VendorDraft>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_vendor(draft))
}

pub(crate) async fn delete_vendor_handler<R>(
    State(service): SharedService<R>,
    Path(vendor_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.delete_vendor(&VendorId(vendor_id)))
}

pub(crate) async fn list_tiers_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.snapshot().map(|snapshot| {
            snapshot
                .ordered_tiers()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        }),
    )
}

pub(crate) async fn create_tier_handler<R>(
    State(service): SharedService<R>,
    Json(draft): Json<TierDraft>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_tier(draft))
}

pub(crate) async fn update_tier_handler<R>(
    State(service): SharedService<R>,
    Path(tier_id): Path<String>,
    Json(draft): Json<TierDraft>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.update_tier(&TierId(tier_id), draft))
}

pub(crate) async fn delete_tier_handler<R>(
    State(service): SharedService<R>,
    Path(tier_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.delete_tier(&TierId(tier_id)))
}

pub(crate) async fn eligibility_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.eligibility())
}

pub(crate) async fn draw_handler<R>(
    State(service): SharedService<R>,
    Path(tier_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.draw(&TierId(tier_id)))
}

pub(crate) async fn confirm_draw_handler<R>(
    State(service): SharedService<R>,
    Path(tier_id): Path<String>,
    Json(request): Json<ConfirmDrawRequest>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.confirm_draw(&TierId(tier_id), &request.store_id),
    )
}

pub(crate) async fn list_winners_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.winners())
}

pub(crate) async fn reset_winner_handler<R>(
    State(service): SharedService<R>,
    Path(winner_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(StatusCode::OK, service.reset_winner(&WinnerId(winner_id)))
}

pub(crate) async fn reset_tier_winners_handler<R>(
    State(service): SharedService<R>,
    Path(tier_id): Path<String>,
) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service
            .reset_tier_winners(&TierId(tier_id))
            .map(|removed| json!({ "removed": removed })),
    )
}

pub(crate) async fn reset_all_winners_handler<R>(State(service): SharedService<R>) -> Response
where
    R: EventRepository + 'static,
{
    respond(
        StatusCode::OK,
        service
            .reset_all_winners()
            .map(|removed| json!({ "removed": removed })),
    )
}
