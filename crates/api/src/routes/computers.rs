//! Computer CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use tracker_core::{Computer, ComputerInput, PageMeta, PageQuery, Pagination};
use uuid::Uuid;
use worker::LifecycleEvent;

use super::parse_id;
use crate::extractors::ApiJson;
use crate::response::{ApiError, ListResponse, SuccessResponse};
use crate::state::AppState;

/// POST /computers
pub async fn create_computer(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ComputerInput>,
) -> Result<(StatusCode, Json<SuccessResponse<Computer>>), ApiError> {
    let input = input.validated()?;
    let computer = state
        .registry
        .create(input.into_computer(Uuid::new_v4(), Utc::now()))
        .await?;

    info!(
        id = %computer.id,
        mac = %computer.mac_address,
        employee_code = %computer.employee_abbreviation,
        "Computer created"
    );

    if let Some(event) = LifecycleEvent::created(&computer) {
        state.dispatcher.enqueue_lifecycle(event);
    }
    state.dispatcher.enqueue(&computer.employee_abbreviation);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new("Computer created successfully", computer)),
    ))
}

/// GET /computers
///
/// Unparseable paging parameters fall back to the defaults.
pub async fn list_computers(
    State(state): State<AppState>,
    query: Option<Query<PageQuery>>,
) -> Result<Json<ListResponse<Computer>>, ApiError> {
    let pagination = Pagination::from(query.map(|Query(q)| q).unwrap_or_default());
    let page = state.registry.list(pagination).await?;

    Ok(Json(ListResponse {
        data: page.items,
        pagination: PageMeta::new(pagination, page.total),
    }))
}

/// GET /computers/:id
pub async fn get_computer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Computer>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.get(id).await?))
}

/// PUT /computers/:id
///
/// Replaces every mutable field. A threshold check follows whenever the
/// computer ends up assigned; a changed assignment is also announced.
pub async fn update_computer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ComputerInput>,
) -> Result<Json<SuccessResponse<Computer>>, ApiError> {
    let id = parse_id(&id)?;
    let input = input.validated()?;

    let existing = state.registry.get(id).await?;
    let updated = state
        .registry
        .update(id, input.into_computer(id, existing.created_at))
        .await?;

    info!(
        id = %updated.id,
        employee_code = %updated.employee_abbreviation,
        previous_employee_code = %existing.employee_abbreviation,
        "Computer updated"
    );

    if let Some(event) = LifecycleEvent::updated(&existing, &updated) {
        state.dispatcher.enqueue_lifecycle(event);
    }
    if updated.is_assigned() {
        state.dispatcher.enqueue(&updated.employee_abbreviation);
    }

    Ok(Json(SuccessResponse::new(
        "Computer updated successfully",
        updated,
    )))
}

/// DELETE /computers/:id
///
/// Deleting an assigned computer sends a warning-level notification.
pub async fn delete_computer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<Computer>>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state.registry.delete(id).await?;

    info!(id = %deleted.id, "Computer deleted");

    if let Some(event) = LifecycleEvent::deleted(&deleted) {
        state.dispatcher.enqueue_lifecycle(event);
    }

    Ok(Json(SuccessResponse::new(
        "Computer deleted successfully",
        deleted,
    )))
}
