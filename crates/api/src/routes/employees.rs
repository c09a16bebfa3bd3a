//! Employee assignment handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;
use tracker_core::{Computer, PageMeta, PageQuery, Pagination};

use super::{parse_employee_code, parse_id};
use crate::response::{ApiError, ListResponse, SuccessResponse};
use crate::state::AppState;

/// GET /employees/:code/computers
pub async fn list_employee_computers(
    State(state): State<AppState>,
    Path(code): Path<String>,
    query: Option<Query<PageQuery>>,
) -> Result<Json<ListResponse<Computer>>, ApiError> {
    let code = parse_employee_code(&code)?;
    let pagination = Pagination::from(query.map(|Query(q)| q).unwrap_or_default());

    let page = state
        .registry
        .list_by_employee_paginated(&code, pagination)
        .await?;

    Ok(Json(ListResponse {
        data: page.items,
        pagination: PageMeta::new(pagination, page.total),
    }))
}

/// PUT /employees/:code/computers/:id
pub async fn assign_computer(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse<Computer>>, ApiError> {
    let code = parse_employee_code(&code)?;
    let id = parse_id(&id)?;

    let computer = state.registry.assign_to_employee(id, &code).await?;
    info!(id = %computer.id, employee_code = %code, "Computer assigned");

    state.dispatcher.enqueue(&code);

    Ok(Json(SuccessResponse::new(
        "Computer successfully assigned to employee",
        computer,
    )))
}

/// DELETE /employees/:code/computers/:id
pub async fn unassign_computer(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse<Computer>>, ApiError> {
    let code = parse_employee_code(&code)?;
    let id = parse_id(&id)?;

    let computer = state.registry.remove_from_employee(id, &code).await?;
    info!(id = %computer.id, employee_code = %code, "Computer unassigned");

    Ok(Json(SuccessResponse::new(
        "Computer successfully removed from employee",
        computer,
    )))
}
