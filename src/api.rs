//! HTTP API endpoints for the winner-history export boundary.
//!
//! These feed the operator UI's download buttons; PDF layout happens
//! client-side from the same snapshot data.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::state::{export, AppState};
use crate::types::RaffleSnapshot;

/// Export the winner history as CSV.
///
/// GET /api/winners.csv
pub async fn export_winners_csv(State(state): State<Arc<AppState>>) -> Response {
    let rows = state.history_rows().await;
    let csv = export::render_csv(&rows);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ganadores_navidad.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

/// Export the full session snapshot as JSON.
///
/// GET /api/state
pub async fn export_snapshot(State(state): State<Arc<AppState>>) -> Json<RaffleSnapshot> {
    Json(state.snapshot().await)
}
