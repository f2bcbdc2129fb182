use axum::{Json, extract::State};
use serde::Serialize;

use crate::{AppState, cache::PollStatus, common::ApiResponse, utils::success_to_api_response};

#[derive(Debug, Serialize)]
pub struct StatusView {
    #[serde(flatten)]
    pub poll: PollStatus,
    pub has_session: bool,
    pub has_reading: bool,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "glucose-relay"
    }))
}

#[axum::debug_handler]
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusView>> {
    success_to_api_response(StatusView {
        poll: state.store.status().await,
        has_session: state.store.has_session().await,
        has_reading: state.store.latest().await.is_some(),
    })
}
