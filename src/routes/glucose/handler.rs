use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    common::ApiResponse,
    error::AppError,
    utils::success_to_api_response,
};

use super::model::GlucoseView;

#[axum::debug_handler]
pub async fn get_glucose(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GlucoseView>>, AppError> {
    tracing::debug!("Glucose data requested");
    let reading = state.store.latest().await.ok_or(AppError::NoDataAvailable)?;

    Ok(success_to_api_response(GlucoseView::new(
        &reading,
        &state.config.display,
        Utc::now(),
    )))
}
