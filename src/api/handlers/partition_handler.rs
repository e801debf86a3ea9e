use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    api::{app_state::AppState, dto::partition_dto::PartitionListResponse},
    error::AppError,
};

pub async fn list_partitions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.metrics.record_partitions();
    let partitions = state.answer_service.partitions().await?;
    Ok(Json(PartitionListResponse::from(partitions)))
}
