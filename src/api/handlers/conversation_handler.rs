use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::conversation_dto::ConversationResponse},
    error::AppError,
};

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting conversation: {}", id);

    let conversation = state.answer_service.conversation(&id).await?;
    Ok(Json(ConversationResponse::from(conversation)))
}
