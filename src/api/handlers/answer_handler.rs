use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use std::time::Instant;
use tracing::debug;

use crate::{
    api::{
        app_state::AppState,
        dto::answer_dto::{AnswerRequest, AnswerResponse, TurnResponse},
    },
    error::AppError,
};

pub async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    debug!(
        "Answer request: conversation_id={:?}",
        request.conversation_id
    );

    let include_history = request.include_history();
    let question = request.question.unwrap_or_default();

    let start = Instant::now();
    let result = state
        .answer_service
        .answer(&question, request.conversation_id.as_deref())
        .await;
    state
        .metrics
        .record_answer(start.elapsed().as_millis() as u64, result.is_ok());
    let outcome = result?;

    let response = AnswerResponse {
        response: outcome.response,
        conversation_id: outcome.conversation_id,
        history: include_history
            .then(|| outcome.history.into_iter().map(TurnResponse::from).collect()),
    };

    Ok(Json(response))
}
