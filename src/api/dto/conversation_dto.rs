//! 会话 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::answer_dto::TurnResponse;
use crate::models::conversation::Conversation;

/// 会话详情响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<TurnResponse>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        let mut turns = conversation.turns;
        turns.sort_by_key(|t| t.sequence);
        Self {
            conversation_id: conversation.id,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            history: turns.into_iter().map(TurnResponse::from).collect(),
        }
    }
}
