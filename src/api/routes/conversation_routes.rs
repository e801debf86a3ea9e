//! Conversation Routes
//!
//! 定义会话查询的 API 路由。

use crate::api::handlers::conversation_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建会话路由器
pub fn create_conversation_router() -> Router<AppState> {
    Router::new().route("/conversations/:id", get(get_conversation))
}
