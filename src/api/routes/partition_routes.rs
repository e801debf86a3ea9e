//! Partition Routes

use crate::api::handlers::partition_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建知识片段路由器
pub fn create_partition_router() -> Router<AppState> {
    Router::new().route("/partitions", get(list_partitions))
}
