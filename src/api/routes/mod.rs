//! Routes 模块
//!
//! 定义 API 路由。

pub mod answer_routes;
pub mod conversation_routes;
pub mod partition_routes;
