//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod answer_handler;
pub mod conversation_handler;
pub mod partition_handler;

pub use answer_handler::*;
pub use conversation_handler::*;
pub use partition_handler::*;
