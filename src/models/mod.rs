//! 数据模型模块
//!
//! 定义会话与轮次的核心数据结构。

pub mod conversation;
pub mod turn;

pub use conversation::{Conversation, ConversationHistory, HistoryMessage};
pub use turn::{Role, Turn};
