//! 存储层模块
//!
//! 会话与轮次的持久化，支持内存和 SurrealDB 两种后端。

#[cfg(feature = "surrealdb")]
pub mod surrealdb;

pub mod factory;
pub mod repository;

pub use factory::StorageFactory;
pub use repository::{ConversationStore, MemoryConversationStore};
