//! 存储工厂模块
//!
//! 根据配置创建相应的会话存储实例。

use std::sync::Arc;
use tracing::info;

use crate::config::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::storage::repository::{ConversationStore, MemoryConversationStore};

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::{SurrealConversationStore, SurrealPool};

/// 存储工厂
pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建会话存储
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn ConversationStore>> {
        match config.backend.as_str() {
            "memory" => {
                info!("Using in-memory conversation store");
                Ok(Arc::new(MemoryConversationStore::new()))
            }
            "surrealdb" => Self::create_surrealdb(config).await,
            other => Err(AppError::Config(format!(
                "Unknown conversation store backend: {}",
                other
            ))),
        }
    }

    #[cfg(feature = "surrealdb")]
    async fn create_surrealdb(config: &DatabaseConfig) -> Result<Arc<dyn ConversationStore>> {
        let pool = SurrealPool::new(config).await?;
        let store = SurrealConversationStore::new(pool).await?;
        info!("Using SurrealDB conversation store at {}", config.url);
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "surrealdb"))]
    async fn create_surrealdb(_config: &DatabaseConfig) -> Result<Arc<dyn ConversationStore>> {
        Err(AppError::Config(
            "SurrealDB feature is not enabled. Enable 'surrealdb' feature to use it.".into(),
        ))
    }
}
