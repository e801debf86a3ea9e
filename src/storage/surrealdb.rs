use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::conversation::Conversation;
use crate::models::turn::Turn;
use crate::storage::repository::{ConversationStore, check_append};

/// SurrealDB 连接池
#[derive(Clone)]
pub struct SurrealPool {
    /// 数据库连接
    db: Arc<Mutex<Option<Surreal<Any>>>>,
}

impl SurrealPool {
    /// 创建新的连接池
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db: Surreal<Any> = connect(&config.url).await?;

        // 嵌入式引擎无需认证
        if !config.username.is_empty() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self {
            db: Arc::new(Mutex::new(Some(db))),
        })
    }

    /// 获取内部数据库实例
    pub async fn inner(&self) -> Result<Surreal<Any>> {
        let guard = self.db.lock().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| AppError::Database("Database connection closed".to_string()))
    }
}

/// 会话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConversationRecord {
    conversation_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    turn_count: u64,
}

const CONFLICT_MARKER: &str = "conversation_conflict";
const MISSING_MARKER: &str = "conversation_missing";
const SEQUENCE_INDEX: &str = "turn_sequence";

const APPEND_QUERY: &str = r#"
BEGIN TRANSACTION;
LET $current = (SELECT VALUE turn_count FROM type::thing('conversation', $id))[0];
IF $current == NONE { THROW "conversation_missing" };
IF $current != $expected { THROW "conversation_conflict" };
FOR $turn IN $turns { CREATE turn CONTENT $turn; };
UPDATE type::thing('conversation', $id) SET turn_count = $current + $added, updated_at = $updated_at;
COMMIT TRANSACTION;
"#;

/// SurrealDB 会话存储
///
/// 表 `conversation` 保存会话头，表 `turn` 保存轮次；
/// 追加在单个事务内完成，并以 (conversation_id, sequence) 唯一索引兜底。
#[derive(Clone)]
pub struct SurrealConversationStore {
    pool: SurrealPool,
}

impl SurrealConversationStore {
    pub async fn new(pool: SurrealPool) -> Result<Self> {
        let db = pool.inner().await?;
        db.query(format!(
            "DEFINE INDEX IF NOT EXISTS {} ON turn FIELDS conversation_id, sequence UNIQUE",
            SEQUENCE_INDEX
        ))
        .await?
        .check()?;
        Ok(Self { pool })
    }

    /// 事务被 THROW 取消后其余语句只报告“未执行”，需扫描全部语句的错误。
    fn map_append_error(conversation_id: &str, messages: &[String]) -> AppError {
        let any = |marker: &str| messages.iter().any(|m| m.contains(marker));
        if any(CONFLICT_MARKER) || any(SEQUENCE_INDEX) {
            AppError::Conflict(format!(
                "Conversation {} was modified concurrently",
                conversation_id
            ))
        } else if any(MISSING_MARKER) {
            AppError::NotFound(format!("Conversation not found: {}", conversation_id))
        } else {
            AppError::Database(messages.join("; "))
        }
    }
}

#[async_trait]
impl ConversationStore for SurrealConversationStore {
    async fn create(&self) -> Result<Conversation> {
        let conversation = Conversation::new();
        let record = ConversationRecord {
            conversation_id: conversation.id.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            turn_count: 0,
        };

        self.pool
            .inner()
            .await?
            .query("CREATE type::thing('conversation', $id) CONTENT $record")
            .bind(("id", conversation.id.clone()))
            .bind(("record", record))
            .await?
            .check()?;

        debug!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let mut response = self
            .pool
            .inner()
            .await?
            .query(
                "SELECT conversation_id, created_at, updated_at, turn_count \
                 FROM type::thing('conversation', $id); \
                 SELECT conversation_id, sequence, role, content, created_at \
                 FROM turn WHERE conversation_id = $id ORDER BY sequence ASC",
            )
            .bind(("id", id.to_string()))
            .await?;

        let records: Vec<ConversationRecord> = response.take(0)?;
        let Some(record) = records.into_iter().next() else {
            return Ok(None);
        };
        let turns: Vec<Turn> = response.take(1)?;

        Ok(Some(Conversation {
            id: record.conversation_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            turns,
        }))
    }

    async fn append_turns(&self, conversation_id: &str, turns: Vec<Turn>) -> Result<()> {
        let expected = turns.first().map(|t| t.sequence).unwrap_or_default();
        // 事务内再次比对 turn_count
        check_append(conversation_id, expected, &turns)?;

        let added = turns.len() as u64;
        let mut response = self
            .pool
            .inner()
            .await?
            .query(APPEND_QUERY)
            .bind(("id", conversation_id.to_string()))
            .bind(("expected", expected))
            .bind(("added", added))
            .bind(("turns", turns))
            .bind(("updated_at", Utc::now()))
            .await
            .map_err(|e| Self::map_append_error(conversation_id, &[e.to_string()]))?;

        let mut errors: Vec<(usize, surrealdb::Error)> =
            response.take_errors().into_iter().collect();
        if errors.is_empty() {
            return Ok(());
        }
        errors.sort_by_key(|(index, _)| *index);
        let messages: Vec<String> = errors.iter().map(|(_, e)| e.to_string()).collect();
        Err(Self::map_append_error(conversation_id, &messages))
    }

    async fn count(&self) -> Result<u64> {
        let count: Option<u64> = self
            .pool
            .inner()
            .await?
            .query("SELECT count() FROM conversation GROUP ALL")
            .await?
            .take((0, "count"))?;

        Ok(count.unwrap_or(0))
    }

    async fn health_check(&self) -> Result<()> {
        self.pool.inner().await?.health().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::turn::Role;
    use tempfile::TempDir;

    async fn store() -> (TempDir, SurrealConversationStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            backend: "surrealdb".to_string(),
            url: format!("rocksdb://{}", dir.path().display()),
            namespace: "parley".to_string(),
            database: "test".to_string(),
            username: String::new(),
            password: String::new(),
        };
        let pool = SurrealPool::new(&config).await.unwrap();
        let store = SurrealConversationStore::new(pool).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, store) = store().await;
        assert_eq!(store.count().await.unwrap(), 0);

        let created = store.create().await.unwrap();
        let loaded = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, created.id);
        assert!(loaded.turns.is_empty());
        assert_eq!(store.count().await.unwrap(), 1);

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_appended_turns_read_back_in_sequence_order() {
        let (_dir, store) = store().await;
        let id = store.create().await.unwrap().id;

        store
            .append_turns(&id, vec![Turn::human(&id, 0, "hola"), Turn::ai(&id, 1, "buenas")])
            .await
            .unwrap();
        store
            .append_turns(&id, vec![Turn::human(&id, 2, "horario"), Turn::ai(&id, 3, "8 a 17")])
            .await
            .unwrap();

        let turns = store.get(&id).await.unwrap().unwrap().turns;
        let sequences: Vec<u64> = turns.iter().map(|t| t.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Ai, Role::Human, Role::Ai]);
        assert_eq!(turns[2].content, "horario");
    }

    #[tokio::test]
    async fn test_stale_append_is_conflict_and_writes_nothing() {
        let (_dir, store) = store().await;
        let id = store.create().await.unwrap().id;

        store
            .append_turns(&id, vec![Turn::human(&id, 0, "a"), Turn::ai(&id, 1, "b")])
            .await
            .unwrap();

        let err = store
            .append_turns(&id, vec![Turn::human(&id, 0, "c"), Turn::ai(&id, 1, "d")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "unexpected error: {err}");

        let turns = store.get(&id).await.unwrap().unwrap().turns;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "a");
    }

    #[tokio::test]
    async fn test_append_to_missing_conversation_is_not_found() {
        let (_dir, store) = store().await;

        let err = store
            .append_turns(
                "missing",
                vec![Turn::human("missing", 0, "a"), Turn::ai("missing", 1, "b")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "unexpected error: {err}");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_error_mapping_scans_every_statement() {
        let messages = vec![
            "The query was not executed due to a failed transaction".to_string(),
            "An error occurred: conversation_conflict".to_string(),
        ];
        assert!(matches!(
            SurrealConversationStore::map_append_error("c1", &messages),
            AppError::Conflict(_)
        ));

        let messages = vec!["connection reset".to_string()];
        assert!(matches!(
            SurrealConversationStore::map_append_error("c1", &messages),
            AppError::Database(_)
        ));
    }
}
