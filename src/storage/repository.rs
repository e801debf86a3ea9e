use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::models::conversation::Conversation;
use crate::models::turn::Turn;

/// 会话存储 trait
///
/// 会话轮次的唯一事实来源。实现必须保证 `append_turns` 原子生效：
/// 要么全部写入，要么一条都不写。
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// 创建并立即持久化一个空会话
    async fn create(&self) -> Result<Conversation>;

    /// 根据 ID 获取会话（含按序排列的全部轮次）
    async fn get(&self, id: &str) -> Result<Option<Conversation>>;

    /// 原子追加轮次
    ///
    /// 第一条轮次的 `sequence` 必须等于会话当前长度，
    /// 否则说明会话已被并发修改，返回 `AppError::Conflict`。
    async fn append_turns(&self, conversation_id: &str, turns: Vec<Turn>) -> Result<()>;

    /// 统计会话数量
    async fn count(&self) -> Result<u64>;

    /// 检查存储是否可用
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 校验待追加轮次与会话当前状态是否连续
pub(crate) fn check_append(conversation_id: &str, current_len: u64, turns: &[Turn]) -> Result<()> {
    let Some(first) = turns.first() else {
        return Err(AppError::Validation("No turns to append".to_string()));
    };

    if turns.iter().any(|t| t.conversation_id != conversation_id) {
        return Err(AppError::Validation(format!(
            "Turns do not belong to conversation {}",
            conversation_id
        )));
    }

    if turns
        .iter()
        .enumerate()
        .any(|(offset, t)| t.sequence != first.sequence + offset as u64)
    {
        return Err(AppError::Validation(
            "Turn sequence numbers must be contiguous".to_string(),
        ));
    }

    if first.sequence != current_len {
        return Err(AppError::Conflict(format!(
            "Conversation {} has {} turns, expected to append at {}",
            conversation_id, current_len, first.sequence
        )));
    }

    Ok(())
}

/// 内存会话存储
///
/// 每个会话的追加在 DashMap 分片写锁内完成。
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    conversations: DashMap<String, Conversation>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create(&self) -> Result<Conversation> {
        let conversation = Conversation::new();
        self.conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.get(id).map(|c| c.value().clone()))
    }

    async fn append_turns(&self, conversation_id: &str, turns: Vec<Turn>) -> Result<()> {
        let mut conversation = self
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Conversation not found: {}", conversation_id))
            })?;

        check_append(conversation_id, conversation.next_sequence(), &turns)?;

        conversation.turns.extend(turns);
        conversation.updated_at = Utc::now();
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.conversations.len() as u64)
    }
}
