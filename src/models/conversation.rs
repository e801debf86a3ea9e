use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::turn::{Role, Turn};

/// 会话实体
///
/// 以标识符为键、按顺序追加轮次的一段多轮对话。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// 会话唯一标识
    pub id: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后更新时间
    pub updated_at: DateTime<Utc>,

    /// 按序号排列的轮次
    pub turns: Vec<Turn>,
}

impl Conversation {
    /// 创建新会话
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        }
    }

    /// 轮次数量
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// 下一个轮次序号
    pub fn next_sequence(&self) -> u64 {
        self.turns.len() as u64
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// 历史消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// 从持久化轮次重建的内存对话历史
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    messages: Vec<HistoryMessage>,
}

impl ConversationHistory {
    /// 按 `sequence` 重建历史，保留原有角色标记
    pub fn from_turns(turns: &[Turn]) -> Self {
        let mut ordered: Vec<&Turn> = turns.iter().collect();
        ordered.sort_by_key(|t| t.sequence);

        Self {
            messages: ordered
                .into_iter()
                .map(|t| HistoryMessage {
                    role: t.role,
                    content: t.content.clone(),
                })
                .collect(),
        }
    }

    pub fn messages(&self) -> &[HistoryMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
