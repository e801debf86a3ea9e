use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 消息角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 用户提问
    Human,
    /// 生成的回答
    Ai,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "human",
            Role::Ai => "ai",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对话轮次
///
/// 一条消息（用户问题或生成的回答）。创建后不可变，
/// `sequence` 为其在所属会话中从 0 开始的位置。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// 所属会话 ID
    pub conversation_id: String,

    /// 会话内序号
    pub sequence: u64,

    /// 消息角色
    pub role: Role,

    /// 消息内容
    pub content: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// 创建新轮次
    pub fn new(conversation_id: &str, sequence: u64, role: Role, content: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            sequence,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    /// 创建用户提问轮次
    pub fn human(conversation_id: &str, sequence: u64, content: &str) -> Self {
        Self::new(conversation_id, sequence, Role::Human, content)
    }

    /// 创建回答轮次
    pub fn ai(conversation_id: &str, sequence: u64, content: &str) -> Self {
        Self::new(conversation_id, sequence, Role::Ai, content)
    }
}
