//! 检索增强问答流水线
//!
//! 串联归一化、会话存储、向量检索与文本生成，
//! 每次成功回答为会话追加一问一答两个轮次。

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::generation::{Generator, sanitize_answer};
use crate::index::vector::VectorIndex;
use crate::models::conversation::{Conversation, ConversationHistory};
use crate::models::turn::Turn;
use crate::storage::repository::ConversationStore;
use crate::synonyms::normalizer::Normalizer;

/// 默认检索片段数量
pub const DEFAULT_TOP_K: usize = 4;

/// 一次回答的结果
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    /// 清理后的回答文本
    pub response: String,
    /// 会话 ID（新建会话时为新 ID）
    pub conversation_id: String,
    /// 追加后的完整轮次序列
    pub history: Vec<Turn>,
}

/// 问答服务 trait
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// 解析会话：存在则返回，否则新建并立即持久化
    async fn resolve_conversation(&self, conversation_id: Option<&str>) -> Result<Conversation>;

    /// 回答问题并追加轮次
    async fn answer(&self, question: &str, conversation_id: Option<&str>)
    -> Result<AnswerOutcome>;

    /// 列出已索引的知识片段
    async fn partitions(&self) -> Result<Vec<String>>;

    /// 读取会话，不存在时返回 NotFound
    async fn conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// 知识库是否已加载
    fn knowledge_loaded(&self) -> bool;
}

/// 检索增强问答流水线
pub struct RetrievalPipeline {
    normalizer: Normalizer,
    store: Arc<dyn ConversationStore>,
    index: Option<Arc<dyn VectorIndex>>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl RetrievalPipeline {
    pub fn new(
        normalizer: Normalizer,
        store: Arc<dyn ConversationStore>,
        index: Option<Arc<dyn VectorIndex>>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            normalizer,
            store,
            index,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

#[async_trait]
impl AnswerService for RetrievalPipeline {
    async fn resolve_conversation(&self, conversation_id: Option<&str>) -> Result<Conversation> {
        let requested = conversation_id.map(str::trim).filter(|id| !id.is_empty());

        if let Some(id) = requested {
            if let Some(conversation) = self.store.get(id).await? {
                return Ok(conversation);
            }
            debug!("Conversation {} not found, starting a new one", id);
        }

        let conversation = self.store.create().await?;
        info!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    async fn answer(
        &self,
        question: &str,
        conversation_id: Option<&str>,
    ) -> Result<AnswerOutcome> {
        if question.trim().is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }

        // 未加载知识库时不得创建会话
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("knowledge base not loaded".to_string()))?;

        let conversation = self.resolve_conversation(conversation_id).await?;
        let history = ConversationHistory::from_turns(&conversation.turns);

        let normalized = self.normalizer.normalize(question);
        debug!(
            conversation_id = %conversation.id,
            original = %question,
            normalized = %normalized,
            history_len = history.len(),
            "Normalized question"
        );

        let chunks = index.search(&normalized, self.top_k).await?;
        debug!("Retrieved {} knowledge chunks", chunks.len());

        let generated = self
            .generator
            .generate(&normalized, &chunks, history.messages())
            .await?;
        let response = sanitize_answer(&generated);

        let sequence = conversation.next_sequence();
        let new_turns = vec![
            Turn::human(&conversation.id, sequence, question),
            Turn::ai(&conversation.id, sequence + 1, &response),
        ];
        self.store
            .append_turns(&conversation.id, new_turns.clone())
            .await?;

        let mut turns = conversation.turns;
        turns.extend(new_turns);

        Ok(AnswerOutcome {
            response,
            conversation_id: conversation.id,
            history: turns,
        })
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        match &self.index {
            Some(index) => index.partitions().await,
            None => Ok(Vec::new()),
        }
    }

    async fn conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.store
            .get(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Conversation not found: {}", conversation_id)))
    }

    fn knowledge_loaded(&self) -> bool {
        self.index.is_some()
    }
}

/// 创建问答服务
pub fn create_answer_service(
    normalizer: Normalizer,
    store: Arc<dyn ConversationStore>,
    index: Option<Arc<dyn VectorIndex>>,
    generator: Arc<dyn Generator>,
    top_k: usize,
) -> Box<dyn AnswerService> {
    Box::new(RetrievalPipeline::new(normalizer, store, index, generator).with_top_k(top_k))
}
