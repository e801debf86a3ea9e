//! 索引模块
//!
//! 知识库切分、嵌入与向量检索。

pub mod embedding;
pub mod knowledge;
pub mod vector;

pub use embedding::{EmbeddingModel, HashingEmbeddingModel, create_embedding_model};
pub use knowledge::{KnowledgeBase, split_chunks};
pub use vector::{MemoryVectorIndex, RetrievedChunk, VectorIndex};

use std::sync::Arc;

use crate::config::config::{EmbeddingConfig, KnowledgeConfig};
use crate::error::Result;

/// 启动时构建知识库索引
///
/// 源文档不存在时返回 `None`，服务照常启动。
pub async fn create_knowledge_index(
    knowledge: &KnowledgeConfig,
    embedding: &EmbeddingConfig,
) -> Result<Option<Arc<dyn VectorIndex>>> {
    let Some(knowledge_base) = KnowledgeBase::load(&knowledge.source_path)? else {
        return Ok(None);
    };

    let embedding_model = create_embedding_model(embedding)?;
    let index = knowledge_base.build_index(embedding_model).await?;
    Ok(Some(Arc::new(index)))
}
