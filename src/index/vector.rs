//! 向量索引服务

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::index::embedding::EmbeddingModel;

/// 检索到的知识片段，仅在单次回答内使用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// 片段文本
    pub text: String,
    /// 相似度排名，0 为最相关
    pub rank: usize,
    /// 相似度得分
    pub score: f32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// 返回与查询最相关的前 `limit` 个片段
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>>;

    /// 已索引的原始片段，用于诊断；不支持时返回空集合
    async fn partitions(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

struct IndexedChunk {
    text: String,
    vector: Vec<f32>,
}

/// 内存向量索引，暴力余弦相似度扫描
pub struct MemoryVectorIndex {
    chunks: RwLock<Vec<IndexedChunk>>,
    embedding_model: Box<dyn EmbeddingModel>,
}

impl MemoryVectorIndex {
    pub fn new(embedding_model: Box<dyn EmbeddingModel>) -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            embedding_model,
        }
    }

    /// 嵌入并追加片段，返回新增数量
    pub async fn add_chunks(&self, texts: &[String]) -> Result<usize> {
        if texts.is_empty() {
            return Ok(0);
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.embedding_model.encode_batch(&refs).await?;

        if vectors.len() != texts.len() {
            return Err(AppError::VectorIndex(format!(
                "Embedding model returned {} vectors for {} chunks",
                vectors.len(),
                texts.len()
            )));
        }

        let dimension = self.embedding_model.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(AppError::VectorIndex(format!(
                "Expected vectors of dimension {}, got {}",
                dimension,
                bad.len()
            )));
        }

        let mut chunks = self.chunks.write().await;
        chunks.extend(
            texts
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(text, vector)| IndexedChunk { text, vector }),
        );
        Ok(texts.len())
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
        let query_vector = self.embedding_model.encode(query).await?;
        let chunks = self.chunks.read().await;

        let mut scored: Vec<(f32, &IndexedChunk)> = chunks
            .iter()
            .map(|chunk| (Self::cosine_similarity(&query_vector, &chunk.vector), chunk))
            .collect();

        // Stable sort: equal scores keep document order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (score, chunk))| RetrievedChunk {
                text: chunk.text.clone(),
                rank,
                score,
            })
            .collect())
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        Ok(self
            .chunks
            .read()
            .await
            .iter()
            .map(|c| c.text.clone())
            .collect())
    }
}
