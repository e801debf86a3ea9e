//! 抽取式生成器
//!
//! 离线后备方案：直接返回最相关的片段。

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::Generator;
use crate::index::vector::RetrievedChunk;
use crate::models::conversation::HistoryMessage;

pub const NO_CONTEXT_ANSWER: &str = "No relevant information was found in the knowledge base.";

#[derive(Debug, Default)]
pub struct ExtractiveGenerator;

impl ExtractiveGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for ExtractiveGenerator {
    async fn generate(
        &self,
        _question: &str,
        context: &[RetrievedChunk],
        _history: &[HistoryMessage],
    ) -> Result<String> {
        Ok(context
            .iter()
            .min_by_key(|c| c.rank)
            .map(|c| c.text.clone())
            .unwrap_or_else(|| NO_CONTEXT_ANSWER.to_string()))
    }

    fn name(&self) -> &'static str {
        "extractive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_best_chunk() {
        let context = vec![
            RetrievedChunk {
                text: "second".into(),
                rank: 1,
                score: 0.5,
            },
            RetrievedChunk {
                text: "first".into(),
                rank: 0,
                score: 0.9,
            },
        ];
        let answer = ExtractiveGenerator::new()
            .generate("q", &context, &[])
            .await
            .unwrap();
        assert_eq!(answer, "first");
    }

    #[tokio::test]
    async fn test_no_context() {
        let answer = ExtractiveGenerator::new().generate("q", &[], &[]).await.unwrap();
        assert_eq!(answer, NO_CONTEXT_ANSWER);
    }
}
