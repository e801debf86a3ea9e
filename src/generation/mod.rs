//! 文本生成模块
//!
//! 根据检索片段、归一化问题与对话历史生成回答。

pub mod extractive;
pub mod openai;

pub use extractive::ExtractiveGenerator;
pub use openai::OpenAiCompatibleGenerator;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::config::config::GeneratorConfig;
use crate::error::{AppError, Result};
use crate::index::vector::RetrievedChunk;
use crate::models::conversation::HistoryMessage;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// 生成回答
    async fn generate(
        &self,
        question: &str,
        context: &[RetrievedChunk],
        history: &[HistoryMessage],
    ) -> Result<String>;

    /// 后端名称
    fn name(&self) -> &'static str;
}

static ESCAPES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+").expect("static regex"));

/// 清理模型输出中的反斜杠转义符
pub fn sanitize_answer(text: &str) -> String {
    ESCAPES.replace_all(text, "").trim().to_string()
}

pub fn create_generator(config: &GeneratorConfig) -> Result<Arc<dyn Generator>> {
    match config.backend.as_str() {
        "openai" => Ok(Arc::new(OpenAiCompatibleGenerator::new(config)?)),
        "extractive" => Ok(Arc::new(ExtractiveGenerator::new())),
        other => Err(AppError::Config(format!(
            "Unknown generator backend: {}",
            other
        ))),
    }
}
