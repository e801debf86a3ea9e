//! OpenAI 兼容的对话补全生成器
//!
//! 将检索片段放入 system 消息，历史映射为 user/assistant 消息，
//! 最后附上归一化后的问题。

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::config::config::GeneratorConfig;
use crate::error::{AppError, Result};
use crate::generation::Generator;
use crate::index::vector::RetrievedChunk;
use crate::models::conversation::HistoryMessage;
use crate::models::turn::Role;

const SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

pub struct OpenAiCompatibleGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout.max(1)))
            .build()
            .map_err(|e| AppError::Generation(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// 组装请求消息
    pub fn build_messages(
        question: &str,
        context: &[RetrievedChunk],
        history: &[HistoryMessage],
    ) -> Vec<Value> {
        let context_text = context
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(json!({
            "role": "system",
            "content": format!("{}\n----------------\n{}", SYSTEM_PROMPT, context_text),
        }));

        for message in history {
            let role = match message.role {
                Role::Human => "user",
                Role::Ai => "assistant",
            };
            messages.push(json!({ "role": role, "content": message.content }));
        }

        messages.push(json!({ "role": "user", "content": question }));
        messages
    }
}

#[async_trait]
impl Generator for OpenAiCompatibleGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &[RetrievedChunk],
        history: &[HistoryMessage],
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AppError::Generation(
                "API key is not configured for the openai generator".to_string(),
            ));
        }

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": Self::build_messages(question, context, history),
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!(
            "Requesting completion from {} with {} context chunks",
            url,
            context.len()
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("connection failed ({}): {}", url, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("API error {}: {}", status, text)));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(String::from)
            .ok_or_else(|| AppError::Generation("No content in completion response".to_string()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
