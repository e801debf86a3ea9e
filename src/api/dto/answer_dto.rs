//! 问答 DTO
//!
//! 定义问答请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::turn::{Role, Turn};

/// 问答请求
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnswerRequest {
    /// 会话 ID，缺省或未知时新建会话
    pub conversation_id: Option<String>,
    /// 问题文本
    #[serde(alias = "prompt")]
    pub question: Option<String>,
    /// 响应中是否包含完整历史，默认包含
    pub include_history: Option<bool>,
}

impl AnswerRequest {
    pub fn include_history(&self) -> bool {
        self.include_history.unwrap_or(true)
    }
}

/// 问答响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub response: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<TurnResponse>>,
}

/// 轮次响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnResponse {
    pub role: Role,
    pub content: String,
    pub sequence: u64,
}

impl From<Turn> for TurnResponse {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
            sequence: turn.sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_prompt_alias() {
        let request: AnswerRequest =
            serde_json::from_str(r#"{"prompt": "hola", "conversationId": "c1"}"#).unwrap();
        assert_eq!(request.question.as_deref(), Some("hola"));
        assert_eq!(request.conversation_id.as_deref(), Some("c1"));
        assert!(request.include_history());
    }

    #[test]
    fn test_request_defaults() {
        let request: AnswerRequest = serde_json::from_str("{}").unwrap();
        assert!(request.question.is_none());
        assert!(request.conversation_id.is_none());

        let request: AnswerRequest =
            serde_json::from_str(r#"{"question": "q", "includeHistory": false}"#).unwrap();
        assert!(!request.include_history());
    }

    #[test]
    fn test_response_omits_history_when_absent() {
        let response = AnswerResponse {
            response: "r".into(),
            conversation_id: "c1".into(),
            history: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, serde_json::json!({"response": "r", "conversationId": "c1"}));
    }
}
