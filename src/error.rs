//! 错误处理模块
//!
//! 定义应用程序的错误类型以及到 HTTP 响应的映射。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    /// 请求体无法解析，携带解析器给出的原因
    #[error("请求体无效")]
    InvalidBody(String),

    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 并发写入冲突
    #[error("写入冲突: {0}")]
    Conflict(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 持久化错误
    #[error("数据库错误: {0}")]
    Database(String),

    /// 依赖的外部能力不可用（例如知识库未加载）
    #[error("服务不可用: {0}")]
    Unavailable(String),

    /// 向量索引错误
    #[error("向量索引错误: {0}")]
    VectorIndex(String),

    /// 嵌入模型错误
    #[error("嵌入模型错误: {0}")]
    Embedding(String),

    /// 文本生成错误
    #[error("生成失败: {0}")]
    Generation(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(feature = "surrealdb")]
impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

/// Axum response implementation for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code): (u16, String) = (&self).into();
        let request_id = Uuid::new_v4().to_string();
        if self.is_server_error() {
            tracing::error!(request_id = %request_id, code = %code, "{}", self);
        }

        let mut response =
            ErrorResponse::new(&code, &self.to_string()).with_request_id(&request_id);
        if let AppError::InvalidBody(details) = &self {
            response = response.with_details(details);
        }
        let body = Json(response);
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response()
    }
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,
    /// 错误消息
    pub message: String,
    /// 详细信息
    pub details: Option<String>,
    /// 请求 ID
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// 创建新错误响应
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    /// 添加详细信息
    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    /// 关联请求 ID，与服务端日志对应
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

/// HTTP 状态码映射
impl From<&AppError> for (u16, String) {
    fn from(err: &AppError) -> (u16, String) {
        match err {
            AppError::Validation(_) | AppError::InvalidBody(_) => (400, "BAD_REQUEST".to_string()),
            AppError::NotFound(_) => (404, "NOT_FOUND".to_string()),
            AppError::Conflict(_) => (409, "CONFLICT".to_string()),
            AppError::Unavailable(_) => (500, "COLLABORATOR_UNAVAILABLE".to_string()),
            AppError::VectorIndex(_) => (500, "INDEX_ERROR".to_string()),
            AppError::Embedding(_) => (500, "EMBEDDING_ERROR".to_string()),
            AppError::Generation(_) => (500, "GENERATION_ERROR".to_string()),
            AppError::Database(_) => (500, "PERSISTENCE_ERROR".to_string()),
            _ => (500, "INTERNAL_ERROR".to_string()),
        }
    }
}

impl AppError {
    /// 是否属于服务端错误（5xx）
    pub fn is_server_error(&self) -> bool {
        let (status, _): (u16, String) = self.into();
        status >= 500
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;
