use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

/// 会话存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 存储后端: "memory" 或 "surrealdb"
    pub backend: String,
    /// SurrealDB 连接地址
    pub url: String,
    /// 命名空间
    pub namespace: String,
    /// 数据库名称
    pub database: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: String,
}

/// 知识库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// 知识库源文档路径
    pub source_path: PathBuf,
    /// 每次检索返回的片段数量
    pub top_k: usize,
}

/// 同义词表配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SynonymConfig {
    /// 同义词 JSON 文件路径
    pub path: PathBuf,
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding 后端类型: "hashing" 或 "ollama"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// 向量维度
    pub dimension: usize,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// 请求超时（秒）
    pub timeout: u64,
}

/// 文本生成配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// 生成后端: "openai" 或 "extractive"
    pub backend: String,
    /// OpenAI 兼容接口地址
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 请求超时（秒）
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化（JSON）日志格式
    pub structured: bool,
    /// 日志文件目录，未设置时输出到标准输出
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 会话存储配置
    pub database: DatabaseConfig,
    /// 知识库配置
    pub knowledge: KnowledgeConfig,
    /// 同义词表配置
    pub synonyms: SynonymConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 文本生成配置
    pub generator: GeneratorConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: "memory".into(),
                url: "ws://localhost:8000".into(),
                namespace: "parley".into(),
                database: "conversations".into(),
                username: "root".into(),
                password: "root".into(),
            },
            knowledge: KnowledgeConfig {
                source_path: PathBuf::from("conocimiento.txt"),
                top_k: 4,
            },
            synonyms: SynonymConfig {
                path: PathBuf::from("filtros.json"),
            },
            embedding: EmbeddingConfig {
                backend: "hashing".into(),
                model_name: "ibm-granite/granite-embedding-278m-multilingual".into(),
                dimension: 384,
                ollama_url: "http://localhost:11434".into(),
                timeout: 60,
            },
            generator: GeneratorConfig {
                backend: "openai".into(),
                base_url: "https://api.openai.com/v1".into(),
                api_key: String::new(),
                model: "gpt-4o".into(),
                temperature: 0.0,
                timeout: 120,
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "parley".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.server.host = "0.0.0.0".into();
        config.database.backend = "surrealdb".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config
    }
}
