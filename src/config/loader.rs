use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 环境变量前缀
const ENV_PREFIX: &str = "PARLEY_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 优先级（后者覆盖前者）：
    /// 1. 内置开发环境默认值
    /// 2. ./parley.toml
    /// 3. `PARLEY_` 前缀的环境变量，嵌套字段以 `__` 分隔
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.knowledge.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigValidationError::InvalidDimension);
        }

        match config.database.backend.as_str() {
            "memory" => {}
            "surrealdb" if config.database.url.is_empty() => {
                return Err(ConfigValidationError::MissingDatabaseUrl);
            }
            "surrealdb" => {}
            other => {
                return Err(ConfigValidationError::UnknownBackend(format!(
                    "database.backend = {}",
                    other
                )));
            }
        }

        if !matches!(config.embedding.backend.as_str(), "hashing" | "ollama") {
            return Err(ConfigValidationError::UnknownBackend(format!(
                "embedding.backend = {}",
                config.embedding.backend
            )));
        }

        if !matches!(config.generator.backend.as_str(), "openai" | "extractive") {
            return Err(ConfigValidationError::UnknownBackend(format!(
                "generator.backend = {}",
                config.generator.backend
            )));
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("检索数量 top_k 无效，必须大于 0")]
    InvalidTopK,

    #[error("向量维度无效，必须大于 0")]
    InvalidDimension,

    #[error("数据库连接 URL 未配置")]
    MissingDatabaseUrl,

    #[error("未知的后端类型: {0}")]
    UnknownBackend(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("parley.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().expect("defaults should load");
            assert_eq!(config.knowledge.top_k, 4);
            assert_eq!(config.database.backend, "memory");
            assert!(ConfigLoader::validate(&config).is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "parley.toml",
                r#"
                [knowledge]
                top_k = 6

                [generator]
                model = "gpt-4o-mini"
                "#,
            )?;
            jail.set_env("PARLEY_GENERATOR__API_KEY", "sk-test");
            jail.set_env("PARLEY_SERVER__PORT", "9090");

            let config = ConfigLoader::load().expect("config should load");
            assert_eq!(config.knowledge.top_k, 6);
            assert_eq!(config.generator.model, "gpt-4o-mini");
            assert_eq!(config.generator.api_key, "sk-test");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.synonyms.path, PathBuf::from("filtros.json"));
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::development();
        config.knowledge.top_k = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidTopK)
        ));

        let mut config = AppConfig::development();
        config.generator.backend = "telepathy".into();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::UnknownBackend(_))
        ));
    }
}
