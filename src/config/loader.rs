//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（folio.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["folio", "folio.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `FOLIO_API__BASE_URL=https://books.example.com`
/// - `FOLIO_API__TOKEN=9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b`
/// - `FOLIO_POLL__CHAPTER_DEADLINE_SECS=600`
/// - `FOLIO_STORAGE__DRAFT_DB_PATH=/data/folio.sled`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("api.base_url", "http://localhost:8000")?
        .set_default("api.timeout_secs", 60)?
        .set_default("poll.interval_ms", 1200)?
        .set_default("poll.default_deadline_secs", 240)?
        .set_default("poll.chapter_deadline_secs", 480)?
        .set_default("storage.draft_db_path", "data/folio.sled")?
        .set_default("storage.draft_key", "folio_draft_v1")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量
    // 前缀: FOLIO_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("FOLIO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "API base URL cannot be empty".to_string(),
        ));
    }

    let routes = &config.api.routes;
    if routes.books_prefixes.is_empty() || routes.runs_prefixes.is_empty() {
        return Err(ConfigError::ValidationError(
            "Route prefix lists cannot be empty".to_string(),
        ));
    }
    if routes.legacy_execute_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Legacy execute path cannot be empty".to_string(),
        ));
    }

    if config.poll.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Poll interval cannot be 0".to_string(),
        ));
    }

    if config.poll.chapter_deadline_secs < config.poll.default_deadline_secs {
        return Err(ConfigError::ValidationError(
            "Chapter deadline cannot be shorter than the default deadline".to_string(),
        ));
    }

    if config.storage.draft_db_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Draft database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("API Base URL: {}", config.api.base_url);
    tracing::info!("API Token: {}", if config.api.token.is_some() { "set" } else { "not set" });
    tracing::info!("API Timeout: {}s", config.api.timeout_secs);
    tracing::info!("Books Prefixes: {:?}", config.api.routes.books_prefixes);
    tracing::info!("Runs Prefixes: {:?}", config.api.routes.runs_prefixes);
    tracing::info!("Legacy Execute: {}", config.api.routes.legacy_execute_path);
    tracing::info!(
        "Poll: every {}ms, deadline {}s (chapter {}s)",
        config.poll.interval_ms,
        config.poll.default_deadline_secs,
        config.poll.chapter_deadline_secs
    );
    tracing::info!("Draft Store: {} [{}]", config.storage.draft_db_path, config.storage.draft_key);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
