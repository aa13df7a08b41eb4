//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::services::{PollPolicy, RouteTable};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 远端书籍服务
    #[serde(default)]
    pub api: ApiConfig,

    /// 任务轮询
    #[serde(default)]
    pub poll: PollConfig,

    /// 本地草稿存储
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 远端服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 服务基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// DRF Token，未设置则匿名访问
    #[serde(default)]
    pub token: Option<String>,

    /// 单请求超时（秒）
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// 候选路径
    #[serde(default)]
    pub routes: RoutesConfig,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_timeout() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_api_timeout(),
            routes: RoutesConfig::default(),
        }
    }
}

/// 候选路径前缀（按顺序尝试，404 时换下一个）
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_books_prefixes")]
    pub books_prefixes: Vec<String>,

    #[serde(default = "default_runs_prefixes")]
    pub runs_prefixes: Vec<String>,

    /// 旧版同步执行接口
    #[serde(default = "default_legacy_execute_path")]
    pub legacy_execute_path: String,
}

fn default_books_prefixes() -> Vec<String> {
    vec!["/api/books".to_string(), "/api".to_string()]
}

fn default_runs_prefixes() -> Vec<String> {
    vec!["/api/agents".to_string(), "/api".to_string()]
}

fn default_legacy_execute_path() -> String {
    "/api/agents/book-writing/execute/".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            books_prefixes: default_books_prefixes(),
            runs_prefixes: default_runs_prefixes(),
            legacy_execute_path: default_legacy_execute_path(),
        }
    }
}

impl RoutesConfig {
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(
            self.books_prefixes.clone(),
            self.runs_prefixes.clone(),
            self.legacy_execute_path.clone(),
        )
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// 轮询间隔（毫秒）
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// 大纲、修订、导出的总时限（秒）
    #[serde(default = "default_deadline_secs")]
    pub default_deadline_secs: u64,

    /// 章节生成的总时限（秒）
    #[serde(default = "default_chapter_deadline_secs")]
    pub chapter_deadline_secs: u64,
}

fn default_interval_ms() -> u64 {
    1200
}

fn default_deadline_secs() -> u64 {
    240
}

fn default_chapter_deadline_secs() -> u64 {
    480
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            default_deadline_secs: default_deadline_secs(),
            chapter_deadline_secs: default_chapter_deadline_secs(),
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            default_deadline: Duration::from_secs(self.default_deadline_secs),
            chapter_deadline: Duration::from_secs(self.chapter_deadline_secs),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Sled 数据库路径
    #[serde(default = "default_draft_db_path")]
    pub draft_db_path: String,

    /// 草稿记录键
    #[serde(default = "default_draft_key")]
    pub draft_key: String,
}

fn default_draft_db_path() -> String {
    "data/folio.sled".to_string()
}

fn default_draft_key() -> String {
    "folio_draft_v1".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            draft_db_path: default_draft_db_path(),
            draft_key: default_draft_key(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
