//! Run Context - Value Objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 任务模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Toc,
    RefineToc,
    Chapter,
    Export,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Toc => "toc",
            RunMode::RefineToc => "refine_toc",
            RunMode::Chapter => "chapter",
            RunMode::Export => "export",
        }
    }

    /// 是否需要先把本地章节推送到远端
    pub fn implies_export(&self) -> bool {
        matches!(self, RunMode::Export)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toc" => Ok(RunMode::Toc),
            "refine_toc" => Ok(RunMode::RefineToc),
            "chapter" => Ok(RunMode::Chapter),
            "export" => Ok(RunMode::Export),
            other => Err(format!("unknown run mode: {}", other)),
        }
    }
}

/// 任务状态
///
/// 状态机:
/// ```text
/// queued -> running -> completed
///    |         |
///    |         +-----> failed
///    +--> completed / failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            RunStatus::Queued => 0,
            RunStatus::Running => 1,
            RunStatus::Completed | RunStatus::Failed => 2,
        }
    }

    /// 两次轮询之间观察到的转换是否合法
    ///
    /// 保持不变总是合法；终态之后不允许任何变化
    pub fn can_advance_to(&self, next: RunStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
