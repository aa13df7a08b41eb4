//! Run Context - Progress Snapshot
//!
//! 每次轮询从 `output_payload.progress` 重新计算，不持久化

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Run, RunStatus};

/// 进度快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub status: RunStatus,
    pub label: String,
    pub current_node: Option<String>,
    pub revision: Option<u32>,
    pub completed_steps: usize,
}

impl ProgressSnapshot {
    pub fn from_run(run: &Run) -> Self {
        let progress = run
            .output_payload
            .as_ref()
            .and_then(|payload| payload.get("progress"))
            .filter(|p| p.is_object());

        let current_node = progress
            .and_then(|p| p.get("current_node"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(str::to_string);

        let revision = progress
            .and_then(|p| p.get("revision_count"))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());

        let completed_steps = progress
            .and_then(|p| p.get("completed_nodes"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        let label = match &current_node {
            Some(node) => node_label(node),
            None => fallback_label(run.status).to_string(),
        };

        Self {
            status: run.status,
            label,
            current_node,
            revision,
            completed_steps,
        }
    }

    /// 单行展示文本
    pub fn describe(&self) -> String {
        match self.revision {
            Some(revision) if revision > 0 => format!("{} (revision {})", self.label, revision),
            _ => self.label.clone(),
        }
    }
}

/// 节点名 → 阶段标签，未知节点原样返回
pub fn node_label(node: &str) -> String {
    let label = match node {
        "run_toc" => "Outline generation",
        "run_refine_toc" => "Outline refinement",
        "run_chapter" => "Chapter generation",
        "chapter_node_retrieve_context" => "Retrieving context",
        "chapter_node_plan" => "Planning chapter",
        "chapter_node_draft" => "Drafting chapter",
        "chapter_node_review" => "Reviewing chapter",
        "chapter_node_persist" => "Saving chapter",
        "run_export" => "Exporting manuscript",
        other => return other.to_string(),
    };
    label.to_string()
}

fn fallback_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Queued => "Queued",
        RunStatus::Running => "Running",
        RunStatus::Completed => "Completed",
        RunStatus::Failed => "Failed",
    }
}
