//! Run Context - Outcome
//!
//! 两种传输返回的结果形状不同，在传输边界统一归一化为 [`Outcome`]，
//! 之后的代码不再按形状分支。

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::draft::Outline;

/// 实际服务本次请求的传输方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// 异步任务（创建 Run 后轮询）
    #[default]
    Primary,
    /// 旧版同步执行接口
    Legacy,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Primary => "primary",
            Transport::Legacy => "legacy",
        }
    }
}

/// 生成的章节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedChapter {
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Docx,
}

impl ArtifactKind {
    fn default_filename(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "manuscript.pdf",
            ArtifactKind::Docx => "manuscript.docx",
        }
    }
}

/// 导出产物（base64 编码）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub filename: String,
    pub base64: String,
}

impl ExportArtifact {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.base64.trim())
    }
}

/// 服务端耗时统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default)]
    pub total_ms: Option<u64>,
    #[serde(default)]
    pub nodes: BTreeMap<String, u64>,
}

/// 归一化的结果记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub outline: Option<Outline>,
    pub chapter: Option<GeneratedChapter>,
    pub artifacts: Vec<ExportArtifact>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub trace_id: Option<String>,
    pub used_fallback: bool,
    pub fallback_stages: Vec<String>,
    pub next_steps: Vec<String>,
    /// 服务端回传的元数据：大纲模式为整份双区 `metadata_json`，章节模式为扁平的运行时键
    pub metadata: Option<Map<String, Value>>,
    pub timings_ms: Option<Timings>,
    pub transport: Transport,
}

impl Outcome {
    /// 归一化任意形状的结果
    ///
    /// 有明确 status 时以其为准；否则只要带有大纲、章节或导出产物之一即视为成功
    pub fn classify(raw: &Value) -> Self {
        let outline = raw
            .get("outline")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<Outline>(v.clone()).ok());
        let chapter = raw
            .get("chapter")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<GeneratedChapter>(v.clone()).ok());
        let artifacts = collect_artifacts(raw);

        let mut errors = string_list(raw.get("errors"));
        let warnings = string_list(raw.get("warnings"));

        let has_result = outline.as_ref().map(|o| !o.is_empty()).unwrap_or(false)
            || chapter.is_some()
            || !artifacts.is_empty();

        let explicit = raw
            .get("status")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_ascii_lowercase());
        let success = match explicit.as_deref() {
            Some("success" | "ok" | "completed") => true,
            Some("error" | "failed" | "failure") => false,
            _ => has_result,
        };

        if !success {
            if let Some(message) = raw.get("error").and_then(Value::as_str) {
                let message = message.trim();
                if !message.is_empty() && !errors.iter().any(|e| e == message) {
                    errors.push(message.to_string());
                }
            }
        }

        let fallback_stages = string_list(raw.get("fallback_stages"));
        let used_fallback = raw
            .get("used_fallback")
            .and_then(Value::as_bool)
            .unwrap_or(!fallback_stages.is_empty());

        Self {
            success,
            outline,
            chapter,
            artifacts,
            errors,
            warnings,
            trace_id: raw
                .get("trace_id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            used_fallback,
            fallback_stages,
            next_steps: string_list(raw.get("next_steps")),
            metadata: raw.get("metadata").and_then(Value::as_object).cloned(),
            timings_ms: raw
                .get("timings_ms")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            transport: Transport::Primary,
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// 首条错误（单行报告使用）
    pub fn primary_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    pub fn failure_reason(&self) -> String {
        self.primary_error()
            .unwrap_or("Generation failed without an error message.")
            .to_string()
    }

    /// 解码全部导出产物，任一失败即返回错误
    pub fn decode_artifacts(&self) -> Result<Vec<(&ExportArtifact, Vec<u8>)>, base64::DecodeError> {
        self.artifacts
            .iter()
            .map(|artifact| artifact.decode().map(|bytes| (artifact, bytes)))
            .collect()
    }
}

fn collect_artifacts(raw: &Value) -> Vec<ExportArtifact> {
    [
        (ArtifactKind::Pdf, "pdf_base64", "pdf_filename"),
        (ArtifactKind::Docx, "docx_base64", "docx_filename"),
    ]
    .into_iter()
    .filter_map(|(kind, data_key, name_key)| {
        let data = raw
            .get(data_key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())?;
        let filename = raw
            .get(name_key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(kind.default_filename());
        Some(ExportArtifact {
            kind,
            filename: filename.to_string(),
            base64: data.to_string(),
        })
    })
    .collect()
}

/// 字符串数组，非字符串元素转为其 JSON 文本
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
