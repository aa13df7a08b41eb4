//! Run Context - Mode Inputs
//!
//! 根据草稿和请求的模式构造 `inputs`，并在发起远端调用前完成本地预检

use serde_json::{json, Map, Value};

use super::RunMode;
use crate::domain::draft::{DraftError, ExportFormat, LocalDraft, Outline};

/// 用户请求的工作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeRequest {
    Outline,
    RefineOutline { feedback: String },
    Chapter { number: u32 },
    Export { format: ExportFormat },
}

impl ModeRequest {
    pub fn mode(&self) -> RunMode {
        match self {
            ModeRequest::Outline => RunMode::Toc,
            ModeRequest::RefineOutline { .. } => RunMode::RefineToc,
            ModeRequest::Chapter { .. } => RunMode::Chapter,
            ModeRequest::Export { .. } => RunMode::Export,
        }
    }
}

/// 构造完成的 (mode, inputs)
#[derive(Debug, Clone, PartialEq)]
pub struct ModeInputs {
    pub mode: RunMode,
    pub payload: Value,
    /// 预检产生的警告（会并入结果）
    pub warnings: Vec<String>,
}

/// 未起草章节导出时使用的占位文本
pub fn placeholder_text(number: u32) -> String {
    format!("[Chapter {} not drafted yet]", number)
}

pub fn build_inputs(draft: &LocalDraft, request: &ModeRequest) -> Result<ModeInputs, DraftError> {
    let profile = draft.profile();
    profile.validate()?;

    let mut warnings = Vec::new();
    let book_length = profile.effective_word_count(&mut warnings)?;

    let mut payload = Map::new();
    payload.insert("book_title".into(), json!(profile.title));
    payload.insert("genre".into(), json!(profile.genre));
    payload.insert("target_audience".into(), json!(profile.target_audience));
    payload.insert("language".into(), json!(profile.language));
    payload.insert("tone".into(), json!(profile.tone));
    payload.insert("book_length".into(), json!(book_length));

    let mode = request.mode();
    match request {
        ModeRequest::Outline => {}
        ModeRequest::RefineOutline { feedback } => {
            let feedback = feedback.trim();
            if feedback.is_empty() {
                return Err(DraftError::MissingFeedback);
            }
            let outline = require_outline(draft, mode)?;
            payload.insert("outline".into(), outline_value(outline));
            payload.insert("feedback".into(), json!(feedback));
        }
        ModeRequest::Chapter { number } => {
            let outline = require_outline(draft, mode)?;
            if outline.chapter(*number).is_none() {
                return Err(DraftError::ChapterOutOfRange(*number));
            }
            payload.insert("outline".into(), outline_value(outline));
            payload.insert("chapter_number".into(), json!(number));
        }
        ModeRequest::Export { format } => {
            let outline = require_outline(draft, mode)?;
            let chapters: Vec<Value> = outline
                .chapters
                .iter()
                .map(|chapter| {
                    let content = draft
                        .chapter_content(chapter.number)
                        .filter(|text| !text.trim().is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| placeholder_text(chapter.number));
                    json!({
                        "number": chapter.number,
                        "title": chapter.title,
                        "content": content,
                    })
                })
                .collect();
            payload.insert("outline".into(), outline_value(outline));
            payload.insert("chapters".into(), Value::Array(chapters));
            payload.insert("export_format".into(), json!(format.as_str()));
        }
    }

    Ok(ModeInputs {
        mode,
        payload: Value::Object(payload),
        warnings,
    })
}

fn require_outline(draft: &LocalDraft, mode: RunMode) -> Result<&Outline, DraftError> {
    draft
        .outline()
        .filter(|outline| !outline.is_empty())
        .ok_or(DraftError::MissingOutline(mode.as_str()))
}

fn outline_value(outline: &Outline) -> Value {
    serde_json::to_value(outline).unwrap_or(Value::Null)
}
