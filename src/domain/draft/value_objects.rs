//! Draft Context - Value Objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::DraftError;

/// 目标字数下限（低于此值会被提升并给出警告）
pub const MIN_TARGET_WORDS: u32 = 300;
/// 目标字数上限
pub const MAX_TARGET_WORDS: u32 = 200_000;

fn default_title() -> String {
    "Untitled Book".to_string()
}

fn default_genre() -> String {
    "Non-fiction".to_string()
}

fn default_audience() -> String {
    "General readers".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_tone() -> String {
    "Informative".to_string()
}

fn default_word_count() -> u32 {
    3000
}

/// 书籍档案（用户填写的规格字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookProfile {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_word_count")]
    pub target_word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_brief: Option<String>,
}

impl Default for BookProfile {
    fn default() -> Self {
        Self {
            title: default_title(),
            genre: default_genre(),
            target_audience: default_audience(),
            language: default_language(),
            tone: default_tone(),
            target_word_count: default_word_count(),
            subtitle: None,
            instruction_brief: None,
        }
    }
}

impl BookProfile {
    /// 校验必填字段
    pub fn validate(&self) -> Result<(), DraftError> {
        let required = [
            ("book_title", &self.title),
            ("genre", &self.genre),
            ("language", &self.language),
            ("tone", &self.tone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DraftError::MissingField(field));
            }
        }
        Ok(())
    }

    /// 归一化后的目标字数
    ///
    /// 低于下限时提升到下限并追加一条警告，超过上限直接拒绝
    pub fn effective_word_count(&self, warnings: &mut Vec<String>) -> Result<u32, DraftError> {
        let count = self.target_word_count;
        if count > MAX_TARGET_WORDS {
            return Err(DraftError::LengthTooLarge {
                max: MAX_TARGET_WORDS,
            });
        }
        if count < MIN_TARGET_WORDS {
            warnings.push(format!(
                "book_length increased to minimum {}.",
                MIN_TARGET_WORDS
            ));
            return Ok(MIN_TARGET_WORDS);
        }
        Ok(count)
    }

    /// 受保护区的档案字段快照
    pub fn protected_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("title".into(), Value::String(self.title.clone()));
        fields.insert("genre".into(), Value::String(self.genre.clone()));
        fields.insert(
            "target_audience".into(),
            Value::String(self.target_audience.clone()),
        );
        fields.insert("language".into(), Value::String(self.language.clone()));
        fields.insert("tone".into(), Value::String(self.tone.clone()));
        fields.insert(
            "target_word_count".into(),
            Value::from(self.target_word_count),
        );
        if let Some(subtitle) = &self.subtitle {
            fields.insert("subtitle".into(), Value::String(subtitle.clone()));
        }
        if let Some(brief) = &self.instruction_brief {
            fields.insert("instruction_brief".into(), Value::String(brief.clone()));
        }
        fields
    }
}

/// 档案修改（本地编辑或用户确认的定稿）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_brief: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// 应用到档案，空白字符串忽略
    pub fn apply_to(&self, profile: &mut BookProfile) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *target = v.to_string();
            }
        }

        set(&mut profile.title, &self.title);
        set(&mut profile.genre, &self.genre);
        set(&mut profile.target_audience, &self.target_audience);
        set(&mut profile.language, &self.language);
        set(&mut profile.tone, &self.tone);
        if let Some(count) = self.target_word_count {
            profile.target_word_count = count;
        }
        if let Some(subtitle) = &self.subtitle {
            profile.subtitle = Some(subtitle.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(brief) = &self.instruction_brief {
            profile.instruction_brief = Some(brief.trim().to_string()).filter(|s| !s.is_empty());
        }
    }

    /// 转为受保护区 `profile` 子对象的条目
    pub fn to_profile_entries(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Both,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Both => "both",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Pdf
    }
}

impl FromStr for ExportFormat {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "both" => Ok(ExportFormat::Both),
            other => Err(DraftError::UnknownExportFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
