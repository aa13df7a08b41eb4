//! Draft Context - Entities

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::DraftError;

/// 大纲章节
///
/// 不变量:
/// - number 从 1 开始，在大纲内唯一
/// - 顺序有意义（即章节顺序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineChapter {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

/// 大纲 = 梗概 + 有序章节列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub chapters: Vec<OutlineChapter>,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, number: u32) -> Option<&OutlineChapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// 校验章节编号
    pub fn validate(&self) -> Result<(), DraftError> {
        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if chapter.number == 0 {
                return Err(DraftError::InvalidOutline(
                    "chapter numbers start at 1".to_string(),
                ));
            }
            if !seen.insert(chapter.number) {
                return Err(DraftError::InvalidOutline(format!(
                    "chapter {} appears more than once",
                    chapter.number
                )));
            }
        }
        Ok(())
    }
}
