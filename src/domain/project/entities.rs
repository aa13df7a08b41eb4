//! Project Context - Entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::ProjectMetadata;

/// 远端项目记录（服务端回显）
///
/// 所有字段都允许缺失，解析失败的字段由调用方决定如何处理
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteProject {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub target_word_count: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub outline_json: Value,
    #[serde(default)]
    pub metadata_json: Value,
}

impl RemoteProject {
    pub fn metadata(&self) -> ProjectMetadata {
        ProjectMetadata::from_wire(&self.metadata_json)
    }
}

/// 远端章节行
///
/// 不变量: 每个 (project, number) 至多一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChapter {
    pub id: Uuid,
    #[serde(default)]
    pub project: Option<Uuid>,
    pub number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_project_tolerates_sparse_body() {
        let project: RemoteProject = serde_json::from_value(json!({
            "id": "6f1c1c3e-2f55-4a44-9d0e-6a2f1e9b9c11",
            "metadata_json": {"llm_runtime": {"chapter_count": 8}}
        }))
        .unwrap();
        assert!(project.id.is_some());
        assert!(project.outline_json.is_null());
        assert_eq!(project.metadata().llm_runtime()["chapter_count"], json!(8));
    }

    #[test]
    fn test_remote_chapter_defaults() {
        let chapter: RemoteChapter = serde_json::from_value(json!({
            "id": "0b6b1a7c-9d3f-4a51-8f4e-2c1d3e4f5a6b",
            "number": 2
        }))
        .unwrap();
        assert_eq!(chapter.number, 2);
        assert!(chapter.content.is_empty());
    }
}
