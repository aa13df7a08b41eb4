//! Draft Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{BookProfile, DraftError, Outline, ProfileUpdate};
use crate::domain::project::{seed_protected_zone, ProjectMetadata};
use crate::domain::run::{ModeRequest, Outcome};

/// LocalDraft 聚合根
///
/// 用户正在编辑的书籍规格，客户端唯一的真实来源。
///
/// 不变量:
/// - 受保护区只在定稿或首次创建时写入
/// - 每次修改都刷新 updated_at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDraft {
    #[serde(default)]
    profile: BookProfile,
    #[serde(default)]
    outline: Option<Outline>,
    #[serde(default)]
    chapters: BTreeMap<u32, String>,
    #[serde(default)]
    project_id: Option<Uuid>,
    #[serde(default)]
    metadata: ProjectMetadata,
    #[serde(default)]
    profile_finalize_pending: bool,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl Default for LocalDraft {
    fn default() -> Self {
        Self {
            profile: BookProfile::default(),
            outline: None,
            chapters: BTreeMap::new(),
            project_id: None,
            metadata: ProjectMetadata::default(),
            profile_finalize_pending: false,
            updated_at: Utc::now(),
        }
    }
}

impl LocalDraft {
    pub fn new(profile: BookProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// 普通编辑（不触碰受保护区）
    pub fn update_profile(&mut self, update: &ProfileUpdate) {
        update.apply_to(&mut self.profile);
        self.touch();
    }

    /// 用户确认的定稿
    ///
    /// 应用修改、合入 `profile` 子对象，并标记下次同步时整体覆盖受保护区
    pub fn finalize_profile(&mut self, update: &ProfileUpdate) {
        update.apply_to(&mut self.profile);
        self.metadata
            .merge_profile_entries(update.to_profile_entries());
        self.profile_finalize_pending = true;
        self.touch();
    }

    pub fn link_project(&mut self, project_id: Uuid) {
        self.project_id = Some(project_id);
        self.touch();
    }

    /// 清除失效的远端项目指针
    pub fn unlink_project(&mut self) {
        self.project_id = None;
        self.touch();
    }

    pub fn set_outline(&mut self, outline: Outline) -> Result<(), DraftError> {
        outline.validate()?;
        self.outline = Some(outline);
        self.touch();
        Ok(())
    }

    pub fn set_chapter(&mut self, number: u32, content: impl Into<String>) {
        self.chapters.insert(number, content.into());
        self.touch();
    }

    /// 本次上行要发送的受保护区
    ///
    /// 纯函数：重复调用结果一致，未定稿时不会覆盖已有条目
    pub fn protected_snapshot(&self) -> Map<String, Value> {
        let mut zone = self.metadata.user_concept().clone();
        seed_protected_zone(
            &mut zone,
            self.profile.protected_fields(),
            self.profile_finalize_pending,
        );
        zone
    }

    /// 上行的完整双区元数据
    pub fn outgoing_metadata(&self) -> ProjectMetadata {
        self.metadata.with_protected_zone(self.protected_snapshot())
    }

    /// 定稿同步成功后落地受保护区
    pub fn commit_protected_zone(&mut self, zone: Map<String, Value>) {
        self.metadata.replace_protected_zone(zone);
        self.profile_finalize_pending = false;
        self.touch();
    }

    /// 合并服务端回显的元数据
    pub fn absorb_remote_metadata(&mut self, echo: &ProjectMetadata) {
        self.metadata.absorb_server_echo(echo);
        self.touch();
    }

    /// 把成功的结果写回草稿
    pub fn apply_outcome(
        &mut self,
        request: &ModeRequest,
        outcome: &Outcome,
    ) -> Result<(), DraftError> {
        match request {
            ModeRequest::Outline | ModeRequest::RefineOutline { .. } => {
                if let Some(outline) = outcome.outline.as_ref().filter(|o| !o.is_empty()) {
                    self.set_outline(outline.clone())?;
                }
            }
            ModeRequest::Chapter { number } => {
                if let Some(chapter) = &outcome.chapter {
                    self.set_chapter(chapter.number.unwrap_or(*number), chapter.content.clone());
                }
            }
            ModeRequest::Export { .. } => {}
        }
        if let Some(metadata) = &outcome.metadata {
            self.metadata.absorb_run_metadata(metadata);
        }
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // Getters
    pub fn profile(&self) -> &BookProfile {
        &self.profile
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn chapters(&self) -> &BTreeMap<u32, String> {
        &self.chapters
    }

    pub fn chapter_content(&self, number: u32) -> Option<&str> {
        self.chapters.get(&number).map(String::as_str)
    }

    pub fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn profile_finalize_pending(&self) -> bool {
        self.profile_finalize_pending
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
