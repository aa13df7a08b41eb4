//! Chapter Synchronizer
//!
//! 以章节编号为键，把本地大纲的章节投影到远端章节集合。
//! 远端多出来的章节不会被删除。

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::remote_api::{ChapterCreate, ChapterUpdate, RemoteBookApi};
use crate::application::error::WorkflowError;
use crate::application::ports::{WorkflowEvent, WorkflowEventPort};
use crate::domain::draft::LocalDraft;
use crate::domain::project::RemoteChapter;

/// 同步结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterSyncReport {
    pub created: usize,
    pub updated: usize,
}

pub struct ChapterSynchronizer {
    api: Arc<RemoteBookApi>,
    events: Arc<dyn WorkflowEventPort>,
}

impl ChapterSynchronizer {
    pub fn new(api: Arc<RemoteBookApi>, events: Arc<dyn WorkflowEventPort>) -> Self {
        Self { api, events }
    }

    pub async fn sync_chapters(
        &self,
        project_id: Uuid,
        draft: &LocalDraft,
    ) -> Result<ChapterSyncReport, WorkflowError> {
        let Some(outline) = draft.outline().filter(|o| !o.is_empty()) else {
            return Ok(ChapterSyncReport::default());
        };

        // 列表失败退化为只创建
        let existing: HashMap<u32, RemoteChapter> = match self.api.list_chapters(project_id).await {
            Ok(chapters) => chapters.into_iter().map(|c| (c.number, c)).collect(),
            Err(e) => {
                tracing::warn!(
                    project_id = %project_id,
                    error = %e,
                    "Failed to list remote chapters, syncing as create-only"
                );
                HashMap::new()
            }
        };

        let mut report = ChapterSyncReport::default();
        for chapter in &outline.chapters {
            let content = draft
                .chapter_content(chapter.number)
                .unwrap_or_default()
                .to_string();

            match existing.get(&chapter.number) {
                Some(remote) => {
                    self.api
                        .update_chapter(
                            remote.id,
                            &ChapterUpdate {
                                title: chapter.title.clone(),
                                content,
                            },
                        )
                        .await?;
                    report.updated += 1;
                }
                None => {
                    self.api
                        .create_chapter(
                            project_id,
                            &ChapterCreate {
                                number: chapter.number,
                                title: chapter.title.clone(),
                                content,
                            },
                        )
                        .await?;
                    report.created += 1;
                }
            }
        }

        tracing::info!(
            project_id = %project_id,
            created = report.created,
            updated = report.updated,
            "Chapters synced"
        );
        self.events.publish(WorkflowEvent::ChaptersSynced {
            project_id,
            created: report.created,
            updated: report.updated,
        });

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::RouteTable;
    use crate::domain::draft::{Outline, OutlineChapter};
    use crate::infrastructure::EventPublisher;
    use crate::testing::FakeBookService;
    use http::Method;
    use serde_json::json;

    fn draft_with_chapters(count: u32) -> LocalDraft {
        let mut draft = LocalDraft::default();
        draft
            .set_outline(Outline {
                synopsis: String::new(),
                chapters: (1..=count)
                    .map(|n| OutlineChapter {
                        number: n,
                        title: format!("Chapter {}", n),
                        bullet_points: vec![],
                    })
                    .collect(),
            })
            .unwrap();
        draft
    }

    fn synchronizer(service: Arc<FakeBookService>) -> ChapterSynchronizer {
        let api = Arc::new(RemoteBookApi::new(service, RouteTable::default()));
        ChapterSynchronizer::new(api, Arc::new(EventPublisher::new()))
    }

    #[tokio::test]
    async fn test_no_outline_is_noop() {
        let service = FakeBookService::new();
        let sync = synchronizer(service.clone());

        let report = sync
            .sync_chapters(Uuid::new_v4(), &LocalDraft::default())
            .await
            .unwrap();

        assert_eq!(report, ChapterSyncReport::default());
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_creates_every_chapter_when_remote_is_empty() {
        let service = FakeBookService::new();
        let project_id = service.seed_project();
        let sync = synchronizer(service.clone());
        let mut draft = draft_with_chapters(4);
        draft.set_chapter(3, "Third chapter body.");

        let report = sync.sync_chapters(project_id, &draft).await.unwrap();

        assert_eq!(report, ChapterSyncReport { created: 4, updated: 0 });
        let bodies = service.request_bodies(&Method::POST, "/chapters/");
        assert_eq!(bodies.len(), 4);
        for (index, body) in bodies.iter().enumerate() {
            let number = index as u32 + 1;
            assert_eq!(body["number"], json!(number));
            assert_eq!(body["title"], json!(format!("Chapter {}", number)));
        }
        assert_eq!(bodies[0]["content"], json!(""));
        assert_eq!(bodies[2]["content"], json!("Third chapter body."));
    }

    #[tokio::test]
    async fn test_updates_existing_and_creates_rest() {
        let service = FakeBookService::new();
        let project_id = service.seed_project();
        let existing = service.seed_chapter(project_id, 2, "Old title", "Old text");
        let sync = synchronizer(service.clone());
        let mut draft = draft_with_chapters(3);
        draft.set_chapter(2, "New text");

        let report = sync.sync_chapters(project_id, &draft).await.unwrap();

        assert_eq!(report, ChapterSyncReport { created: 2, updated: 1 });
        let patches = service.request_paths(&Method::PATCH, "/chapters/");
        assert_eq!(patches.len(), 1);
        assert!(patches[0].contains(&existing.to_string()));
        assert_eq!(service.chapter_count(project_id), 3);
    }

    #[tokio::test]
    async fn test_list_failure_degrades_to_create_only() {
        let service = FakeBookService::new();
        let project_id = service.seed_project();
        service.override_response(Method::GET, "/chapters/", 500, "boom");
        let sync = synchronizer(service.clone());

        let report = sync
            .sync_chapters(project_id, &draft_with_chapters(2))
            .await
            .unwrap();

        assert_eq!(report.created, 2);
    }
}
