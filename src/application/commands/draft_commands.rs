//! Draft Commands - 草稿与生成相关命令

use crate::application::services::ProgressObserver;
use crate::domain::draft::ProfileUpdate;
use crate::domain::run::ModeRequest;

/// 发起一次生成（大纲、修订、章节、导出）
#[derive(Clone)]
pub struct Generate {
    pub request: ModeRequest,
    pub observer: Option<ProgressObserver>,
}

impl Generate {
    pub fn new(request: ModeRequest) -> Self {
        Self {
            request,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl std::fmt::Debug for Generate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generate")
            .field("request", &self.request)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// 本地编辑档案
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub update: ProfileUpdate,
}

/// 用户确认的档案定稿（后台同步受保护区）
#[derive(Debug, Clone)]
pub struct FinalizeProfile {
    pub update: ProfileUpdate,
}

/// 重置草稿并删除远端项目
#[derive(Debug, Clone, Default)]
pub struct ResetDraft;
