//! Artifact Writer - 导出产物落盘

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::domain::run::Outcome;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact encoding: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// 把导出结果中的 pdf/docx 写入目录
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// 写入全部产物，返回写出的文件路径
    ///
    /// 先整体解码，任何一个产物损坏都不会留下半套文件
    pub async fn write_artifacts(&self, outcome: &Outcome) -> Result<Vec<PathBuf>, ArtifactError> {
        let decoded = outcome.decode_artifacts()?;
        if decoded.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.out_dir).await?;

        let mut written = Vec::with_capacity(decoded.len());
        for (artifact, bytes) in decoded {
            // 只取文件名部分，服务端给的路径不可信
            let name = Path::new(&artifact.filename)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| artifact.filename.clone().into());
            let path = self.out_dir.join(name);
            fs::write(&path, &bytes).await?;

            tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote export artifact");
            written.push(path);
        }

        Ok(written)
    }
}
