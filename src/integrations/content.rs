//! 报告正文提取

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use super::ContentExtractor;

/// 从上传目录读取 UTF-8 文本报告
pub struct FileContentExtractor {
    base_dir: PathBuf,
}

impl FileContentExtractor {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 只允许上传目录内的相对路径
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.base_dir.join(relative))
    }
}

#[async_trait]
impl ContentExtractor for FileContentExtractor {
    async fn extract(&self, path: &str) -> String {
        let Some(full_path) = self.resolve(path) else {
            warn!("拒绝读取上传目录之外的报告: {}", path);
            return String::new();
        };

        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => {
                info!("Extracted {} bytes of report text from {}", text.len(), path);
                text
            }
            Err(e) => {
                warn!("Failed to extract report text from {}: {}", path, e);
                String::new()
            }
        }
    }
}
