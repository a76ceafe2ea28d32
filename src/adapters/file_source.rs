use crate::adapters::parse_snapshot;
use crate::domain::model::NodeSnapshot;
use crate::domain::ports::NodeSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 從本機 JSON 檔（例如裝置匯出的節點清單）讀取快照
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NodeSource for FileSource {
    async fn fetch(&self) -> Result<NodeSnapshot> {
        let data = tokio::fs::read(&self.path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), self.path.display());
        let document: serde_json::Value = serde_json::from_slice(&data)?;
        parse_snapshot(document)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
