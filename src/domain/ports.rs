use crate::domain::model::NodeSnapshot;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 提供節點清單快照的外部來源（裝置、檔案等）
#[async_trait]
pub trait NodeSource: Send + Sync {
    async fn fetch(&self) -> Result<NodeSnapshot>;

    /// 用於日誌的來源描述
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: NodeSource + ?Sized> NodeSource for Box<T> {
    async fn fetch(&self) -> Result<NodeSnapshot> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// 來源的種類與位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File { path: String },
    Http { endpoint: String },
}

/// 表格引擎需要的顯示設定
pub trait ConfigProvider: Send + Sync {
    fn sort_by_hops(&self) -> bool;
    fn compact(&self) -> bool;
    fn use_utc(&self) -> bool;
    fn highlight(&self) -> bool;
}
