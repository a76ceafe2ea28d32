use crate::core::normalizer::{Normalizer, TimeZoneMode};
use crate::core::table::{ColumnMode, RenderOptions, SortKey, TableRenderer};
use crate::core::{ConfigProvider, NodeSnapshot, NodeSource};
use crate::utils::error::Result;
use std::io::Write;

pub struct NodeTableEngine<S: NodeSource> {
    source: S,
    normalizer: Normalizer,
    renderer: TableRenderer,
}

impl<S: NodeSource> NodeTableEngine<S> {
    pub fn new(source: S, normalizer: Normalizer, renderer: TableRenderer) -> Self {
        Self {
            source,
            normalizer,
            renderer,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, config: &C) -> Self {
        let zone = if config.use_utc() {
            TimeZoneMode::Utc
        } else {
            TimeZoneMode::Local
        };
        let options = RenderOptions {
            columns: if config.compact() {
                ColumnMode::Compact
            } else {
                ColumnMode::Full
            },
            sort: if config.sort_by_hops() {
                SortKey::Hops
            } else {
                SortKey::Recency
            },
            highlight: config.highlight(),
        };
        Self::new(source, Normalizer::new(zone), TableRenderer::new(options))
    }

    /// 先全部正規化，再一次排版輸出
    pub fn render_snapshot<W: Write>(
        &self,
        snapshot: &NodeSnapshot,
        out: &mut W,
    ) -> Result<usize> {
        let rows = self.normalizer.normalize_all(snapshot);
        tracing::debug!("Normalized {} node records", rows.len());
        let rendered = self.renderer.render(rows, out)?;
        out.flush()?;
        Ok(rendered)
    }

    pub async fn run<W: Write>(&self, out: &mut W) -> Result<usize> {
        tracing::info!("📡 Fetching node list from {}", self.source.describe());
        let snapshot = self.source.fetch().await?;
        tracing::info!("📥 Received {} nodes", snapshot.len());

        self.render_snapshot(&snapshot, out)
    }
}
