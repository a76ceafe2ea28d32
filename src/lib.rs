pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{build_source, FileSource, HttpSource};
pub use config::AppConfig;
pub use crate::core::{
    engine::NodeTableEngine,
    normalizer::{normalize_record, Normalizer, TimeZoneMode},
    table::{ColumnMode, RenderOptions, SortKey, TableRenderer},
};
pub use domain::model::{FlatRow, NodeInfo, NodeSnapshot, RawRecord};
pub use utils::error::{MeshError, Result};
