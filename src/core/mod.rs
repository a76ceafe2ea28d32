pub mod engine;
pub mod normalizer;
pub mod table;

pub use crate::domain::model::{FlatRow, NodeSnapshot, RawRecord};
pub use crate::domain::ports::{ConfigProvider, NodeSource, SourceSpec};
pub use crate::utils::error::Result;
