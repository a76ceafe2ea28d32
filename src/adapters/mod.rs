// Adapters layer: concrete node sources (local JSON dump, HTTP endpoint).

pub mod file_source;
pub mod http_source;

pub use file_source::FileSource;
pub use http_source::HttpSource;

use crate::config::AppConfig;
use crate::domain::model::{NodeSnapshot, RawRecord};
use crate::domain::ports::{NodeSource, SourceSpec};
use crate::utils::error::{MeshError, Result};
use crate::utils::validation::validate_required_field;
use serde_json::Value;
use std::time::Duration;

const WRAPPER_KEYS: [&str; 2] = ["nodes", "nodesByNum"];

/// 將 JSON 文件轉成節點快照。
///
/// 接受 `{id: record}` 物件、記錄陣列，或包在 `nodes` / `nodesByNum` 底下的上述兩種格式。
pub fn parse_snapshot(document: Value) -> Result<NodeSnapshot> {
    match document {
        Value::Object(mut map) => {
            if let Some(key) = WRAPPER_KEYS.iter().find(|key| {
                matches!(map.get(**key), Some(Value::Object(_)) | Some(Value::Array(_)))
            }) {
                let inner = map.remove(*key).unwrap_or(Value::Null);
                return parse_snapshot(inner);
            }

            let mut snapshot = NodeSnapshot::new();
            for (id, record) in map {
                if !record.is_object() {
                    tracing::warn!("⚠️ Node '{}' is not an object, rendering defaults", id);
                }
                snapshot.push(id, RawRecord::from(record));
            }
            Ok(snapshot)
        }
        Value::Array(items) => {
            let mut snapshot = NodeSnapshot::new();
            for (index, record) in items.into_iter().enumerate() {
                let id = node_id(&record).unwrap_or_else(|| index.to_string());
                snapshot.push(id, RawRecord::from(record));
            }
            Ok(snapshot)
        }
        other => Err(MeshError::SourceError {
            message: format!(
                "unsupported snapshot document (expected object or array, got {})",
                json_type(&other)
            ),
        }),
    }
}

fn node_id(record: &Value) -> Option<String> {
    if let Some(num) = record.get("num").and_then(Value::as_u64) {
        return Some(num.to_string());
    }
    record
        .get("user")
        .and_then(|user| user.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 依設定建立對應的資料來源
pub fn build_source(config: &AppConfig) -> Result<Box<dyn NodeSource>> {
    let spec = validate_required_field("source", &config.source)?;
    let source: Box<dyn NodeSource> = match spec {
        SourceSpec::File { path } => Box::new(FileSource::new(path)),
        SourceSpec::Http { endpoint } => Box::new(
            HttpSource::builder(endpoint)
                .timeout(Duration::from_secs(config.timeout_seconds))
                .retries(
                    config.retry_attempts,
                    Duration::from_secs(config.retry_delay_seconds),
                )
                .headers(config.headers.clone())
                .build()?,
        ),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object_keyed_by_id() {
        let snapshot = parse_snapshot(json!({
            "!a1": {"num": 1},
            "!b2": {"num": 2}
        }))
        .unwrap();
        assert_eq!(snapshot.len(), 2);
        let ids: Vec<&str> = snapshot.nodes.iter().map(|(id, _)| id.as_str()).collect();
        assert!(ids.contains(&"!a1"));
    }

    #[test]
    fn test_parse_array_uses_num_then_user_id_then_index() {
        let snapshot = parse_snapshot(json!([
            {"num": 7},
            {"user": {"id": "!cafe"}},
            {"snr": 1.5}
        ]))
        .unwrap();
        let ids: Vec<&str> = snapshot.nodes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["7", "!cafe", "2"]);
    }

    #[test]
    fn test_parse_wrapped_documents() {
        let snapshot = parse_snapshot(json!({"nodesByNum": {"1": {"num": 1}}})).unwrap();
        assert_eq!(snapshot.len(), 1);
        let snapshot = parse_snapshot(json!({"nodes": [{"num": 1}, {"num": 2}]})).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_parse_keeps_malformed_entries() {
        let snapshot = parse_snapshot(json!({"1": "garbage", "2": {"num": 2}})).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot
            .records()
            .any(|record| matches!(record, RawRecord::Other(_))));
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(
            parse_snapshot(json!("nodes")),
            Err(MeshError::SourceError { .. })
        ));
    }

    #[test]
    fn test_build_source_requires_a_source() {
        let config = AppConfig::default();
        assert!(matches!(
            build_source(&config),
            Err(MeshError::MissingConfigError { .. })
        ));
    }
}
