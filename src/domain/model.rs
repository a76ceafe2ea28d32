use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 節點物件屬性讀取失敗的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// 欄位存在但目前沒有值
    Unset,
    Unreadable(String),
}

/// 透過 [`Introspect`] 讀到的單一屬性
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Value(Value),
    /// 方法之類的可呼叫成員，正規化時會被略過
    Callable,
}

/// 以具名欄位（而非 key-value 映射）提供資料的節點物件
pub trait Introspect: Send + Sync {
    fn attribute_names(&self) -> Vec<String>;
    fn attribute(&self, name: &str) -> std::result::Result<Attribute, AttributeError>;
}

/// 資料來源交付的單一節點原始記錄
pub enum RawRecord {
    Mapping(Map<String, Value>),
    Object(Box<dyn Introspect>),
    /// 既不是映射也不是物件的值（例如字串、陣列）
    Other(Value),
}

impl fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawRecord::Mapping(map) => f.debug_tuple("Mapping").field(map).finish(),
            RawRecord::Object(obj) => f
                .debug_tuple("Object")
                .field(&obj.attribute_names())
                .finish(),
            RawRecord::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawRecord::Mapping(map),
            other => RawRecord::Other(other),
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        RawRecord::Mapping(map)
    }
}

impl From<NodeInfo> for RawRecord {
    fn from(node: NodeInfo) -> Self {
        RawRecord::Object(Box::new(node))
    }
}

/// 一次查詢取得的完整節點清單；順序沒有任何保證
#[derive(Debug, Default)]
pub struct NodeSnapshot {
    pub nodes: Vec<(String, RawRecord)>,
}

impl NodeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>, record: impl Into<RawRecord>) {
        self.nodes.push((id.into(), record.into()));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.nodes.iter().map(|(_, record)| record)
    }
}

impl<K: Into<String>, R: Into<RawRecord>> FromIterator<(K, R)> for NodeSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Self {
            nodes: iter
                .into_iter()
                .map(|(id, record)| (id.into(), record.into()))
                .collect(),
        }
    }
}

/// 攤平後的單層記錄，外加顯示用的衍生欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatRow {
    pub data: BTreeMap<String, Value>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// 欄位的顯示字串；不存在的欄位為空字串
    pub fn display(&self, key: &str) -> String {
        self.data.get(key).map(display_value).unwrap_or_default()
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Meshtastic NodeInfo 的型別化版本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInfo {
    pub num: u32,
    pub user: Option<User>,
    pub position: Option<Position>,
    pub snr: Option<f32>,
    pub last_heard: Option<u32>,
    pub device_metrics: Option<DeviceMetrics>,
    pub channel: u32,
    pub via_mqtt: bool,
    pub hops_away: Option<u32>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub long_name: String,
    pub short_name: String,
    pub hw_model: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<i32>,
    pub time: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetrics {
    pub battery_level: Option<u32>,
    pub voltage: Option<f32>,
    pub channel_utilization: Option<f32>,
    pub air_util_tx: Option<f32>,
    pub uptime_seconds: Option<u32>,
}

const NODE_INFO_FIELDS: [&str; 10] = [
    "num",
    "user",
    "position",
    "snr",
    "lastHeard",
    "deviceMetrics",
    "channel",
    "viaMqtt",
    "hopsAway",
    "isFavorite",
];

fn field_value<T: Serialize>(value: &T) -> std::result::Result<Attribute, AttributeError> {
    serde_json::to_value(value)
        .map(Attribute::Value)
        .map_err(|e| AttributeError::Unreadable(e.to_string()))
}

fn optional_field<T: Serialize>(
    value: &Option<T>,
) -> std::result::Result<Attribute, AttributeError> {
    match value {
        Some(v) => field_value(v),
        None => Err(AttributeError::Unset),
    }
}

impl Introspect for NodeInfo {
    fn attribute_names(&self) -> Vec<String> {
        NODE_INFO_FIELDS.iter().map(|name| name.to_string()).collect()
    }

    fn attribute(&self, name: &str) -> std::result::Result<Attribute, AttributeError> {
        match name {
            "num" => field_value(&self.num),
            "user" => optional_field(&self.user),
            "position" => optional_field(&self.position),
            "snr" => optional_field(&self.snr),
            "lastHeard" => optional_field(&self.last_heard),
            "deviceMetrics" => optional_field(&self.device_metrics),
            "channel" => field_value(&self.channel),
            "viaMqtt" => field_value(&self.via_mqtt),
            "hopsAway" => optional_field(&self.hops_away),
            "isFavorite" => field_value(&self.is_favorite),
            other => Err(AttributeError::Unreadable(format!("no attribute '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_from_value() {
        assert!(matches!(
            RawRecord::from(json!({"num": 1})),
            RawRecord::Mapping(_)
        ));
        assert!(matches!(RawRecord::from(json!([1, 2])), RawRecord::Other(_)));
        assert!(matches!(RawRecord::from(json!("node")), RawRecord::Other(_)));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(44.5)), "44.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn test_node_info_unset_attributes() {
        let node = NodeInfo {
            num: 42,
            hops_away: Some(1),
            ..Default::default()
        };
        assert_eq!(node.attribute("num"), Ok(Attribute::Value(json!(42))));
        assert_eq!(node.attribute("hopsAway"), Ok(Attribute::Value(json!(1))));
        assert_eq!(node.attribute("user"), Err(AttributeError::Unset));
        assert!(node.attribute("missing").is_err());
    }

    #[test]
    fn test_node_info_deserializes_camel_case() {
        let node: NodeInfo = serde_json::from_value(json!({
            "num": 7,
            "user": {"id": "!00000007", "longName": "Relay", "shortName": "RL"},
            "lastHeard": 1700000000,
            "hopsAway": 2
        }))
        .unwrap();
        assert_eq!(node.last_heard, Some(1700000000));
        assert_eq!(node.user.unwrap().long_name, "Relay");
    }
}
