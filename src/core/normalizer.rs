//! 節點記錄正規化：攤平巢狀結構並補上顯示用的衍生欄位。
//!
//! 這裡的每個操作都不會失敗。欄位缺漏或型別錯誤時一律退回預設值，
//! 單一壞掉的記錄只會產生不完整的列，不會讓整批資料中斷。

use crate::domain::model::{display_value, Attribute, FlatRow, NodeSnapshot, RawRecord};
use chrono::{Local, TimeZone, Utc};
use serde_json::{Map, Value};
use std::fmt::{Display, Write};

pub const KEY_SEPARATOR: &str = "_";
pub const NAME_WIDTH: usize = 35;
pub const TIME_PLACEHOLDER: &str = "-";
/// `human_time` 的輸出格式
pub const HUMAN_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
/// 重新排列後、表格中實際顯示的格式
pub const DISPLAY_TIME_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

/// 將巢狀映射攤平成單層記錄。
///
/// 子映射的 key 以 `parent_child` 串接；陣列序列化為精簡 JSON 文字
/// （保留元素順序與非 ASCII 字元）；其他純量原樣複製。
pub fn flatten(map: &Map<String, Value>) -> FlatRow {
    let mut row = FlatRow::new();
    flatten_into(&mut row, map, "");
    row
}

fn flatten_into(row: &mut FlatRow, map: &Map<String, Value>, parent_key: &str) {
    for (key, value) in map {
        let new_key = if parent_key.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", parent_key, KEY_SEPARATOR, key)
        };

        match value {
            Value::Object(child) => flatten_into(row, child, &new_key),
            Value::Array(_) => {
                let encoded = serde_json::to_string(value).unwrap_or_default();
                row.insert(new_key, Value::String(encoded));
            }
            scalar => row.insert(new_key, scalar.clone()),
        }
    }
}

/// 將任一種原始記錄轉成標準映射。
///
/// 物件型記錄只取公開（非 `_` 開頭）且不可呼叫的屬性，讀取失敗的屬性直接略過。
pub fn coerce_record(record: &RawRecord) -> Map<String, Value> {
    match record {
        RawRecord::Mapping(map) => map.clone(),
        RawRecord::Object(object) => {
            let mut map = Map::new();
            for name in object.attribute_names() {
                if name.starts_with('_') {
                    continue;
                }
                match object.attribute(&name) {
                    Ok(Attribute::Value(value)) => {
                        map.insert(name, value);
                    }
                    Ok(Attribute::Callable) => {}
                    Err(e) => {
                        tracing::debug!("Skipping attribute '{}': {:?}", name, e);
                    }
                }
            }
            map
        }
        RawRecord::Other(value) => {
            tracing::debug!("Record is neither a mapping nor an object: {}", value);
            Map::new()
        }
    }
}

/// 只保留 ASCII 英數字、空白、`_`、`-`、`.`，並固定為 35 個字元寬
pub fn clean_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
        .collect();
    let truncated: String = kept.trim().chars().take(NAME_WIDTH).collect();
    format!("{:<width$}", truncated, width = NAME_WIDTH)
}

/// 將 epoch 秒數依 `pattern` 轉成指定時區的時間字串。
///
/// `None` 或 `0` 回傳 `-`；無法轉換時回傳原始數值。
pub fn human_time<Tz>(epoch_seconds: Option<i64>, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match epoch_seconds {
        None | Some(0) => TIME_PLACEHOLDER.to_string(),
        Some(epoch) => format_timestamp(epoch, tz, pattern).unwrap_or_else(|| epoch.to_string()),
    }
}

/// 超出時區可表示範圍或格式化失敗時為 `None`
fn format_timestamp<Tz>(epoch: i64, tz: &Tz, pattern: &str) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let datetime = tz.timestamp_opt(epoch, 0).single()?;
    let mut formatted = String::new();
    write!(formatted, "{}", datetime.format(pattern)).ok()?;
    Some(formatted)
}

/// `DD/MM/YYYY HH:MM:SS` -> `HH:MM:SS DD/MM/YYYY`；佔位符與單一 token 原樣回傳
pub fn reorder_time(human: &str) -> String {
    if human == TIME_PLACEHOLDER {
        return human.to_string();
    }
    let mut tokens = human.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(date), Some(time)) => format!("{} {}", time, date),
        _ => human.to_string(),
    }
}

/// 寬鬆解析整數；`2.7` 取 2、布林取 0/1，超出 `i64` 範圍或其他失敗為 `None`
pub(crate) fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_int)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    let truncated = f.trunc();
    // i64::MAX as f64 會進位成 2^63，必須用嚴格小於
    if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

pub(crate) fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// 跳數；缺漏或無法解析時為 0
pub fn hops_away(value: Option<&Value>) -> i64 {
    value.and_then(parse_int).unwrap_or(0)
}

fn user_name(user: Option<&Value>) -> String {
    let Some(Value::Object(user)) = user else {
        return String::new();
    };
    ["longName", "shortName"]
        .iter()
        .filter_map(|key| user.get(*key))
        .map(display_value)
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

/// 時間顯示使用的時區；整個程式執行期間固定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    zone: TimeZoneMode,
}

impl Normalizer {
    pub fn new(zone: TimeZoneMode) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> TimeZoneMode {
        self.zone
    }

    fn format_epoch(&self, epoch: i64) -> Option<String> {
        match self.zone {
            TimeZoneMode::Local => format_timestamp(epoch, &Local, HUMAN_TIME_FORMAT),
            TimeZoneMode::Utc => format_timestamp(epoch, &Utc, HUMAN_TIME_FORMAT),
        }
    }

    /// 無法轉成時間時顯示原始值本身
    fn last_heard(&self, value: Option<&Value>) -> String {
        let human = match value {
            None | Some(Value::Null) => TIME_PLACEHOLDER.to_string(),
            Some(raw) => match parse_int(raw) {
                Some(0) => TIME_PLACEHOLDER.to_string(),
                Some(epoch) => self.format_epoch(epoch).unwrap_or_else(|| display_value(raw)),
                None => display_value(raw),
            },
        };
        reorder_time(&human)
    }

    /// 單一記錄 -> 一列。衍生欄位會覆蓋攤平後同名的欄位。
    pub fn normalize(&self, raw: &RawRecord) -> FlatRow {
        let record = coerce_record(raw);
        let mut flat = flatten(&record);

        flat.insert(
            "lastHeard_human",
            Value::String(self.last_heard(record.get("lastHeard"))),
        );

        flat.insert(
            "name",
            Value::String(clean_name(&user_name(record.get("user")))),
        );

        let hops = hops_away(flat.get("hopsAway"));
        flat.insert("viaHop", Value::Bool(hops > 0));

        let snr = flat.get("snr").map(|snr| match parse_float(snr) {
            Some(value) => format!("{:.2}", value),
            None => {
                tracing::debug!("Unparsable snr value: {}", snr);
                String::new()
            }
        });
        if let Some(formatted) = snr {
            flat.insert("snr", Value::String(formatted));
        }

        flat
    }

    pub fn normalize_all(&self, snapshot: &NodeSnapshot) -> Vec<FlatRow> {
        snapshot.records().map(|raw| self.normalize(raw)).collect()
    }
}

/// 以本地時區正規化單一記錄
pub fn normalize_record(raw: &RawRecord) -> FlatRow {
    Normalizer::default().normalize(raw)
}
