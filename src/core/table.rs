//! 將正規化後的列排版成對齊的終端表格。

use crate::core::normalizer::{hops_away, DISPLAY_TIME_FORMAT, NAME_WIDTH, TIME_PLACEHOLDER};
use crate::domain::model::{display_value, FlatRow};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::io::{self, Write};

pub const INDEX_COLUMN: &str = "#";
pub const COMPACT_COLUMNS: [&str; 9] = [
    INDEX_COLUMN,
    "user_id",
    "user_hwModel",
    "name",
    "hopsAway",
    "snr",
    "position_latitude",
    "position_longitude",
    "lastHeard_human",
];

const INDEX_WIDTH: usize = 5;
const COLUMN_PADDING: usize = 2;
const SNR_SUFFIX: &str = "  ";

pub const HIGHLIGHT_START: &str = "\x1b[42m\x1b[97m";
pub const HIGHLIGHT_END: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnMode {
    #[default]
    Compact,
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// 最近聽到的節點在最上面
    #[default]
    Recency,
    /// 跳數由少到多
    Hops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub columns: ColumnMode,
    pub sort: SortKey,
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMode::Compact,
            sort: SortKey::Recency,
            highlight: true,
        }
    }
}

/// 解析 `HH:MM:SS DD/MM/YYYY`；佔位符、空白或解析失敗一律視為 epoch 0
pub fn recency_key(row: &FlatRow) -> i64 {
    let value = row.display("lastHeard_human");
    let value = value.trim();
    if value.is_empty() || value == TIME_PLACEHOLDER {
        return 0;
    }
    NaiveDateTime::parse_from_str(value, DISPLAY_TIME_FORMAT)
        .map(|datetime| datetime.and_utc().timestamp())
        .unwrap_or(0)
}

/// 直接收聽（hopsAway 為 "0" 或缺漏）且有 SNR 的列需要上色
pub fn is_highlighted(row: &FlatRow) -> bool {
    let hops = row
        .get("hopsAway")
        .map(display_value)
        .unwrap_or_else(|| "0".to_string());
    hops == "0" && !row.display("snr").is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    options: RenderOptions,
}

impl TableRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn select_columns(&self, rows: &[FlatRow]) -> Vec<String> {
        match self.options.columns {
            ColumnMode::Compact => COMPACT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ColumnMode::Full => {
                let keys: BTreeSet<&str> = rows
                    .iter()
                    .flat_map(|row| row.keys())
                    .filter(|key| *key != INDEX_COLUMN)
                    .collect();
                std::iter::once(INDEX_COLUMN)
                    .chain(keys)
                    .map(str::to_string)
                    .collect()
            }
        }
    }

    /// 穩定排序；同鍵值列之間的順序不做保證
    pub fn sort_rows(&self, rows: &mut [FlatRow]) {
        match self.options.sort {
            SortKey::Recency => rows.sort_by_key(|row| std::cmp::Reverse(recency_key(row))),
            SortKey::Hops => rows.sort_by_key(|row| hops_away(row.get("hopsAway"))),
        }
    }

    pub fn column_widths(&self, columns: &[String], rows: &[FlatRow]) -> Vec<usize> {
        columns
            .iter()
            .map(|column| match column.as_str() {
                INDEX_COLUMN => INDEX_WIDTH,
                "name" => NAME_WIDTH,
                _ => {
                    let content = rows
                        .iter()
                        .map(|row| row.display(column).chars().count())
                        .max()
                        .unwrap_or(0);
                    content.max(column.chars().count()) + COLUMN_PADDING
                }
            })
            .collect()
    }

    fn format_row(
        &self,
        index: usize,
        row: &FlatRow,
        columns: &[String],
        widths: &[usize],
    ) -> String {
        let mut line = String::new();
        for (column, width) in columns.iter().zip(widths) {
            let value = match column.as_str() {
                INDEX_COLUMN => format!("{:03}", index),
                "snr" => {
                    let snr = row.display(column);
                    if snr.is_empty() {
                        snr
                    } else {
                        snr + SNR_SUFFIX
                    }
                }
                _ => row.display(column),
            };
            line.push_str(&format!("{:<width$}", value, width = *width));
        }
        line
    }

    /// 排序、量測並輸出表頭、分隔線與每一列；回傳輸出的資料列數
    pub fn render<W: Write>(&self, mut rows: Vec<FlatRow>, out: &mut W) -> io::Result<usize> {
        let columns = self.select_columns(&rows);
        self.sort_rows(&mut rows);
        let widths = self.column_widths(&columns, &rows);

        let header: String = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:<width$}", column, width = *width))
            .collect();
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "=".repeat(header.chars().count()))?;

        for (position, row) in rows.iter().enumerate() {
            let line = self.format_row(position + 1, row, &columns, &widths);
            if self.options.highlight && is_highlighted(row) {
                writeln!(out, "{}{}{}", HIGHLIGHT_START, line, HIGHLIGHT_END)?;
            } else {
                writeln!(out, "{}", line)?;
            }
        }

        tracing::debug!(
            "Rendered {} rows across {} columns ({:?} sort)",
            rows.len(),
            columns.len(),
            self.options.sort
        );
        Ok(rows.len())
    }

    pub fn render_to_string(&self, rows: Vec<FlatRow>) -> String {
        let mut buffer = Vec::new();
        // 寫入 Vec<u8> 不會失敗
        let _ = self.render(rows, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
