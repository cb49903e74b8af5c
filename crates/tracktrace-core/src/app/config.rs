//! Store configuration - ストアの設定

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 作成日・更新日のスタンプを Row に書く形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `YYYY-MM-DD`
    #[default]
    Date,
    /// マイクロ秒までの UTC の ISO-8601 タイムスタンプ
    Rfc3339,
}

impl TimestampFormat {
    pub fn render(self, at: DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Date => at.format("%Y-%m-%d").to_string(),
            TimestampFormat::Rfc3339 => at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub timestamp_format: TimestampFormat,

    /// holder / charger の assembly id が保存されていない package を拒否する
    pub check_references: bool,

    /// ストアが対応していれば update に `TableStore::replace_row` を使う
    pub prefer_atomic_replace: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::Date,
            check_references: false,
            prefer_atomic_replace: true,
        }
    }
}

impl StoreConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
