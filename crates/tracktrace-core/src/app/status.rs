//! Status - ステータス別の件数集計

use std::collections::BTreeMap;

use serde::Serialize;

use crate::typed::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub table: String,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

impl StatusCounts {
    pub fn from_records<R: Record>(records: &[R]) -> Self {
        let mut by_status = BTreeMap::new();
        for record in records {
            *by_status.entry(record.status().to_string()).or_insert(0) += 1;
        }
        Self {
            table: R::SCHEMA.name.to_string(),
            total: records.len(),
            by_status,
        }
    }

    pub fn count(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}
