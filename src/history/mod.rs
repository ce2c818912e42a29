//! # Request History
//!
//! History is a capped, most-recent-first log of executions. Retention is by
//! save order: items from the latest save always count as the newest,
//! whatever their `timestamp` says.

use uuid::Uuid;

use crate::domain::{HistoryItem, RequestData, ResponseData};

impl HistoryItem {
    /// Snapshot an execution at the current wall-clock time.
    pub fn record(request: &RequestData, response: &ResponseData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request: request.clone(),
            response: response.clone(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Put `incoming` ahead of `existing` and keep the first `limit` entries.
pub fn prepend_capped(incoming: &[HistoryItem], existing: Vec<HistoryItem>, limit: usize) -> Vec<HistoryItem> {
    let mut combined = Vec::with_capacity(incoming.len() + existing.len());
    combined.extend_from_slice(incoming);
    combined.extend(existing);
    combined.truncate(limit);
    combined
}
