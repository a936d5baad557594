//! The persistence seam.
//!
//! Submissions are persisted by whatever implements [`Storage`]. The cloud
//! deployment appends to a Google Sheet; tests and the oneshot binary use
//! the in-memory backend, which only logs. Appends are at-most-once: a
//! failure is propagated to the caller and never retried.

use anyhow::Result;
use async_trait::async_trait;
use lambda_http::tracing;
use std::sync::Mutex;

use crate::record::SurveyResponse;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Durably store one submission, returning its external identifier.
    async fn append(&self, record: &SurveyResponse) -> Result<String>;
}

/// Log-only backend that keeps appended rows in memory.
#[derive(Default)]
pub struct MemoryStorage {
    rows: Mutex<Vec<SurveyResponse>>,
}

impl MemoryStorage {
    pub fn rows(&self) -> Vec<SurveyResponse> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn append(&self, record: &SurveyResponse) -> Result<String> {
        tracing::info!(id = %record.id, "keeping survey response in memory");
        self.rows.lock().unwrap().push(record.clone());
        Ok(record.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_storage_returns_the_record_id() {
        let data = match json!({"ime": "Ana", "starost": "34"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let record = SurveyResponse::new(&data, "unknown", "unknown");
        let storage = MemoryStorage::default();

        let id = storage.append(&record).await.unwrap();

        assert_eq!(id, record.id);
        let rows = storage.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, record.id);
    }
}
