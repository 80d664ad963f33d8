//! In-process session store.
//!
//! Keeps serialized JSON rather than live records so loads go through the
//! same decoding and validation as the file store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SessionError;
use crate::interview::model::SessionRecord;

use super::traits::{
    SessionStore, SessionSummary, decode_record, sort_newest_first, validate_file_name,
};

#[derive(Default)]
pub struct MemorySessionStore {
    documents: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document as-is, bypassing serialization.
    pub async fn insert_raw(&self, file_name: &str, payload: &str) {
        self.documents
            .write()
            .await
            .insert(file_name.to_string(), payload.to_string());
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<String, SessionError> {
        validate_file_name(&record.file_name)?;
        let payload = serde_json::to_string_pretty(record)
            .map_err(|e| SessionError::persistence(&record.file_name, e))?;
        self.insert_raw(&record.file_name, &payload).await;
        Ok(record.file_name.clone())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let documents = self.documents.read().await;
        let mut summaries: Vec<SessionSummary> = documents
            .iter()
            .filter_map(|(name, payload)| match decode_record(name, payload) {
                Ok(record) => Some(SessionSummary::from(&record)),
                Err(e) => {
                    tracing::warn!(file_name = %name, error = %e, "Skipping corrupted session");
                    None
                }
            })
            .collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn load(&self, file_name: &str) -> Result<SessionRecord, SessionError> {
        validate_file_name(file_name)?;
        let documents = self.documents.read().await;
        let payload = documents
            .get(file_name)
            .ok_or_else(|| SessionError::NotFound(file_name.to_string()))?;
        decode_record(file_name, payload)
    }

    async fn delete(&self, file_name: &str) -> Result<(), SessionError> {
        validate_file_name(file_name)?;
        self.documents
            .write()
            .await
            .remove(file_name)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(file_name.to_string()))
    }
}
