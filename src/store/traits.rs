//! `SessionStore` trait: the single interface for session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SessionError;
use crate::interview::model::{Company, Position, SessionRecord};

/// Listing entry for a stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub file_name: String,
    pub display_name: String,
    pub position: Position,
    pub company: Company,
    pub question_count: u8,
    pub completed: bool,
    pub saved_at: DateTime<Utc>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            file_name: record.file_name.clone(),
            display_name: record.profile.name.clone(),
            position: record.profile.position,
            company: record.profile.company,
            question_count: record.question_count,
            completed: record.feedback.is_some(),
            saved_at: record.saved_at,
        }
    }
}

/// Backend-agnostic session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write `record` under its `file_name`, replacing any previous version.
    /// Returns the file name written.
    async fn save(&self, record: &SessionRecord) -> Result<String, SessionError>;

    /// Summaries of every readable session, most recently saved first.
    async fn list(&self) -> Result<Vec<SessionSummary>, SessionError>;

    /// Load a full record.
    async fn load(&self, file_name: &str) -> Result<SessionRecord, SessionError>;

    /// Remove a record. Fails with `NotFound` if it does not exist.
    async fn delete(&self, file_name: &str) -> Result<(), SessionError>;
}

/// Reject identifiers that could escape the store or aren't session files.
pub fn validate_file_name(file_name: &str) -> Result<(), SessionError> {
    let ok = !file_name.is_empty()
        && file_name.ends_with(".json")
        && !file_name.starts_with('.')
        && !file_name.contains(['/', '\\'])
        && !file_name.contains("..");
    if ok {
        Ok(())
    } else {
        Err(SessionError::InvalidFileName(file_name.to_string()))
    }
}

/// Parse and validate a stored JSON document.
///
/// The record takes the name it was stored under, so a renamed or copied
/// file lists, loads and saves back under its own name.
pub fn decode_record(file_name: &str, payload: &str) -> Result<SessionRecord, SessionError> {
    let mut record: SessionRecord = serde_json::from_str(payload)
        .map_err(|e| SessionError::corruption(file_name, e))?;
    if record.file_name != file_name {
        tracing::debug!(
            stored = %record.file_name,
            file_name,
            "Session document names another file, using its storage name"
        );
        record.file_name = file_name.to_string();
    }
    record
        .validate()
        .map_err(|reason| SessionError::corruption(file_name, reason))?;
    Ok(record)
}

/// Sort summaries newest first.
pub fn sort_newest_first(summaries: &mut [SessionSummary]) {
    summaries.sort_by(|a, b| {
        b.saved_at
            .cmp(&a.saved_at)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}
