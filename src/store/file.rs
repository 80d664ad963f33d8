//! File-backed session store: one pretty-printed JSON document per session.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::interview::model::SessionRecord;

use super::traits::{
    SessionStore, SessionSummary, decode_record, sort_newest_first, validate_file_name,
};

/// Session store rooted at a directory on disk.
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `base_path`. The directory is created lazily.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ensure the sessions directory exists.
    pub async fn ensure_dir(&self) -> Result<(), SessionError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionError::persistence(&self.base_path.display().to_string(), e))
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, SessionError> {
        validate_file_name(file_name)?;
        Ok(self.base_path.join(file_name))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<String, SessionError> {
        let file_name = record.file_name.as_str();
        let path = self.resolve(file_name)?;
        let payload = serde_json::to_string_pretty(record)
            .map_err(|e| SessionError::persistence(file_name, e))?;

        self.ensure_dir().await?;

        // Write beside the target and rename so a crash never leaves half a file.
        let tmp_path = self.base_path.join(format!(".{file_name}.tmp"));
        fs::write(&tmp_path, payload.as_bytes())
            .await
            .map_err(|e| SessionError::persistence(file_name, e))?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(SessionError::persistence(file_name, e));
        }

        debug!(file_name, bytes = payload.len(), "Session saved");
        Ok(file_name.to_string())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = Vec::new();
        let mut dir = match fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(summaries),
            Err(e) => {
                return Err(SessionError::persistence(
                    &self.base_path.display().to_string(),
                    e,
                ));
            }
        };

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| SessionError::persistence(&self.base_path.display().to_string(), e))?
        {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if validate_file_name(&file_name).is_err() {
                continue;
            }

            let payload = match fs::read_to_string(entry.path()).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(file_name = %file_name, error = %e, "Skipping unreadable session file");
                    continue;
                }
            };
            match decode_record(&file_name, &payload) {
                Ok(record) => summaries.push(SessionSummary::from(&record)),
                Err(e) => warn!(file_name = %file_name, error = %e, "Skipping corrupted session file"),
            }
        }

        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn load(&self, file_name: &str) -> Result<SessionRecord, SessionError> {
        let path = self.resolve(file_name)?;
        let payload = match fs::read_to_string(&path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SessionError::NotFound(file_name.to_string()));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(SessionError::corruption(file_name, e));
            }
            Err(e) => return Err(SessionError::persistence(file_name, e)),
        };
        decode_record(file_name, &payload)
    }

    async fn delete(&self, file_name: &str) -> Result<(), SessionError> {
        let path = self.resolve(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file_name, "Session deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SessionError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(SessionError::persistence(file_name, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    use crate::interview::model::{
        Company, ExperienceLevel, Feedback, Position, Profile,
    };
    use crate::llm::ChatMessage;

    fn test_store() -> (FileSessionStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));
        (store, dir)
    }

    fn record(name: &str) -> SessionRecord {
        let profile = Profile::new(
            name,
            ExperienceLevel::Junior,
            "Python",
            Some("Bootcamp"),
            Position::DataScientist,
            Company::Google,
        )
        .unwrap();
        let mut record = SessionRecord::new(profile, "You are an interviewer.");
        record.messages.push(ChatMessage::assistant("Tell me about yourself."));
        record
    }

    fn completed(name: &str) -> SessionRecord {
        let mut r = record(name);
        for i in 0..5 {
            r.messages.push(ChatMessage::user(&format!("answer {i}")));
            r.messages.push(ChatMessage::assistant(&format!("question {i}")));
        }
        r.messages.pop();
        r.question_count = 5;
        r.feedback = Some(Feedback {
            text: "Overall Score: 8\nFeedback: clear answers".to_string(),
            score: Some(8),
        });
        r
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let (store, _dir) = test_store();
        let original = completed("Ada");
        let file_name = store.save(&original).await.unwrap();
        assert_eq!(file_name, original.file_name);

        let loaded = store.load(&file_name).await.unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn save_overwrites_existing_file() {
        let (store, _dir) = test_store();
        let mut r = record("Ada");
        store.save(&r).await.unwrap();

        r.messages.push(ChatMessage::user("my answer"));
        r.question_count = 1;
        store.save(&r).await.unwrap();

        let loaded = store.load(&r.file_name).await.unwrap();
        assert_eq!(loaded.question_count, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let (store, _dir) = test_store();
        let err = store.load("nonexistent.json").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(ref name) if name == "nonexistent.json"));
    }

    #[tokio::test]
    async fn load_malformed_is_corruption() {
        let (store, _dir) = test_store();
        store.ensure_dir().await.unwrap();
        fs::write(
            store.base_path().join("broken.json"),
            r#"{"messages": "not-a-list"}"#,
        )
        .await
        .unwrap();

        let err = store.load("broken.json").await.unwrap_err();
        assert!(matches!(err, SessionError::Corruption { .. }));
    }

    #[tokio::test]
    async fn load_rejects_path_traversal() {
        let (store, _dir) = test_store();
        let err = store.load("../secrets.json").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidFileName(_)));
    }

    #[tokio::test]
    async fn list_empty_when_dir_missing() {
        let (store, _dir) = test_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_skips_junk() {
        let (store, _dir) = test_store();
        let now = Utc::now();

        let mut oldest = record("Oldest");
        oldest.saved_at = now - Duration::minutes(10);
        let mut newest = record("Newest");
        newest.saved_at = now;
        let mut middle = record("Middle");
        middle.saved_at = now - Duration::minutes(5);

        for r in [&oldest, &newest, &middle] {
            store.save(r).await.unwrap();
        }
        fs::write(store.base_path().join("garbage.json"), "{")
            .await
            .unwrap();
        fs::write(store.base_path().join("notes.txt"), "hello")
            .await
            .unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.display_name)
            .collect();
        assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    }

    #[tokio::test]
    async fn list_summarizes_completion() {
        let (store, _dir) = test_store();
        store.save(&completed("Ada")).await.unwrap();
        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].completed);
        assert_eq!(summaries[0].question_count, 5);
        assert_eq!(summaries[0].company, Company::Google);
    }

    #[tokio::test]
    async fn delete_removes_from_list_and_load() {
        let (store, _dir) = test_store();
        let r = record("Ada");
        store.save(&r).await.unwrap();

        store.delete(&r.file_name).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        let err = store.load(&r.file_name).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn renamed_file_lists_and_loads_under_new_name() {
        let (store, _dir) = test_store();
        let r = record("Ada");
        store.save(&r).await.unwrap();
        fs::rename(
            store.base_path().join(&r.file_name),
            store.base_path().join("renamed.json"),
        )
        .await
        .unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].file_name, "renamed.json");

        let mut loaded = store.load(&summaries[0].file_name).await.unwrap();
        assert_eq!(loaded.file_name, "renamed.json");
        assert!(matches!(
            store.load(&r.file_name).await,
            Err(SessionError::NotFound(_))
        ));

        // Saving the loaded record writes back to the file it came from.
        loaded.messages.push(ChatMessage::user("an answer"));
        loaded.question_count = 1;
        store.save(&loaded).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.load("renamed.json").await.unwrap().question_count, 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (store, _dir) = test_store();
        let err = store.delete("gone.json").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn save_into_unwritable_location_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = FileSessionStore::new(blocker.join("sessions"));

        let err = store.save(&record("Ada")).await.unwrap_err();
        assert!(matches!(err, SessionError::Persistence { .. }));
    }
}
