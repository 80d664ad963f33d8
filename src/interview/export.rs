//! Render a session record as downloadable text or JSON.

use crate::error::SessionError;
use crate::llm::Role;

use super::model::SessionRecord;

const RULE_WIDTH: usize = 50;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected txt or json)")),
        }
    }
}

/// Human-readable transcript: profile header, every non-system message
/// prefixed by its role, then the feedback block when present.
pub fn to_text(record: &SessionRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let profile = &record.profile;
    let mut out = vec![
        rule.clone(),
        "INTERVIEW CONVERSATION".to_string(),
        rule.clone(),
        format!("Name: {}", profile.name),
        format!("Position: {}", profile.role_title()),
        format!("Company: {}", profile.company),
    ];
    if !profile.skills.is_empty() {
        out.push(format!("Skills: {}", profile.skills));
    }
    if let Some(ref background) = profile.background {
        out.push(format!("Background: {background}"));
    }
    out.push(format!(
        "Date: {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push(rule.clone());
    out.push(String::new());

    for message in record.messages.iter().filter(|m| m.role != Role::System) {
        out.push(format!(
            "{}: {}",
            message.role.as_str().to_uppercase(),
            message.content
        ));
        out.push(String::new());
    }

    if let Some(ref feedback) = record.feedback {
        out.push(rule.clone());
        out.push("FEEDBACK".to_string());
        out.push(rule);
        match feedback.score {
            Some(score) => out.push(format!("Score: {score}/10")),
            None => out.push("Score: n/a".to_string()),
        }
        out.push(String::new());
        out.push(feedback.text.clone());
        out.push(String::new());
    }

    out.join("\n")
}

/// Canonical JSON, identical to the persisted document.
pub fn to_json(record: &SessionRecord) -> Result<String, SessionError> {
    serde_json::to_string_pretty(record).map_err(|e| SessionError::persistence(&record.file_name, e))
}

/// Bytes for a download in the requested format.
pub fn render(record: &SessionRecord, format: ExportFormat) -> Result<Vec<u8>, SessionError> {
    match format {
        ExportFormat::Text => Ok(to_text(record).into_bytes()),
        ExportFormat::Json => to_json(record).map(String::into_bytes),
    }
}

/// Suggested download name: the session file name with the format's extension.
pub fn export_file_name(record: &SessionRecord, format: ExportFormat) -> String {
    let stem = record
        .file_name
        .strip_suffix(".json")
        .unwrap_or(&record.file_name);
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::model::{
        Company, ExperienceLevel, Feedback, Position, Profile,
    };
    use crate::llm::ChatMessage;
    use crate::store::traits::decode_record;

    fn record() -> SessionRecord {
        let profile = Profile::new(
            "Ada",
            ExperienceLevel::MidLevel,
            "Python, SQL",
            None,
            Position::MlEngineer,
            Company::Meta,
        )
        .unwrap();
        let mut record = SessionRecord::new(profile, "SECRET SYSTEM PROMPT");
        record.messages.push(ChatMessage::assistant("Why ML?"));
        record.messages.push(ChatMessage::user("Because models."));
        record.messages.push(ChatMessage::assistant("Describe a project."));
        record.question_count = 1;
        record
    }

    #[test]
    fn text_has_header_and_role_prefixes() {
        let text = to_text(&record());
        assert!(text.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(text.contains("INTERVIEW CONVERSATION"));
        assert!(text.contains("Name: Ada"));
        assert!(text.contains("Position: Mid-level ML Engineer"));
        assert!(text.contains("Company: Meta"));
        assert!(text.contains("ASSISTANT: Why ML?"));
        assert!(text.contains("USER: Because models."));
        assert!(!text.contains("SECRET SYSTEM PROMPT"));
        assert!(!text.contains("FEEDBACK"));
    }

    #[test]
    fn text_preserves_message_order() {
        let text = to_text(&record());
        let first = text.find("Why ML?").unwrap();
        let second = text.find("Because models.").unwrap();
        let third = text.find("Describe a project.").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn text_includes_feedback_block() {
        let mut r = record();
        r.feedback = Some(Feedback {
            text: "Strong fundamentals.".to_string(),
            score: Some(7),
        });
        let text = to_text(&r);
        assert!(text.contains("FEEDBACK"));
        assert!(text.contains("Score: 7/10"));
        assert!(text.contains("Strong fundamentals."));

        r.feedback.as_mut().unwrap().score = None;
        assert!(to_text(&r).contains("Score: n/a"));
    }

    #[test]
    fn text_is_deterministic() {
        let r = record();
        assert_eq!(to_text(&r), to_text(&r));
    }

    #[test]
    fn json_matches_persisted_shape() {
        let r = record();
        let json = to_json(&r).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["file_name", "profile", "messages", "question_count", "feedback", "created_at", "saved_at"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["feedback"].is_null());
        assert_eq!(decode_record(&r.file_name, &json).unwrap(), r);
    }

    #[test]
    fn render_and_file_names() {
        let r = record();
        assert_eq!(render(&r, ExportFormat::Text).unwrap(), to_text(&r).into_bytes());
        let txt = export_file_name(&r, ExportFormat::Text);
        assert!(txt.ends_with(".txt"));
        assert!(!txt.contains(".json"));
        assert_eq!(export_file_name(&r, ExportFormat::Json), r.file_name);
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
    }
}
