//! Candidate profile and session record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::llm::{ChatMessage, Role};

use super::state::{InterviewPhase, MAX_QUESTIONS};

pub const MAX_NAME_CHARS: usize = 40;
pub const MAX_SKILLS_CHARS: usize = 200;
pub const MAX_BACKGROUND_CHARS: usize = 200;

/// Defines a closed set of options that (de)serialize as their display label.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ProfileError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ProfileError::UnknownOption {
                        field: $field,
                        value: wanted.to_string(),
                    })
            }
        }
    };
}

labeled_enum! {
    /// Seniority the candidate is interviewing for.
    ExperienceLevel, "experience level" {
        Intern => "Intern",
        Junior => "Junior",
        MidLevel => "Mid-level",
        Senior => "Senior",
        Lead => "Lead",
    }
}

labeled_enum! {
    /// Target role.
    Position, "position" {
        DataScientist => "Data Scientist",
        DataEngineer => "Data Engineer",
        MlEngineer => "ML Engineer",
        BiAnalyst => "BI Analyst",
        FinancialAnalyst => "Financial Analyst",
    }
}

labeled_enum! {
    Company, "company" {
        Google => "Google",
        Microsoft => "Microsoft",
        Apple => "Apple",
        Amazon => "Amazon",
        Meta => "Meta",
        Company365 => "365 Company",
    }
}

/// Candidate profile collected before the interview starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub experience_level: ExperienceLevel,
    pub skills: String,
    /// Free-text description of prior experience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub position: Position,
    pub company: Company,
}

impl Profile {
    /// Build a validated profile. Text fields are trimmed; an empty background
    /// becomes `None`.
    pub fn new(
        name: &str,
        experience_level: ExperienceLevel,
        skills: &str,
        background: Option<&str>,
        position: Position,
        company: Company,
    ) -> Result<Self, ProfileError> {
        let profile = Self {
            name: name.trim().to_string(),
            experience_level,
            skills: skills.trim().to_string(),
            background: background
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from),
            position,
            company,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        check_len("name", &self.name, MAX_NAME_CHARS)?;
        check_len("skills", &self.skills, MAX_SKILLS_CHARS)?;
        if let Some(ref background) = self.background {
            check_len("background", background, MAX_BACKGROUND_CHARS)?;
        }
        Ok(())
    }

    /// "Junior Data Scientist"
    pub fn role_title(&self) -> String {
        format!("{} {}", self.experience_level, self.position)
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ProfileError> {
    let length = value.chars().count();
    if length > max {
        return Err(ProfileError::TooLong { field, length, max });
    }
    Ok(())
}

/// Model-generated performance review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    /// 1..=10, or `None` when no score could be read from `text`.
    pub score: Option<u8>,
}

/// The unit of persistence: one profile, its transcript and optional feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub file_name: String,
    pub profile: Profile,
    pub messages: Vec<ChatMessage>,
    pub question_count: u8,
    pub feedback: Option<Feedback>,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a fresh record seeded with the interviewer system prompt.
    pub fn new(profile: Profile, system_prompt: &str) -> Self {
        let now = Utc::now();
        Self {
            file_name: session_file_name(&profile.name, now),
            profile,
            messages: vec![ChatMessage::system(system_prompt)],
            question_count: 0,
            feedback: None,
            created_at: now,
            saved_at: now,
        }
    }

    /// Current position in the interview state machine.
    pub fn phase(&self) -> InterviewPhase {
        if self.feedback.is_some() {
            InterviewPhase::Completed
        } else if self.question_count >= MAX_QUESTIONS {
            InterviewPhase::FeedbackPending
        } else if self.messages.iter().any(|m| m.role == Role::Assistant) {
            InterviewPhase::AwaitingAnswer
        } else {
            InterviewPhase::NotStarted
        }
    }

    /// The most recent interviewer question, if any.
    pub fn last_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Stamp `saved_at` before a store write.
    pub fn touch(&mut self) {
        self.saved_at = Utc::now();
    }

    /// Check the record invariants. Used when loading from storage.
    pub fn validate(&self) -> Result<(), String> {
        if self.question_count > MAX_QUESTIONS {
            return Err(format!(
                "question_count {} exceeds {MAX_QUESTIONS}",
                self.question_count
            ));
        }
        match self.messages.first() {
            Some(m) if m.role == Role::System => {}
            _ => return Err("first message must be the system prompt".to_string()),
        }
        let answers = self.messages.iter().filter(|m| m.role == Role::User).count();
        if answers != usize::from(self.question_count) {
            return Err(format!(
                "question_count {} does not match {answers} answers",
                self.question_count
            ));
        }
        if let Some(ref feedback) = self.feedback {
            if self.question_count != MAX_QUESTIONS {
                return Err("feedback present before the interview finished".to_string());
            }
            if let Some(score) = feedback.score {
                if !(1..=10).contains(&score) {
                    return Err(format!("feedback score {score} outside 1..=10"));
                }
            }
        }
        self.profile.validate().map_err(|e| e.to_string())
    }
}

/// `interview_<slug>_<YYYYmmdd_HHMMSS>_<8 hex>.json`
pub fn session_file_name(name: &str, at: DateTime<Utc>) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "candidate".to_string() } else { slug };
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("interview_{slug}_{}_{suffix}.json", at.format("%Y%m%d_%H%M%S"))
}
