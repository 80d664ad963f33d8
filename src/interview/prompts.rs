//! Interviewer and evaluator prompts, plus feedback score extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::llm::ChatMessage;

use super::model::{Feedback, Profile};

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)overall\s+score\s*[:\-]?\s*\**\s*(\d+)\b(?:\s*(?:/|out\s+of)\s*10)?")
        .expect("score regex is valid")
});

/// System prompt that puts the model in the interviewer role for `profile`.
pub fn interviewer_system_prompt(profile: &Profile) -> String {
    let mut prompt = format!(
        "You are an HR executive interviewing the applicant {name} for the position \
{title} at {company}.\n\
- **Experience level:** {level}\n\
- **Skills:** {skills}",
        name = profile.name,
        title = profile.role_title(),
        company = profile.company,
        level = profile.experience_level,
        skills = if profile.skills.is_empty() {
            "not provided"
        } else {
            profile.skills.as_str()
        },
    );

    if let Some(ref background) = profile.background {
        prompt.push_str(&format!("\n- **Background:** {background}"));
    }

    prompt.push_str(
        "\n\nAsk exactly one interview question per message. Keep each question \
concise and relevant to the role. Acknowledge the previous answer briefly before \
asking the next question. Do not give feedback or scores during the interview.",
    );
    prompt
}

const EVALUATOR_SYSTEM_PROMPT: &str = "\
You are a helpful tool that provides feedback on interview performance.
Before the feedback, give a score from 1 to 10 (10 being the best).
Follow this format:
Overall Score: <your score>
Feedback: <your feedback here>
Give only your feedback without additional questions.";

/// Messages for the feedback request: evaluator instructions plus the full
/// transcript rendered as `role: content` lines.
pub fn feedback_messages(transcript: &[ChatMessage]) -> Vec<ChatMessage> {
    let history = transcript
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        ChatMessage::system(EVALUATOR_SYSTEM_PROMPT),
        ChatMessage::user(&format!(
            "This is the interview you need to evaluate.\n\
Keep in mind that you are only a tool and shouldn't engage in conversation:\n{history}"
        )),
    ]
}

/// Read the `Overall Score: n` line. Anything missing or outside 1..=10
/// yields `None`.
pub fn extract_score(text: &str) -> Option<u8> {
    let caps = SCORE_RE.captures(text)?;
    let score: u8 = caps.get(1)?.as_str().parse().ok()?;
    (1..=10).contains(&score).then_some(score)
}

/// Build `Feedback` from the raw evaluator output.
pub fn parse_feedback(text: &str) -> Feedback {
    let text = text.trim().to_string();
    let score = extract_score(&text);
    if score.is_none() {
        tracing::warn!("No usable score found in feedback text");
    }
    Feedback { text, score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::model::{Company, ExperienceLevel, Position};

    fn profile(background: Option<&str>) -> Profile {
        Profile::new(
            "Ada",
            ExperienceLevel::Junior,
            "Python, SQL",
            background,
            Position::DataScientist,
            Company::Google,
        )
        .unwrap()
    }

    #[test]
    fn system_prompt_includes_profile() {
        let prompt = interviewer_system_prompt(&profile(Some("Two years of analytics")));
        assert!(prompt.contains("Ada"));
        assert!(prompt.contains("Junior Data Scientist"));
        assert!(prompt.contains("Google"));
        assert!(prompt.contains("Python, SQL"));
        assert!(prompt.contains("Two years of analytics"));
    }

    #[test]
    fn system_prompt_omits_missing_background() {
        let prompt = interviewer_system_prompt(&profile(None));
        assert!(!prompt.contains("Background"));
    }

    #[test]
    fn feedback_messages_embed_transcript() {
        let transcript = vec![
            ChatMessage::system("ctx"),
            ChatMessage::assistant("Why data?"),
            ChatMessage::user("I like numbers"),
        ];
        let messages = feedback_messages(&transcript);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Overall Score"));
        assert!(messages[1].content.contains("assistant: Why data?"));
        assert!(messages[1].content.contains("user: I like numbers"));
    }

    #[test]
    fn extracts_common_score_formats() {
        assert_eq!(extract_score("Overall Score: 7\nFeedback: solid"), Some(7));
        assert_eq!(extract_score("overall score: 10/10"), Some(10));
        assert_eq!(extract_score("**Overall Score:** 6 out of 10"), Some(6));
        assert_eq!(extract_score("Overall Score - 3"), Some(3));
    }

    #[test]
    fn out_of_range_or_missing_score_is_none() {
        assert_eq!(extract_score("Overall Score: 0"), None);
        assert_eq!(extract_score("Overall Score: 42"), None);
        assert_eq!(extract_score("Overall Score: 100"), None);
        assert_eq!(extract_score("Overall Score: 99999999999"), None);
        assert_eq!(extract_score("Great job overall!"), None);
    }

    #[test]
    fn parse_feedback_keeps_text_when_score_missing() {
        let feedback = parse_feedback("  Nice answers, no number here.  ");
        assert_eq!(feedback.text, "Nice answers, no number here.");
        assert_eq!(feedback.score, None);
    }
}
