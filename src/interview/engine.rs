//! InterviewEngine: drives the five-question interview and the feedback
//! step, persisting at the two checkpoints.

use std::sync::Arc;

use crate::error::SessionError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::store::SessionStore;

use super::model::{Feedback, Profile, SessionRecord};
use super::prompts::{feedback_messages, interviewer_system_prompt, parse_feedback};
use super::state::InterviewPhase;

/// Longest accepted answer, in characters.
pub const MAX_ANSWER_CHARS: usize = 1000;

const QUESTION_MAX_TOKENS: u32 = 512;
const FEEDBACK_MAX_TOKENS: u32 = 1024;

/// What the caller should render after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A new question was asked. `question_number` is 1-based.
    AwaitingAnswer { question: String, question_number: u8 },
    /// All answers are in and the review is ready.
    Completed { feedback: Feedback },
}

impl TurnOutcome {
    pub fn phase(&self) -> InterviewPhase {
        match self {
            Self::AwaitingAnswer { .. } => InterviewPhase::AwaitingAnswer,
            Self::Completed { .. } => InterviewPhase::Completed,
        }
    }
}

/// Coordinates the interview: question generation, answer bookkeeping,
/// feedback and checkpoint writes.
///
/// The engine holds no session state; the caller owns the `SessionRecord`
/// and passes it into each operation.
pub struct InterviewEngine {
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn SessionStore>,
}

impl InterviewEngine {
    pub fn new(llm: Arc<dyn LlmProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self { llm, store }
    }

    /// Create a session for `profile` and ask the opening question.
    pub async fn start(&self, profile: Profile) -> Result<SessionRecord, SessionError> {
        profile.validate()?;
        let system_prompt = interviewer_system_prompt(&profile);
        let mut record = SessionRecord::new(profile, &system_prompt);

        let question = self.next_question(&record.messages).await?;
        record.messages.push(ChatMessage::assistant(&question));

        tracing::info!(
            file_name = %record.file_name,
            position = %record.profile.position,
            company = %record.profile.company,
            "Interview started"
        );
        Ok(record)
    }

    /// Record an answer and advance the interview.
    ///
    /// Answers one to four fetch the next question. The fifth answer writes
    /// checkpoint 1, requests feedback and writes checkpoint 2. A failed
    /// question request leaves `record` untouched.
    pub async fn submit_answer(
        &self,
        record: &mut SessionRecord,
        answer: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let phase = record.phase();
        if phase != InterviewPhase::AwaitingAnswer {
            return Err(invalid_transition(phase, "submit an answer"));
        }
        validate_answer(answer)?;

        let answered = record.question_count + 1;
        let next_phase = InterviewPhase::after_answer(answered);
        debug_assert!(phase.can_transition_to(next_phase));

        if next_phase == InterviewPhase::AwaitingAnswer {
            let mut history = record.messages.clone();
            history.push(ChatMessage::user(answer));
            let question = self.next_question(&history).await?;

            history.push(ChatMessage::assistant(&question));
            record.messages = history;
            record.question_count = answered;

            tracing::info!(
                file_name = %record.file_name,
                question_count = answered,
                "Answer recorded"
            );
            return Ok(TurnOutcome::AwaitingAnswer {
                question,
                question_number: answered + 1,
            });
        }

        record.messages.push(ChatMessage::user(answer));
        record.question_count = answered;
        let previous_saved_at = record.saved_at;
        record.touch();

        if let Err(e) = self.store.save(record).await {
            record.messages.pop();
            record.question_count -= 1;
            record.saved_at = previous_saved_at;
            tracing::error!(file_name = %record.file_name, error = %e, "Checkpoint 1 failed");
            return Err(e);
        }
        tracing::info!(file_name = %record.file_name, "Checkpoint 1 saved, requesting feedback");

        self.complete_with_feedback(record).await
    }

    /// Run the feedback step for a record left in `FeedbackPending`, e.g.
    /// after a failed feedback request or when resuming a saved session.
    pub async fn request_feedback(
        &self,
        record: &mut SessionRecord,
    ) -> Result<TurnOutcome, SessionError> {
        let phase = record.phase();
        if phase != InterviewPhase::FeedbackPending {
            return Err(invalid_transition(phase, "request feedback"));
        }
        self.complete_with_feedback(record).await
    }

    /// Stamp `saved_at` and write the record. Returns the file name.
    pub async fn save(&self, record: &mut SessionRecord) -> Result<String, SessionError> {
        record.touch();
        self.store.save(record).await
    }

    async fn complete_with_feedback(
        &self,
        record: &mut SessionRecord,
    ) -> Result<TurnOutcome, SessionError> {
        let request = CompletionRequest::new(feedback_messages(&record.messages))
            .with_max_tokens(FEEDBACK_MAX_TOKENS);
        let response = self.llm.complete(request).await.map_err(|e| {
            tracing::error!(file_name = %record.file_name, error = %e, "Feedback request failed");
            SessionError::Generation(e)
        })?;

        let feedback = parse_feedback(&response.content);
        debug_assert!(record.phase().can_transition_to(InterviewPhase::Completed));
        let previous_saved_at = record.saved_at;
        record.feedback = Some(feedback.clone());
        record.touch();

        if let Err(e) = self.store.save(record).await {
            record.feedback = None;
            record.saved_at = previous_saved_at;
            tracing::error!(file_name = %record.file_name, error = %e, "Checkpoint 2 failed");
            return Err(e);
        }

        tracing::info!(
            file_name = %record.file_name,
            score = ?feedback.score,
            "Interview completed"
        );
        Ok(TurnOutcome::Completed { feedback })
    }

    async fn next_question(&self, history: &[ChatMessage]) -> Result<String, SessionError> {
        let request =
            CompletionRequest::new(history.to_vec()).with_max_tokens(QUESTION_MAX_TOKENS);
        let response = self.llm.complete(request).await.map_err(|e| {
            tracing::warn!(model = self.llm.model_name(), error = %e, "Question request failed");
            SessionError::Generation(e)
        })?;
        Ok(response.content.trim().to_string())
    }
}

/// Whitespace-only answers are rejected; accepted answers are stored verbatim.
fn validate_answer(answer: &str) -> Result<(), SessionError> {
    if answer.trim().is_empty() {
        return Err(SessionError::InvalidAnswer("answer must not be empty".to_string()));
    }
    let length = answer.chars().count();
    if length > MAX_ANSWER_CHARS {
        return Err(SessionError::InvalidAnswer(format!(
            "answer is {length} characters, at most {MAX_ANSWER_CHARS} allowed"
        )));
    }
    Ok(())
}

fn invalid_transition(phase: InterviewPhase, action: &str) -> SessionError {
    SessionError::InvalidTransition {
        phase: phase.to_string(),
        action: action.to_string(),
    }
}
