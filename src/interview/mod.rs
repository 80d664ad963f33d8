//! Interview system: profile, five-question conversation, feedback.
//!
//! The engine drives a linear conversation with the model acting as an
//! interviewer. After the fifth answer the transcript is sent back to the
//! model for a scored review. Records are persisted through a `SessionStore`
//! at two checkpoints: right after the last answer and once feedback arrives.

pub mod engine;
pub mod export;
pub mod model;
pub mod prompts;
pub mod state;

pub use engine::{InterviewEngine, TurnOutcome};
pub use export::ExportFormat;
pub use model::{Company, ExperienceLevel, Feedback, Position, Profile, SessionRecord};
pub use state::{InterviewPhase, MAX_QUESTIONS};
