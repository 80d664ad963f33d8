//! Interview Coach: practice interviews driven by a chat completion model.

pub mod cli;
pub mod config;
pub mod error;
pub mod interview;
pub mod llm;
pub mod store;
