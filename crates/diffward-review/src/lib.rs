//! Review orchestration for diffward.
//!
//! Validates settings, composes prompts, calls the chat model, and delivers
//! the result to the pull request through one of the posting strategies.

pub mod addons;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod poster;
pub mod prompt;
pub mod settings;
