//! Prompt construction for the agency assistant.

pub mod prompt_builder;

pub use prompt_builder::{NO_HISTORY_MARKER, PromptParts, SYSTEM_PREAMBLE, build_prompt};
