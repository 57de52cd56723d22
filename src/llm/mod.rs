pub mod client;
pub mod prompt;

pub use client::{LlmAnalysis, LlmClient};
