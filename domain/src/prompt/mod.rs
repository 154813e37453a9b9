//! Prompt domain
//!
//! Templates for each request the coordinator issues.

mod template;

pub use template::PromptTemplate;
