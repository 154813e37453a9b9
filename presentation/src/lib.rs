//! Presentation layer for cowrite
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, the console change reviewer and the
//! interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;
pub mod review;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand, send_message};
pub use cli::commands::{AgentSpec, Cli};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use review::console::ConsoleReviewer;
