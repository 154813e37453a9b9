//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for cowrite.

mod repl;

pub use repl::{ChatRepl, ReplCommand, send_message};
