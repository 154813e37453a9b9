//! Configuration file loading for cowrite
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `COWRITE_*` environment variables (`COWRITE_SERVICE__ENDPOINT=...`)
//! 3. Project root: `./cowrite.toml` or `./.cowrite.toml`
//! 4. Global: `$XDG_CONFIG_HOME/cowrite/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_ENDPOINT, DEFAULT_INSTRUCTION_ID, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, FileAgentEntry, FileCollaborationConfig, FileConfig, FileInstructionConfig,
    FileLoggingConfig, FileOutputConfig, FileServiceConfig, FileTurns, default_instruction,
};
pub use loader::ConfigLoader;
