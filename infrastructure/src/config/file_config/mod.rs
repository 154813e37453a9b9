//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and
//! application types on demand.

mod collaboration;
mod library;
mod logging;
mod output;
mod service;

pub use collaboration::{FileCollaborationConfig, FileTurns};
pub use library::{
    DEFAULT_INSTRUCTION_ID, FileAgentEntry, FileInstructionConfig, default_instruction,
};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use service::{DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, FileServiceConfig};

use cowrite_application::BehaviorConfig;
use cowrite_domain::{
    AgentRoster, InstructionLibrary, InstructionRef, MAX_EXPLICIT_AGENTS, RosterError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("service.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("service.endpoint cannot be empty")]
    EmptyEndpoint,

    #[error("{count} agents configured, at most {max} are supported")]
    TooManyAgents { count: usize, max: usize },

    #[error("{context} references unknown instruction '{instruction}'")]
    UnknownInstruction { context: String, instruction: String },

    #[error("instruction id '{0}' is defined more than once")]
    DuplicateInstruction(String),

    #[error("collaboration.turns: expected \"auto\" or a number, got '{0}'")]
    InvalidTurns(String),

    #[error("collaboration.on_cancel: unknown value '{0}'")]
    InvalidCancelPolicy(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generative service connection
    pub service: FileServiceConfig,
    /// Turn loop settings
    pub collaboration: FileCollaborationConfig,
    /// System instruction library
    pub instructions: Vec<FileInstructionConfig>,
    /// Explicit agents, in speaking order
    pub agents: Vec<FileAgentEntry>,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.service.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.service.endpoint.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyEndpoint);
        }
        if self.agents.len() > MAX_EXPLICIT_AGENTS {
            issues.push(ConfigValidationError::TooManyAgents {
                count: self.agents.len(),
                max: MAX_EXPLICIT_AGENTS,
            });
        }

        let mut seen = HashSet::new();
        for instruction in &self.instructions {
            if !seen.insert(instruction.id.as_str()) {
                issues.push(ConfigValidationError::DuplicateInstruction(
                    instruction.id.clone(),
                ));
            }
        }

        let library = self.instruction_library();
        for agent in &self.agents {
            if !library.contains(&agent.instruction_ref()) {
                issues.push(ConfigValidationError::UnknownInstruction {
                    context: format!("agent '{}'", agent.label),
                    instruction: agent.instruction.clone(),
                });
            }
        }
        if let Some(lead) = &self.collaboration.lead_instruction
            && !library.contains(&InstructionRef::new(lead.as_str()))
        {
            issues.push(ConfigValidationError::UnknownInstruction {
                context: "collaboration.lead_instruction".to_string(),
                instruction: lead.clone(),
            });
        }

        if let Err(e) = self.collaboration.parse_turns() {
            issues.push(e);
        }
        if let Err(e) = self.collaboration.parse_cancel_policy() {
            issues.push(e);
        }

        issues
    }

    /// Configured instructions, or the built-in default when none are set.
    pub fn instruction_library(&self) -> InstructionLibrary {
        if self.instructions.is_empty() {
            return InstructionLibrary::new(vec![default_instruction()]);
        }
        let mut library = InstructionLibrary::default();
        for instruction in &self.instructions {
            library.upsert(instruction.into());
        }
        library
    }

    /// Lead plus the configured agents. Agents beyond capacity are an error.
    pub fn roster(&self) -> Result<AgentRoster, RosterError> {
        let lead = self
            .collaboration
            .lead_instruction
            .clone()
            .or_else(|| self.instructions.first().map(|i| i.id.clone()))
            .unwrap_or_else(|| DEFAULT_INSTRUCTION_ID.to_string());

        let mut roster = AgentRoster::new().with_lead(lead);
        for agent in &self.agents {
            roster.add_agent(agent.label.as_str(), agent.instruction_ref())?;
        }
        if let Ok(turns) = self.collaboration.parse_turns() {
            roster.set_turns(turns);
        }
        Ok(roster)
    }

    /// Runtime knobs for the use cases. Invalid values fall back to defaults;
    /// `validate` reports them.
    pub fn behavior_config(&self) -> BehaviorConfig {
        let timeout = (self.service.timeout_seconds > 0).then_some(self.service.timeout_seconds);
        BehaviorConfig::from_timeout_seconds(timeout)
            .with_history_window(self.service.history_window)
            .with_auto_turns(self.collaboration.auto_turns)
            .with_cancel_policy(self.collaboration.parse_cancel_policy().unwrap_or_default())
    }
}
