//! Instruction library and agent roster from TOML
//! (`[[instructions]]` and `[[agents]]` arrays)

use cowrite_domain::{InstructionRef, SystemInstruction};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTRUCTION_ID: &str = "default";
const DEFAULT_INSTRUCTION_NAME: &str = "New Agent";
const DEFAULT_INSTRUCTION_CONTENT: &str =
    "You are a thoughtful writing assistant helping the user improve a shared document.";

/// One `[[instructions]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInstructionConfig {
    pub id: String,
    #[serde(default = "default_instruction_name")]
    pub name: String,
    pub content: String,
}

fn default_instruction_name() -> String {
    DEFAULT_INSTRUCTION_NAME.to_string()
}

impl From<&FileInstructionConfig> for SystemInstruction {
    fn from(config: &FileInstructionConfig) -> Self {
        SystemInstruction::new(
            config.id.as_str(),
            config.name.as_str(),
            config.content.as_str(),
        )
    }
}

/// Built-in instruction used when none are configured.
pub fn default_instruction() -> SystemInstruction {
    SystemInstruction::new(
        DEFAULT_INSTRUCTION_ID,
        DEFAULT_INSTRUCTION_NAME,
        DEFAULT_INSTRUCTION_CONTENT,
    )
}

/// One `[[agents]]` entry
///
/// ```toml
/// [[agents]]
/// label = "Critic"
/// instruction = "critic"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAgentEntry {
    pub label: String,
    pub instruction: String,
    /// Accepted for compatibility; colours always follow roster position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FileAgentEntry {
    pub fn instruction_ref(&self) -> InstructionRef {
        InstructionRef::new(self.instruction.as_str())
    }
}
