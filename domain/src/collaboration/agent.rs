//! Agent value objects and the system instruction library.
//!
//! - [`AgentId`] - stable identity of a roster member (`lead`, `agent-<n>`)
//! - [`InstructionRef`] - names a [`SystemInstruction`] in an [`InstructionLibrary`]
//! - [`AgentColor`] - display colour from a fixed palette
//! - [`Agent`] - one participant as seen by the turn loop

use serde::{Deserialize, Serialize};

/// Id of the implicit lead agent.
pub const LEAD_AGENT_ID: &str = "lead";

/// Stable identity of a roster member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn lead() -> Self {
        Self(LEAD_AGENT_ID.to_string())
    }

    /// Id of the `n`th explicitly added agent.
    pub fn explicit(n: u32) -> Self {
        Self(format!("agent-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_lead(&self) -> bool {
        self.0 == LEAD_AGENT_ID
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a system instruction by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionRef(String);

impl InstructionRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for InstructionRef {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for InstructionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reusable system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInstruction {
    pub id: InstructionRef,
    pub name: String,
    pub content: String,
}

impl SystemInstruction {
    pub fn new(
        id: impl Into<InstructionRef>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The set of system instructions agents can reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionLibrary {
    instructions: Vec<SystemInstruction>,
}

impl InstructionLibrary {
    pub fn new(instructions: Vec<SystemInstruction>) -> Self {
        Self { instructions }
    }

    pub fn get(&self, id: &InstructionRef) -> Option<&SystemInstruction> {
        self.instructions.iter().find(|i| &i.id == id)
    }

    pub fn contains(&self, id: &InstructionRef) -> bool {
        self.get(id).is_some()
    }

    /// Content of the referenced instruction, or an empty string.
    pub fn content_of(&self, id: &InstructionRef) -> &str {
        self.get(id).map(|i| i.content.as_str()).unwrap_or_default()
    }

    /// Insert or replace by id.
    pub fn upsert(&mut self, instruction: SystemInstruction) {
        match self.instructions.iter_mut().find(|i| i.id == instruction.id) {
            Some(existing) => *existing = instruction,
            None => self.instructions.push(instruction),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemInstruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Display colour, assigned by roster position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentColor {
    Blue,
    Green,
    Amber,
    Purple,
}

impl AgentColor {
    pub const PALETTE: [AgentColor; 4] = [
        AgentColor::Blue,
        AgentColor::Green,
        AgentColor::Amber,
        AgentColor::Purple,
    ];

    /// Colour for a position in the combined roster.
    pub fn for_position(position: usize) -> Self {
        Self::PALETTE[position % Self::PALETTE.len()]
    }

    pub fn hex(&self) -> &'static str {
        match self {
            AgentColor::Blue => "#3b82f6",
            AgentColor::Green => "#10b981",
            AgentColor::Amber => "#f59e0b",
            AgentColor::Purple => "#8b5cf6",
        }
    }

    /// Closest terminal colour name.
    pub fn terminal_name(&self) -> &'static str {
        match self {
            AgentColor::Blue => "blue",
            AgentColor::Green => "green",
            AgentColor::Amber => "yellow",
            AgentColor::Purple => "magenta",
        }
    }
}

/// One participant of a delegated collaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub label: String,
    pub color: AgentColor,
    pub instruction: InstructionRef,
    /// Zero-based position in the combined roster
    pub position: usize,
}

impl Agent {
    pub fn is_lead(&self) -> bool {
        self.id.is_lead()
    }
}
