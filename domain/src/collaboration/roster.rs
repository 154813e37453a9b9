//! The agent roster and its configured turn count.

use super::agent::{Agent, AgentColor, AgentId, InstructionRef};
use thiserror::Error;

/// Most agents a user can add next to the implicit lead.
pub const MAX_EXPLICIT_AGENTS: usize = 3;

pub const MIN_TURNS: u8 = 1;
pub const MAX_TURNS: u8 = 10;

const LEAD_LABEL: &str = "Lead";
const DEFAULT_AGENT_LABEL: &str = "Agent";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster already holds {max} agents")]
    CapacityExceeded { max: usize },

    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("the lead agent follows the active instruction and cannot be removed")]
    LeadNotRemovable,
}

/// Configured number of turns per delegated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnSetting {
    /// Let the classifier suggest a count
    #[default]
    Auto,
    Fixed(u8),
}

impl TurnSetting {
    /// A fixed turn count, clamped to `[MIN_TURNS, MAX_TURNS]`.
    pub fn fixed(n: i64) -> Self {
        Self::Fixed(clamp_turns(n))
    }

    pub fn fixed_value(&self) -> Option<u8> {
        match self {
            Self::Auto => None,
            Self::Fixed(n) => Some(*n),
        }
    }
}

/// Clamp any requested turn count into the supported range.
pub fn clamp_turns(n: i64) -> u8 {
    n.clamp(i64::from(MIN_TURNS), i64::from(MAX_TURNS)) as u8
}

impl std::str::FromStr for TurnSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<i64>()
            .map(Self::fixed)
            .map_err(|_| format!("expected 'auto' or a number, got '{s}'"))
    }
}

impl std::fmt::Display for TurnSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExplicitAgent {
    id: AgentId,
    label: String,
    instruction: InstructionRef,
}

/// Ordered roster: an implicit lead backed by the active instruction,
/// followed by up to [`MAX_EXPLICIT_AGENTS`] explicitly added agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoster {
    lead_instruction: Option<InstructionRef>,
    lead_label: String,
    agents: Vec<ExplicitAgent>,
    next_id: u32,
    turns: TurnSetting,
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self {
            lead_instruction: None,
            lead_label: LEAD_LABEL.to_string(),
            agents: Vec::new(),
            next_id: 1,
            turns: TurnSetting::Auto,
        }
    }
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lead(mut self, instruction: impl Into<InstructionRef>) -> Self {
        self.lead_instruction = Some(instruction.into());
        self
    }

    /// Lead (when an instruction is active) followed by explicit agents.
    ///
    /// Colours come from the position in this combined list, so the lead
    /// always takes the first palette colour.
    pub fn full_roster(&self) -> Vec<Agent> {
        let lead = self.lead_instruction.as_ref().map(|instruction| {
            (AgentId::lead(), self.lead_label.clone(), instruction.clone())
        });
        let explicit = self
            .agents
            .iter()
            .map(|a| (a.id.clone(), a.label.clone(), a.instruction.clone()));

        lead.into_iter()
            .chain(explicit)
            .enumerate()
            .map(|(position, (id, label, instruction))| Agent {
                id,
                label,
                color: AgentColor::for_position(position),
                instruction,
                position,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        usize::from(self.lead_instruction.is_some()) + self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether delegation can run: at least two participants.
    pub fn engages(&self) -> bool {
        self.len() >= 2
    }

    pub fn explicit_count(&self) -> usize {
        self.agents.len()
    }

    pub fn add_agent(
        &mut self,
        label: impl Into<String>,
        instruction: impl Into<InstructionRef>,
    ) -> Result<AgentId, RosterError> {
        if self.agents.len() >= MAX_EXPLICIT_AGENTS {
            return Err(RosterError::CapacityExceeded {
                max: MAX_EXPLICIT_AGENTS,
            });
        }
        let id = AgentId::explicit(self.next_id);
        self.next_id += 1;
        self.agents.push(ExplicitAgent {
            id: id.clone(),
            label: normalize_label(label.into()),
            instruction: instruction.into(),
        });
        Ok(id)
    }

    pub fn remove_agent(&mut self, id: &AgentId) -> Result<(), RosterError> {
        if id.is_lead() {
            return Err(RosterError::LeadNotRemovable);
        }
        let index = self.index_of(id)?;
        self.agents.remove(index);
        Ok(())
    }

    pub fn rename_agent(&mut self, id: &AgentId, label: impl Into<String>) -> Result<(), RosterError> {
        let label = normalize_label(label.into());
        if id.is_lead() {
            self.lead_label = label;
            return Ok(());
        }
        let index = self.index_of(id)?;
        self.agents[index].label = label;
        Ok(())
    }

    /// Point an agent at another instruction. For the lead this changes
    /// the active instruction.
    pub fn set_agent_instruction(
        &mut self,
        id: &AgentId,
        instruction: impl Into<InstructionRef>,
    ) -> Result<(), RosterError> {
        if id.is_lead() {
            self.lead_instruction = Some(instruction.into());
            return Ok(());
        }
        let index = self.index_of(id)?;
        self.agents[index].instruction = instruction.into();
        Ok(())
    }

    pub fn set_lead_instruction(&mut self, instruction: Option<InstructionRef>) {
        self.lead_instruction = instruction;
    }

    pub fn lead_instruction(&self) -> Option<&InstructionRef> {
        self.lead_instruction.as_ref()
    }

    pub fn configured_turns(&self) -> TurnSetting {
        self.turns
    }

    pub fn set_turns(&mut self, turns: TurnSetting) {
        self.turns = match turns {
            TurnSetting::Fixed(n) => TurnSetting::fixed(i64::from(n)),
            auto => auto,
        };
    }

    fn index_of(&self, id: &AgentId) -> Result<usize, RosterError> {
        self.agents
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| RosterError::UnknownAgent(id.clone()))
    }
}

fn normalize_label(label: String) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        DEFAULT_AGENT_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}
