//! Multi-agent collaboration domain.
//!
//! - [`agent`] - agent identity, colours and the instruction library
//! - [`roster`] - the ordered roster and configured turn count
//! - [`decision`] - direct/delegate classification
//! - [`session`] - original/working snapshots and the contribution log

pub mod agent;
pub mod decision;
pub mod roster;
pub mod session;

pub use agent::{Agent, AgentColor, AgentId, InstructionLibrary, InstructionRef, SystemInstruction};
pub use decision::{Action, Decision, parse_decision, resolve_turns};
pub use roster::{AgentRoster, MAX_EXPLICIT_AGENTS, MAX_TURNS, MIN_TURNS, RosterError, TurnSetting, clamp_turns};
pub use session::{CollaborationSession, ContributionEntry, PendingEdit, SessionSummary};
