//! Domain layer for cowrite
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Documents and anchors
//!
//! A [`Document`] is an HTML fragment tree in which every block element
//! carries a stable anchor id (`data-id="el-<n>"`). Agents and reviewers
//! address content by these ids.
//!
//! ## Collaboration
//!
//! - **Roster**: an implicit lead plus up to three explicit agents
//! - **Waypoint**: one agent's `<edits>` folded into the session's working copy
//! - **Reconciliation**: the drift between original and working copy,
//!   expressed as one [`ChangeScript`] for the user to review

pub mod change_script;
pub mod collaboration;
pub mod core;
pub mod document;
pub mod edit;
pub mod markup;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use change_script::{
    AnchorRef, ChangeAnchor, ChangeEntry, ChangeIssue, ChangeScript, ChangeWarning,
    ParsedChangeScript, StructuralPattern, StyleName, StyleOp, parse_change_script,
};
pub use collaboration::{
    Action, Agent, AgentColor, AgentId, AgentRoster, CollaborationSession, ContributionEntry,
    Decision, InstructionLibrary, InstructionRef, MAX_EXPLICIT_AGENTS, MAX_TURNS, MIN_TURNS,
    PendingEdit, RosterError, SessionSummary, SystemInstruction, TurnSetting, clamp_turns,
    parse_decision, resolve_turns,
};
pub use core::error::DomainError;
pub use document::{Document, ElementId, ID_ATTR, Position};
pub use edit::{
    ApplyReport, ApplyWarning, DirectiveIssue, DirectiveWarning, EditAction, EditDirective,
    ParsedDirectives, apply_directives, parse_directives, summarize,
};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Attachment, ChatMessage, GenerationRequest, HistoryMessage, Role},
    stream::StreamEvent,
};
