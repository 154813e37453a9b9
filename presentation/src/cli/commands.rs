//! CLI command definitions

use clap::Parser;
use cowrite_domain::TurnSetting;
use std::path::PathBuf;

/// `LABEL=INSTRUCTION_ID` from `--agent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub label: String,
    pub instruction: String,
}

impl std::str::FromStr for AgentSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, instruction) = s
            .split_once('=')
            .ok_or_else(|| format!("expected LABEL=INSTRUCTION_ID, got '{s}'"))?;
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(format!("missing instruction id in '{s}'"));
        }
        Ok(Self {
            label: label.trim().to_string(),
            instruction: instruction.to_string(),
        })
    }
}

/// CLI arguments for cowrite
#[derive(Parser, Debug)]
#[command(name = "cowrite")]
#[command(author, version, about = "Several agents take turns editing one shared document")]
#[command(long_about = r#"
cowrite lets you talk to a generative text service while several agents
take turns editing one shared HTML document.

Each request is classified first:
  direct    one reply, turned into a change script for review
  delegate  every agent takes its turn (in roster order, for N turns),
            editing a private working copy; the difference to the original
            is then reconciled into one change script for review

With fewer than two participants, requests get a plain reply.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./cowrite.toml      Project-level config
3. ~/.config/cowrite/config.toml   Global config

Example:
  cowrite --document notes.html --agent Critic=critic "Tighten the introduction"
  cowrite --chat --document notes.html --turns 3
"#)]
pub struct Cli {
    /// The message to send (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// HTML document to collaborate on
    #[arg(short, long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Add an agent (can be specified multiple times, up to 3)
    #[arg(short, long, value_name = "LABEL=INSTRUCTION_ID")]
    pub agent: Vec<AgentSpec>,

    /// Turns per delegated request: a number from 1 to 10, or "auto"
    #[arg(short, long, value_name = "N|auto")]
    pub turns: Option<TurnSetting>,

    /// Streaming chat endpoint (overrides [service] endpoint)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for log files (overrides [logging] dir)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_agents_and_turns() {
        let cli = Cli::try_parse_from([
            "cowrite",
            "--agent",
            "Critic=critic",
            "-a",
            " Fact Checker = facts",
            "--turns",
            "42",
            "improve it",
        ])
        .unwrap();
        assert_eq!(cli.message.as_deref(), Some("improve it"));
        assert_eq!(cli.agent.len(), 2);
        assert_eq!(cli.agent[1].label, "Fact Checker");
        assert_eq!(cli.agent[1].instruction, "facts");
        assert_eq!(cli.turns, Some(TurnSetting::Fixed(10)));
    }

    #[test]
    fn test_rejects_malformed_agent() {
        assert!(Cli::try_parse_from(["cowrite", "--agent", "Critic"]).is_err());
        assert!(Cli::try_parse_from(["cowrite", "--agent", "Critic="]).is_err());
    }

    #[test]
    fn test_turns_auto_and_verbosity() {
        let cli = Cli::try_parse_from(["cowrite", "--chat", "--turns", "auto", "-vv"]).unwrap();
        assert!(cli.chat);
        assert_eq!(cli.turns, Some(TurnSetting::Auto));
        assert_eq!(cli.verbose, 2);
    }
}
