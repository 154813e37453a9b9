//! REPL (Read-Eval-Print Loop) for interactive collaboration

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use colored::Colorize;
use cowrite_application::ports::document_store::DocumentStore;
use cowrite_application::ports::progress::CollaborationProgress;
use cowrite_application::{CollaborationCoordinator, InterceptOutcome, LlmGateway};
use cowrite_domain::{AgentId, InstructionRef, TurnSetting};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    Agents,
    Add { label: String, instruction: String },
    Remove(AgentId),
    Rename { id: AgentId, label: String },
    Use { id: AgentId, instruction: String },
    Turns(TurnSetting),
    Document,
    Instructions,
}

impl ReplCommand {
    /// Parse a line starting with `/`.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        match name {
            "/quit" | "/exit" | "/q" => Ok(Self::Quit),
            "/help" | "/h" | "/?" => Ok(Self::Help),
            "/agents" => Ok(Self::Agents),
            "/doc" => Ok(Self::Document),
            "/instructions" => Ok(Self::Instructions),
            "/add" => {
                // The last word is the instruction id, everything before it the label
                let (label, instruction) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or("Usage: /add <label> <instruction-id>")?;
                Ok(Self::Add {
                    label: label.trim().to_string(),
                    instruction: instruction.to_string(),
                })
            }
            "/remove" => {
                if rest.is_empty() {
                    return Err("Usage: /remove <agent-id>".into());
                }
                Ok(Self::Remove(AgentId::new(rest)))
            }
            "/rename" => {
                let (id, label) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("Usage: /rename <agent-id> <label>")?;
                Ok(Self::Rename {
                    id: AgentId::new(id),
                    label: label.trim().to_string(),
                })
            }
            "/use" => {
                let (id, instruction) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("Usage: /use <agent-id> <instruction-id>")?;
                Ok(Self::Use {
                    id: AgentId::new(id),
                    instruction: instruction.trim().to_string(),
                })
            }
            "/turns" => rest
                .parse::<TurnSetting>()
                .map(Self::Turns)
                .map_err(|e| format!("Usage: /turns <1-10|auto> ({e})")),
            _ => Err(format!(
                "Unknown command: {name}\nType /help for available commands"
            )),
        }
    }
}

/// Send one message through the coordinator, falling back to a plain
/// reply when the roster does not engage collaboration.
///
/// Returns `false` when the message failed.
pub async fn send_message<G: LlmGateway + 'static>(
    coordinator: &CollaborationCoordinator<G>,
    message: &str,
    progress: &dyn CollaborationProgress,
    cancel: &CancellationToken,
) -> bool {
    match coordinator.intercept(message, progress, cancel).await {
        Ok(InterceptOutcome::NotEngaged) => {
            let result = coordinator
                .answer(
                    message,
                    |chunk| {
                        print!("{chunk}");
                        let _ = std::io::stdout().flush();
                    },
                    cancel,
                )
                .await;
            println!();
            match result {
                Ok(_) => true,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    false
                }
            }
        }
        Ok(outcome) => {
            debug!(?outcome, "Message handled");
            true
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            false
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl<G: LlmGateway + 'static> {
    coordinator: CollaborationCoordinator<G>,
    document_store: Arc<dyn DocumentStore>,
    show_progress: bool,
}

impl<G: LlmGateway + 'static> ChatRepl<G> {
    pub fn new(
        coordinator: CollaborationCoordinator<G>,
        document_store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            coordinator,
            document_store,
            show_progress: true,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("cowrite").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        match ReplCommand::parse(line) {
                            Ok(ReplCommand::Quit) => {
                                println!("Bye!");
                                break;
                            }
                            Ok(command) => self.handle_command(command).await,
                            Err(message) => println!("{message}"),
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              cowrite - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        self.print_roster();
        println!("Type /help for commands. Ctrl-C cancels a running request.");
        println!();
    }

    fn print_roster(&self) {
        let roster = self.coordinator.roster();
        print!(
            "{}",
            ConsoleFormatter::format_roster(
                &roster.full_roster(),
                self.coordinator.library(),
                roster.configured_turns()
            )
        );
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /agents                       - Show the roster");
        println!("  /add <label> <instruction-id> - Add an agent");
        println!("  /remove <agent-id>            - Remove an agent");
        println!("  /rename <agent-id> <label>    - Rename an agent");
        println!("  /use <agent-id> <instr-id>    - Change an agent's instruction");
        println!("  /turns <1-10|auto>            - Set turns per delegated request");
        println!("  /doc                          - Show the open document");
        println!("  /instructions                 - List system instructions");
        println!("  /help, /h, /?                 - Show this help");
        println!("  /quit, /exit, /q              - Exit chat");
        println!();
    }

    fn known_instruction(&self, instruction: &str) -> Option<InstructionRef> {
        let instruction = InstructionRef::new(instruction);
        if self.coordinator.library().contains(&instruction) {
            Some(instruction)
        } else {
            println!(
                "Unknown instruction: {instruction}\nAvailable:\n{}",
                ConsoleFormatter::format_instructions(self.coordinator.library())
            );
            None
        }
    }

    async fn handle_command(&mut self, command: ReplCommand) {
        let result = match command {
            ReplCommand::Quit => return,
            ReplCommand::Help => {
                self.print_help();
                return;
            }
            ReplCommand::Agents => {
                self.print_roster();
                return;
            }
            ReplCommand::Instructions => {
                print!(
                    "{}",
                    ConsoleFormatter::format_instructions(self.coordinator.library())
                );
                return;
            }
            ReplCommand::Document => {
                match self.document_store.current().await {
                    Ok(Some(document)) => print!("{}", ConsoleFormatter::format_document(&document)),
                    Ok(None) => println!("No document is open."),
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
                return;
            }
            ReplCommand::Add { label, instruction } => {
                let Some(instruction) = self.known_instruction(&instruction) else {
                    return;
                };
                self.coordinator
                    .roster_mut()
                    .add_agent(label, instruction)
                    .map(|id| println!("Added {id}"))
            }
            ReplCommand::Remove(id) => self
                .coordinator
                .roster_mut()
                .remove_agent(&id)
                .map(|_| println!("Removed {id}")),
            ReplCommand::Rename { id, label } => self
                .coordinator
                .roster_mut()
                .rename_agent(&id, label)
                .map(|_| println!("Renamed {id}")),
            ReplCommand::Use { id, instruction } => {
                let Some(instruction) = self.known_instruction(&instruction) else {
                    return;
                };
                self.coordinator
                    .roster_mut()
                    .set_agent_instruction(&id, instruction.clone())
                    .map(|_| println!("{id} now follows '{instruction}'"))
            }
            ReplCommand::Turns(turns) => {
                self.coordinator.roster_mut().set_turns(turns);
                println!("Turns: {}", self.coordinator.roster().configured_turns());
                return;
            }
        };

        match result {
            Ok(()) => self.print_roster(),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    async fn process_message(&self, message: &str) {
        println!();

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let progress: Box<dyn CollaborationProgress> = if self.show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        send_message(&self.coordinator, message, progress.as_ref(), &cancel).await;

        watcher.abort();
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ReplCommand::parse("/q"), Ok(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/help"), Ok(ReplCommand::Help));
        assert_eq!(ReplCommand::parse(" /agents "), Ok(ReplCommand::Agents));
        assert_eq!(ReplCommand::parse("/doc"), Ok(ReplCommand::Document));
        assert!(ReplCommand::parse("/frobnicate").is_err());
    }

    #[test]
    fn test_parse_add_takes_last_word_as_instruction() {
        assert_eq!(
            ReplCommand::parse("/add Fact Checker facts"),
            Ok(ReplCommand::Add {
                label: "Fact Checker".into(),
                instruction: "facts".into(),
            })
        );
        assert!(ReplCommand::parse("/add critic").is_err());
    }

    #[test]
    fn test_parse_agent_commands() {
        assert_eq!(
            ReplCommand::parse("/remove agent-2"),
            Ok(ReplCommand::Remove(AgentId::new("agent-2")))
        );
        assert!(ReplCommand::parse("/remove").is_err());
        assert_eq!(
            ReplCommand::parse("/rename lead Editor in Chief"),
            Ok(ReplCommand::Rename {
                id: AgentId::lead(),
                label: "Editor in Chief".into(),
            })
        );
        assert_eq!(
            ReplCommand::parse("/use agent-1 critic"),
            Ok(ReplCommand::Use {
                id: AgentId::new("agent-1"),
                instruction: "critic".into(),
            })
        );
    }

    #[test]
    fn test_parse_turns() {
        assert_eq!(
            ReplCommand::parse("/turns auto"),
            Ok(ReplCommand::Turns(TurnSetting::Auto))
        );
        assert_eq!(
            ReplCommand::parse("/turns 0"),
            Ok(ReplCommand::Turns(TurnSetting::Fixed(1)))
        );
        assert!(ReplCommand::parse("/turns many").is_err());
    }
}
