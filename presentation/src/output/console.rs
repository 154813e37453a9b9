//! Console output formatting for change scripts, rosters and documents

use colored::{Color, Colorize};
use cowrite_domain::{
    Agent, AgentColor, ChangeAnchor, ChangeEntry, ChangeScript, Document, InstructionLibrary,
    StyleOp, TurnSetting,
};

const PREVIEW_CHARS: usize = 80;

/// Formats collaboration output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One line per entry, under a header naming the contributors.
    pub fn format_change_script(script: &ChangeScript) -> String {
        let mut output = String::new();
        let title = match &script.attribution {
            Some(by) => format!("Proposed changes by {by}"),
            None => "Proposed changes".to_string(),
        };
        output.push_str(&Self::header(&title));
        output.push('\n');

        for (i, entry) in script.entries.iter().enumerate() {
            output.push_str(&format!("{:>3}. {}\n", i + 1, Self::format_entry(entry)));
        }
        output.push_str(&format!(
            "{}\n",
            format!("{} change(s) awaiting review", script.len()).dimmed()
        ));
        output
    }

    pub fn format_entry(entry: &ChangeEntry) -> String {
        match entry {
            ChangeEntry::Add { anchor, content } => format!(
                "{} {} {}",
                "add".green().bold(),
                Self::anchor(anchor),
                Self::preview(content)
            ),
            ChangeEntry::Delete { target, content } => format!(
                "{} {} {}",
                "delete".red().bold(),
                target.as_ref().map_or("(by content)", |t| t.as_str()),
                Self::preview(content).strikethrough()
            ),
            ChangeEntry::Modify {
                target,
                original,
                new,
            } => format!(
                "{} {} {} {} {}",
                "modify".yellow().bold(),
                target.as_ref().map_or("(by content)", |t| t.as_str()),
                Self::preview(original).dimmed(),
                "->".yellow(),
                Self::preview(new)
            ),
            ChangeEntry::Format { target, text, ops } => {
                let ops: Vec<String> = ops
                    .iter()
                    .map(|op| match op {
                        StyleOp::Apply(style) => format!("+{}", style.as_str()),
                        StyleOp::Remove(style) => format!("-{}", style.as_str()),
                    })
                    .collect();
                let scope = text
                    .as_deref()
                    .map(|t| format!(" \"{}\"", Self::preview(t)))
                    .unwrap_or_default();
                format!(
                    "{} {}{} [{}]",
                    "format".cyan().bold(),
                    target,
                    scope,
                    ops.join(" ")
                )
            }
            ChangeEntry::AddSequence { anchor, items } => format!(
                "{} {} {} item(s)",
                "add-sequence".green().bold(),
                Self::anchor(anchor),
                items.len()
            ),
            ChangeEntry::DeletePattern { pattern } => {
                format!("{} {}", "delete-pattern".red().bold(), pattern.as_str())
            }
        }
    }

    /// Roster listing for `/agents`.
    pub fn format_roster(agents: &[Agent], library: &InstructionLibrary, turns: TurnSetting) -> String {
        let mut output = String::new();
        if agents.is_empty() {
            output.push_str("No agents. Add one with /add <label> <instruction-id>.\n");
        }
        for agent in agents {
            let instruction = library
                .get(&agent.instruction)
                .map_or("(unknown instruction)", |i| i.name.as_str());
            let role = if agent.is_lead() { " (lead)" } else { "" };
            output.push_str(&format!(
                "  {} {}{} {} {}\n",
                Self::agent_label(agent),
                agent.id.as_str().dimmed(),
                role.dimmed(),
                "->".dimmed(),
                instruction
            ));
        }
        let status = if agents.len() >= 2 {
            "collaboration engaged".green()
        } else {
            "collaboration needs at least two participants".yellow()
        };
        output.push_str(&format!("  turns: {turns}, {status}\n"));
        output
    }

    pub fn format_instructions(library: &InstructionLibrary) -> String {
        library
            .iter()
            .map(|i| format!("  {} {}\n", i.id.as_str().bold(), i.name.dimmed()))
            .collect()
    }

    pub fn format_document(document: &Document) -> String {
        format!(
            "{}\n{}\n",
            Self::header(document.title()),
            document.to_html()
        )
    }

    /// The agent's label in its palette colour.
    pub fn agent_label(agent: &Agent) -> String {
        agent
            .label
            .color(Self::terminal_color(agent.color))
            .bold()
            .to_string()
    }

    pub fn terminal_color(color: AgentColor) -> Color {
        match color {
            AgentColor::Blue => Color::Blue,
            AgentColor::Green => Color::Green,
            AgentColor::Amber => Color::Yellow,
            AgentColor::Purple => Color::Magenta,
        }
    }

    fn anchor(anchor: &ChangeAnchor) -> String {
        let (side, value) = match anchor {
            ChangeAnchor::Before(_) => ("before", anchor.value()),
            ChangeAnchor::After(_) => ("after", anchor.value()),
        };
        match anchor.id() {
            Some(_) => format!("{side} {value}"),
            None => format!("{side} \"{}\"", Self::preview(value)),
        }
    }

    fn preview(text: &str) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() > PREVIEW_CHARS {
            let head: String = flat.chars().take(PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            flat
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowrite_domain::{AgentRoster, ElementId, StructuralPattern, SystemInstruction};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_change_script_lists_entries() {
        plain();
        let script = ChangeScript::new(vec![
            ChangeEntry::Modify {
                target: Some(ElementId::new("el-2")),
                original: "Draft intro".into(),
                new: "Sharp intro".into(),
            },
            ChangeEntry::DeletePattern {
                pattern: StructuralPattern::EmptyParagraphs,
            },
        ])
        .with_attribution(&["Lead", "Critic"]);

        let text = ConsoleFormatter::format_change_script(&script);
        assert!(text.contains("Proposed changes by Lead & Critic"));
        assert!(text.contains("1. modify el-2 Draft intro -> Sharp intro"));
        assert!(text.contains("2. delete-pattern empty-paragraphs"));
        assert!(text.contains("2 change(s) awaiting review"));
    }

    #[test]
    fn test_roster_listing() {
        plain();
        let mut roster = AgentRoster::new().with_lead("default");
        roster.add_agent("Critic", "missing").unwrap();
        let library = InstructionLibrary::new(vec![SystemInstruction::new("default", "Default", "x")]);

        let text = ConsoleFormatter::format_roster(&roster.full_roster(), &library, TurnSetting::Fixed(2));
        assert!(text.contains("Lead lead (lead) -> Default"));
        assert!(text.contains("Critic agent-1 -> (unknown instruction)"));
        assert!(text.contains("turns: 2, collaboration engaged"));
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(ConsoleFormatter::preview("a\n  b"), "a b");
        let long = "x".repeat(100);
        assert_eq!(ConsoleFormatter::preview(&long).len(), PREVIEW_CHARS + 3);
    }
}
