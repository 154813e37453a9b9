//! Prompt templates for classification, agent turns, direct edits and
//! reconciliation.

use crate::collaboration::Agent;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the direct/delegate classifier
    pub fn classification_system() -> &'static str {
        r#"You route requests for a collaborative writing assistant.
Decide whether the user's request can be answered with a single reply or needs several agents to discuss it.

- "direct": the request only reformats, restructures or summarizes material that already exists in the conversation or document.
- "delegate": the request needs new ideas, research, critique or several perspectives.

Reply with a single JSON object and nothing else:
{"action": "direct" | "delegate", "turns": <number of discussion rounds, 1-10, optional>, "task": "<the request restated as a task for the agents>"}"#
    }

    /// User prompt for classification
    pub fn classification_prompt(message: &str) -> String {
        format!(
            r#"Classify the following request:

{}"#,
            message
        )
    }

    /// Framing appended to an agent's own instruction for one turn.
    pub fn collaboration_framing(
        agent: &Agent,
        roster: &[Agent],
        turn: u8,
        total_turns: u8,
        task: &str,
    ) -> String {
        let others: Vec<&str> = roster
            .iter()
            .filter(|a| a.id != agent.id)
            .map(|a| a.label.as_str())
            .collect();
        let others = if others.is_empty() {
            "no one else".to_string()
        } else {
            others.join(", ")
        };

        format!(
            r#"You are {label}, one of several agents editing a shared document together.
Also present: {others}.
This is turn {turn} of {total_turns}. Agents speak in a fixed order and each sees the document as the previous agent left it.

Shared task: {task}

The current document is attached as HTML. Every block element carries a data-id attribute.
Discuss briefly, then propose your edits in a single block:

<edits>
  <edit action="modify" target="el-2"><p>Replacement content</p></edit>
  <edit action="delete" target="el-5"></edit>
  <edit action="add" after="el-3"><p>New content</p></edit>
</edits>

Rules:
- "modify" and "delete" need target; "add" needs exactly one of after or before.
- Only use ids that exist in the attached document. Elements you add in this reply get new ids later, so never use them as anchors in the same reply.
- Leave the block out if you have no edits."#,
            label = agent.label,
        )
    }

    /// System prompt for a single-reply edit
    pub fn direct_edit_system() -> String {
        format!(
            r#"You edit a shared document on the user's behalf.
The current document is attached as HTML; block elements carry a data-id attribute.
Answer briefly, then express every change as one change script:

{}"#,
            Self::change_script_grammar()
        )
    }

    /// System prompt for reconciliation
    pub fn reconciliation_system() -> String {
        format!(
            r#"Several agents have edited a working copy of a document. Turn the difference between the ORIGINAL and the FINAL document into one change script the user can review.

Requirements:
1. Anchor ids (targetId, insertAfter-id, insertBefore-id) must come from the ORIGINAL document only. Content that exists only in the FINAL document has no usable id.
2. Output exactly one <changes> block and nothing else.

{}"#,
            Self::change_script_grammar()
        )
    }

    /// User prompt for reconciliation
    pub fn reconciliation_prompt(original_html: &str, working_html: &str) -> String {
        format!(
            r#"ORIGINAL document:
{}

FINAL document:
{}"#,
            original_html, working_html
        )
    }

    fn change_script_grammar() -> &'static str {
        r#"<changes>
<add insertAfter-id="el-3">NEW CONTENT</add>
<add insertBefore="literal text">NEW CONTENT</add>
<delete targetId="el-4">CONTENT TO REMOVE</delete>
<modify targetId="el-5"><original>OLD</original><new>NEW</new></modify>
<format targetId="el-6" text="substring"><style>bold</style><remove>italic</remove></format>
<add-sequence insertAfter-id="el-7"><item>A</item><item>B</item></add-sequence>
<delete-pattern pattern="empty-paragraphs"/>
</changes>

Styles: bold, italic, underline, strikethrough, code, heading1, heading2, heading3, paragraph, quote, bullet-list, numbered-list.
Patterns: empty-paragraphs, duplicate-breaks, trailing-breaks."#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaboration::AgentRoster;

    #[test]
    fn test_framing_names_other_agents() {
        let mut roster = AgentRoster::new().with_lead("default");
        roster.add_agent("Critic", "critic").unwrap();
        let agents = roster.full_roster();

        let framing = PromptTemplate::collaboration_framing(&agents[1], &agents, 2, 3, "Tighten the intro");
        assert!(framing.contains("You are Critic"));
        assert!(framing.contains("Also present: Lead."));
        assert!(framing.contains("turn 2 of 3"));
        assert!(framing.contains("Tighten the intro"));
    }

    #[test]
    fn test_reconciliation_prompt_carries_both_documents() {
        let prompt = PromptTemplate::reconciliation_prompt("<p>a</p>", "<p>b</p>");
        assert!(prompt.contains("ORIGINAL document:\n<p>a</p>"));
        assert!(prompt.contains("FINAL document:\n<p>b</p>"));
        assert!(PromptTemplate::reconciliation_system().contains("<changes>"));
    }
}
