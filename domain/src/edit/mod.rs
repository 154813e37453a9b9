//! Per-turn edit directives: the `<edits>` grammar agents reply with,
//! and sequential application of the parsed directives to a document.

pub mod applier;
pub mod directive;
pub mod parser;

pub use applier::{ApplyReport, ApplyWarning, apply_directives};
pub use directive::{EditAction, EditDirective, summarize};
pub use parser::{DirectiveIssue, DirectiveWarning, ParsedDirectives, parse_directives};
