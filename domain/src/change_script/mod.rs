//! Change scripts: the `<changes>` grammar shared with the review
//! collaborator. Rendering is byte-exact because the reviewer matches
//! entries against the text it receives.

pub mod entities;
pub mod parser;

pub use entities::{
    AnchorRef, ChangeAnchor, ChangeEntry, ChangeScript, StructuralPattern, StyleName, StyleOp,
};
pub use parser::{ChangeIssue, ChangeWarning, ParsedChangeScript, parse_change_script};
