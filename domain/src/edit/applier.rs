//! Sequential application of edit directives to a working document.
//!
//! Directives are applied in order. A directive whose target or anchor
//! cannot be found is skipped with a warning, as is one anchored on an id
//! that an earlier directive of the same batch introduced: anchors must
//! already exist when the batch starts.

use super::directive::{EditAction, EditDirective};
use crate::document::{Document, ElementId, ID_ATTR};
use crate::markup::{Element, Node, parse_fragment};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a parsed directive was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyWarning {
    #[error("{action}: no element with id '{id}' in the working document")]
    MissingAnchor { action: EditAction, id: ElementId },

    #[error("{action}: '{id}' was introduced earlier in the same batch")]
    ForwardReference { action: EditAction, id: ElementId },

    #[error("add after/before '{id}' carries no content")]
    EmptyPayload { id: ElementId },
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Directives that changed the document, in application order
    pub applied: Vec<EditDirective>,
    pub warnings: Vec<ApplyWarning>,
    /// Ids that did not exist before the batch
    pub introduced: Vec<ElementId>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Apply directives to `doc` in order.
pub fn apply_directives(doc: &mut Document, directives: &[EditDirective]) -> ApplyReport {
    let mut report = ApplyReport::default();
    let mut introduced: HashSet<ElementId> = HashSet::new();

    for directive in directives {
        let id = directive.anchor_id();
        if introduced.contains(id) {
            let warning = ApplyWarning::ForwardReference {
                action: directive.action(),
                id: id.clone(),
            };
            warn!(%warning, "Skipping directive");
            report.warnings.push(warning);
            continue;
        }

        let before: HashSet<ElementId> = doc.ids().into_iter().collect();
        match apply_one(doc, directive) {
            Ok(()) => {
                for new_id in doc.ids() {
                    if !before.contains(&new_id) && introduced.insert(new_id.clone()) {
                        report.introduced.push(new_id);
                    }
                }
                debug!(action = %directive.action(), id = %id, "Applied directive");
                report.applied.push(directive.clone());
            }
            Err(warning) => {
                warn!(%warning, "Skipping directive");
                report.warnings.push(warning);
            }
        }
    }

    report
}

fn apply_one(doc: &mut Document, directive: &EditDirective) -> Result<(), ApplyWarning> {
    let missing = || ApplyWarning::MissingAnchor {
        action: directive.action(),
        id: directive.anchor_id().clone(),
    };

    match directive {
        EditDirective::Modify { target, payload } => {
            let existing = doc.find(target).ok_or_else(missing)?;
            let mut replacement = build_replacement(existing, payload);
            replacement.attrs.set(ID_ATTR, target.as_str());
            doc.stamp_replacement(target, &mut replacement.children);
            doc.replace_element(target, replacement);
            Ok(())
        }
        EditDirective::Delete { target } => doc.remove_element(target).map(|_| ()).ok_or_else(missing),
        EditDirective::Add {
            anchor,
            position,
            payload,
        } => {
            if !doc.contains(anchor) {
                return Err(missing());
            }
            let mut nodes = trim_blank_edges(parse_fragment(payload));
            if nodes.is_empty() {
                return Err(ApplyWarning::EmptyPayload { id: anchor.clone() });
            }
            doc.stamp_new_nodes(&mut nodes);
            doc.insert_relative(anchor, *position, nodes);
            Ok(())
        }
    }
}

/// The element that replaces `existing` for a modify payload.
///
/// A payload that is a single element replaces the target outright; any
/// other payload (text, several nodes) becomes the new content of an
/// element shaped like the target.
fn build_replacement(existing: &Element, payload: &str) -> Element {
    let nodes = trim_blank_edges(parse_fragment(payload));
    if let [Node::Element(single)] = nodes.as_slice() {
        return single.clone();
    }
    Element {
        tag: existing.tag.clone(),
        attrs: existing.attrs.clone(),
        children: nodes,
    }
}

fn trim_blank_edges(mut nodes: Vec<Node>) -> Vec<Node> {
    while nodes.last().is_some_and(Node::is_blank_text) {
        nodes.pop();
    }
    let leading = nodes.iter().take_while(|n| n.is_blank_text()).count();
    nodes.drain(..leading);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;

    fn doc() -> Document {
        Document::from_html(
            "Plan",
            r#"<h1 data-id="el-1">Plan</h1><p data-id="el-2">Draft intro</p><p data-id="el-3">Body</p>"#,
        )
    }

    fn modify(target: &str, payload: &str) -> EditDirective {
        EditDirective::Modify {
            target: target.into(),
            payload: payload.into(),
        }
    }

    #[test]
    fn test_modify_preserves_id() {
        let mut doc = doc();
        let report = apply_directives(&mut doc, &[modify("el-2", "<p>Better intro</p>")]);
        assert_eq!(report.applied_count(), 1);
        let el = doc.find(&"el-2".into()).unwrap();
        assert_eq!(el.text_content(), "Better intro");
        assert_eq!(el.attrs.get(ID_ATTR), Some("el-2"));
    }

    #[test]
    fn test_modify_ignores_payload_id() {
        let mut doc = doc();
        apply_directives(&mut doc, &[modify("el-2", r#"<p data-id="el-3">Clash</p>"#)]);
        assert_eq!(doc.find(&"el-2".into()).unwrap().text_content(), "Clash");
        assert_eq!(doc.find(&"el-3".into()).unwrap().text_content(), "Body");
    }

    #[test]
    fn test_modify_text_payload_keeps_target_shape() {
        let mut doc = doc();
        apply_directives(&mut doc, &[modify("el-1", "Roadmap <em>2025</em>")]);
        let el = doc.find(&"el-1".into()).unwrap();
        assert_eq!(el.tag, "h1");
        assert_eq!(el.text_content(), "Roadmap 2025");
    }

    #[test]
    fn test_second_modify_depends_only_on_second_payload() {
        let mut twice = doc();
        apply_directives(&mut twice, &[modify("el-2", "<div><p>First</p><p>pass</p></div>")]);
        apply_directives(&mut twice, &[modify("el-2", "<p>Final</p>")]);

        let mut once = doc();
        apply_directives(&mut once, &[modify("el-2", "<p>Final</p>")]);

        assert_eq!(twice, once);
    }

    #[test]
    fn test_delete_then_reference_is_skipped() {
        let mut doc = doc();
        let report = apply_directives(
            &mut doc,
            &[
                EditDirective::Delete {
                    target: "el-2".into(),
                },
                modify("el-2", "<p>gone</p>"),
                EditDirective::Add {
                    anchor: "el-2".into(),
                    position: Position::After,
                    payload: "<p>x</p>".into(),
                },
            ],
        );
        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(
            report.warnings[0],
            ApplyWarning::MissingAnchor {
                action: EditAction::Modify,
                ..
            }
        ));
    }

    #[test]
    fn test_add_assigns_fresh_ids_and_rejects_forward_reference() {
        let mut doc = doc();
        let report = apply_directives(
            &mut doc,
            &[
                EditDirective::Add {
                    anchor: "el-3".into(),
                    position: Position::After,
                    payload: "<p>Conclusion</p>\n<ul><li>Next</li></ul>".into(),
                },
                EditDirective::Add {
                    anchor: "el-4".into(),
                    position: Position::After,
                    payload: "<p>Chained</p>".into(),
                },
            ],
        );
        assert_eq!(report.applied_count(), 1);
        let introduced: Vec<String> = report.introduced.iter().map(|i| i.to_string()).collect();
        assert_eq!(introduced, vec!["el-4", "el-5", "el-6"]);
        assert_eq!(
            report.warnings,
            vec![ApplyWarning::ForwardReference {
                action: EditAction::Add,
                id: "el-4".into()
            }]
        );
        assert!(!doc.to_html().contains("Chained"));
    }

    #[test]
    fn test_add_with_missing_anchor_does_not_stop_batch() {
        let mut doc = doc();
        let report = apply_directives(
            &mut doc,
            &[
                EditDirective::Add {
                    anchor: "el-42".into(),
                    position: Position::Before,
                    payload: "<p>lost</p>".into(),
                },
                modify("el-3", "<p>Tighter body</p>"),
            ],
        );
        assert_eq!(report.applied_count(), 1);
        assert_eq!(doc.find(&"el-3".into()).unwrap().text_content(), "Tighter body");
    }

    #[test]
    fn test_add_empty_payload_is_skipped() {
        let mut doc = doc();
        let report = apply_directives(
            &mut doc,
            &[EditDirective::Add {
                anchor: "el-1".into(),
                position: Position::After,
                payload: "  \n ".into(),
            }],
        );
        assert!(report.applied.is_empty());
        assert_eq!(
            report.warnings,
            vec![ApplyWarning::EmptyPayload { id: "el-1".into() }]
        );
    }

    #[test]
    fn test_payload_with_largest_sequence_id_still_applies() {
        let mut doc = doc();
        let report = apply_directives(
            &mut doc,
            &[
                EditDirective::Add {
                    anchor: "el-1".into(),
                    position: Position::After,
                    payload: format!(r#"<p data-id="el-{}">x</p><p>y</p>"#, u64::MAX),
                },
                modify("el-3", &format!(r#"<div><p data-id="el-{}">z</p></div>"#, u64::MAX)),
            ],
        );
        assert_eq!(report.applied_count(), 2);

        let ids: Vec<String> = doc.ids().iter().map(|i| i.to_string()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        let html = doc.to_html();
        assert!(html.contains(">x<") && html.contains(">y<") && html.contains(">z<"));
    }
}
