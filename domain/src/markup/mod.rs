//! Markup tree, fragment parser and tag scanner.
//!
//! - [`node`] - [`Node`]/[`Element`] tree and [`Attributes`]
//! - [`parser`] - recursive-descent fragment parser and renderer
//! - [`scan`] - finds tagged blocks inside free-text model replies

pub mod node;
pub mod parser;
pub mod scan;

pub use node::{Attributes, Element, Node, text_of};
pub use parser::{parse_fragment, render, render_element};
pub use scan::{TagBlock, scan_blocks};
