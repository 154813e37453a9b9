//! Document domain.
//!
//! - [`entities::Document`] - title plus content tree with stable anchor ids
//! - [`value_objects::ElementId`] - the anchor id carried in `data-id`
//! - [`value_objects::Position`] - before/after placement relative to an anchor

pub mod entities;
pub mod value_objects;

pub use entities::Document;
pub use value_objects::{ElementId, ID_ATTR, Position, is_addressable};
