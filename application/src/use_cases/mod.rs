//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod ask;
pub mod classify_request;
pub mod coordinator;
pub mod direct_edit;
pub mod reconcile;
pub mod run_collaboration;
pub(crate) mod shared;
