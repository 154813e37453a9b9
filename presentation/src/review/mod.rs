//! Change review output

pub mod console;
