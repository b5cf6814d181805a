//! Command implementations.

pub mod add_rule;
pub mod completions;
pub mod environments;
pub mod get;
pub mod status;
pub mod version;
