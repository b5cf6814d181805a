//! Rollout rule construction and update strategies.

pub mod builder;
pub mod patch;

pub use builder::{build_rollout_rule, RolloutRuleSpec};
pub use patch::{apply_rule, PatchStrategy};
