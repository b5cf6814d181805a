//! Percentage-rollout rule construction.
//!
//! Pure data transformation: given validated rule parameters, produce the
//! canonical [`Rule`] both patch strategies consume. No I/O here; the
//! caller validates percentages and the endpoint pattern first.

use crate::api::types::{Clause, ClauseOp, Rollout, RolloutWeight, Rule, VariationRef};

/// Attribute the generated clause matches against.
pub const ENDPOINT_ATTRIBUTE: &str = "endpoint_pattern";

/// Validated inputs for a rollout rule.
///
/// `percentages` must sum to 100 and `endpoint_pattern` must already
/// match the method+path format (see [`crate::validate`]).
#[derive(Debug, Clone)]
pub struct RolloutRuleSpec<'a> {
    pub name: &'a str,
    pub endpoint_pattern: &'a str,
    pub percentages: [u32; 2],
    pub bucket_by: &'a str,
    pub context_kind: &'a str,
    pub track_events: bool,
}

/// Build a rollout rule from validated parameters.
///
/// The rule carries exactly one clause (endpoint pattern match) and a
/// two-way rollout whose weights are the percentages converted to
/// per-mille (`p * 1000`, integers only, so no rounding occurs).
///
/// Weights reference the first two `variation_refs` when at least two
/// are supplied; otherwise they fall back to positional indices 0 and 1.
/// The fallback covers flag documents that omit stable variation ids.
#[must_use]
pub fn build_rollout_rule(spec: &RolloutRuleSpec<'_>, variation_refs: &[VariationRef]) -> Rule {
    let clause = Clause {
        attribute: ENDPOINT_ATTRIBUTE.to_string(),
        op: ClauseOp::Matches,
        values: vec![spec.endpoint_pattern.to_string()],
        negate: false,
        context_kind: spec.context_kind.to_string(),
        extra: serde_json::Map::new(),
    };

    let refs: [VariationRef; 2] = if variation_refs.len() >= 2 {
        [variation_refs[0].clone(), variation_refs[1].clone()]
    } else {
        [VariationRef::ByIndex(0), VariationRef::ByIndex(1)]
    };

    let weights = refs
        .into_iter()
        .zip(spec.percentages)
        .map(|(variation, percentage)| RolloutWeight {
            variation,
            weight: percentage * 1000,
        })
        .collect();

    Rule {
        id: None,
        description: spec.name.to_string(),
        track_events: spec.track_events,
        clauses: vec![clause],
        rollout: Some(Rollout {
            bucket_by: spec.bucket_by.to_string(),
            context_kind: spec.context_kind.to_string(),
            weights,
            extra: serde_json::Map::new(),
        }),
        variation: None,
        extra: serde_json::Map::new(),
    }
}
