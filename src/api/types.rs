//! Typed views of the flag service's JSON documents.
//!
//! The remote API speaks loosely-typed nested JSON. Everything is parsed
//! into these structs once, at the gateway edge; business logic never sees
//! raw maps. Required vs. optional fields are explicit here, with serde
//! defaults covering the fields older flag documents omit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clause operators.
///
/// The service's operator set is open; operators this client does not
/// model pass through [`ClauseOp::Other`] untouched so existing rules
/// always round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClauseOp {
    Matches,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Other(String),
}

impl From<String> for ClauseOp {
    fn from(s: String) -> Self {
        match s.as_str() {
            "matches" => Self::Matches,
            "in" => Self::In,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            _ => Self::Other(s),
        }
    }
}

impl From<ClauseOp> for String {
    fn from(op: ClauseOp) -> Self {
        match op {
            ClauseOp::Matches => "matches".to_string(),
            ClauseOp::In => "in".to_string(),
            ClauseOp::Contains => "contains".to_string(),
            ClauseOp::StartsWith => "startsWith".to_string(),
            ClauseOp::EndsWith => "endsWith".to_string(),
            ClauseOp::Other(s) => s,
        }
    }
}

/// One condition of a targeting rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub attribute: String,
    pub op: ClauseOp,
    pub values: Vec<String>,
    #[serde(default)]
    pub negate: bool,
    #[serde(default = "default_context_kind")]
    pub context_kind: String,
    /// Fields this client does not model (e.g. clause `_id`s),
    /// preserved so a full-list replace round-trips faithfully.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_context_kind() -> String {
    "user".to_string()
}

/// Reference to a flag variation, resolved once when the flag document
/// is read and carried explicitly through weight construction.
///
/// Some flag documents omit stable variation identifiers; those fall
/// back to positional indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariationRef {
    ById(String),
    ByIndex(usize),
}

impl VariationRef {
    /// Key form used by semantic-patch weight mappings.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::ById(id) => id.clone(),
            Self::ByIndex(i) => i.to_string(),
        }
    }
}

/// Wire shape of a rollout weight entry.
///
/// Stable-id refs serialize as `variationId`, positional refs as
/// `variation`. Exactly one of the two is present.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RolloutWeightWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    variation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variation: Option<usize>,
    weight: u32,
}

/// One weighted variation of a percentage rollout.
///
/// `weight` is percentage × 1000 (per-mille precision), in [0, 100000].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RolloutWeightWire", into = "RolloutWeightWire")]
pub struct RolloutWeight {
    pub variation: VariationRef,
    pub weight: u32,
}

impl TryFrom<RolloutWeightWire> for RolloutWeight {
    type Error = String;

    fn try_from(wire: RolloutWeightWire) -> std::result::Result<Self, Self::Error> {
        let variation = match (wire.variation_id, wire.variation) {
            (Some(id), _) => VariationRef::ById(id),
            (None, Some(index)) => VariationRef::ByIndex(index),
            (None, None) => {
                return Err("rollout weight needs a variationId or a variation index".to_string())
            }
        };
        Ok(Self { variation, weight: wire.weight })
    }
}

impl From<RolloutWeight> for RolloutWeightWire {
    fn from(w: RolloutWeight) -> Self {
        match w.variation {
            VariationRef::ById(id) => Self {
                variation_id: Some(id),
                variation: None,
                weight: w.weight,
            },
            VariationRef::ByIndex(index) => Self {
                variation_id: None,
                variation: Some(index),
                weight: w.weight,
            },
        }
    }
}

/// Percentage rollout attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollout {
    #[serde(default = "default_bucket_by")]
    pub bucket_by: String,
    #[serde(default = "default_context_kind")]
    pub context_kind: String,
    #[serde(rename = "variations")]
    pub weights: Vec<RolloutWeight>,
    /// Unmodeled rollout fields (e.g. `seed`), preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_bucket_by() -> String {
    "key".to_string()
}

/// A targeting rule. Value object: constructed fresh per invocation and
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Stable rule id, present on rules read back from the service.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub track_events: bool,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    /// Rollout split; absent when the rule serves a fixed variation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<Rollout>,
    /// Fixed variation index; absent when the rule carries a rollout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<usize>,
    /// Unmodeled rule fields, preserved verbatim for round-trips.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One variation of a flag. Owned by the remote service, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Per-environment flag configuration.
///
/// Only the pieces this client reads are typed; `fallthrough` and
/// `targets` pass through untouched for document patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallthrough: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_variation: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<serde_json::Value>,
}

/// A feature flag document as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDocument {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub variations: Vec<Variation>,
    /// BTreeMap keeps environment iteration order stable for display.
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FlagDocument {
    /// Normalized view with derived defaults filled in: name falls back
    /// to the key, variation names fall back to `variation <i>`.
    #[must_use]
    pub fn into_normalized(mut self) -> Self {
        if self.name.is_empty() {
            self.name.clone_from(&self.key);
        }
        for (i, variation) in self.variations.iter_mut().enumerate() {
            if variation.name.as_deref().map_or(true, str::is_empty) {
                variation.name = Some(format!("variation {i}"));
            }
        }
        self
    }

    /// Environment keys present on this flag, in map order.
    #[must_use]
    pub fn environment_keys(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Resolve variation references for weight construction.
    ///
    /// Collects stable ids in variation order; if fewer than 2 are
    /// present, falls back to positional indices `[0, 1]`.
    #[must_use]
    pub fn variation_refs(&self) -> Vec<VariationRef> {
        let ids: Vec<VariationRef> = self
            .variations
            .iter()
            .filter_map(|v| v.id.clone())
            .map(VariationRef::ById)
            .collect();

        if ids.len() >= 2 {
            ids
        } else {
            vec![VariationRef::ByIndex(0), VariationRef::ByIndex(1)]
        }
    }
}

/// Environment metadata from the project environment listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Evaluation status of a flag in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagStatus {
    /// Lifecycle stage reported by the service (new, active, inactive, launched).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_requested: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// One high-level instruction of a semantic patch.
///
/// Carries EITHER a fixed outcome (`variation_id` / `variation`) OR the
/// rollout fields; never both. The builder output's ordered weight list
/// becomes the keyed `rollout_weights` mapping here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticInstruction {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_events: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clauses: Vec<Clause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout_context_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout_bucket_by: Option<String>,
    /// Variation reference → weight, keyed by stable id or index digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout_weights: Option<BTreeMap<String, u32>>,
    /// Anchor: insert immediately before this existing rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_rule_id: Option<String>,
}

/// One operation of a raw JSON document patch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: serde_json::Value,
}
