//! Rule update strategies.
//!
//! Two code paths get a new rule onto a flag, with identical read-back
//! effect but entirely different wire shapes:
//!
//! - [`PatchStrategy::Semantic`] sends one high-level `addRule`
//!   instruction, optionally anchored before an existing rule.
//! - [`PatchStrategy::Document`] splices the rule into the environment's
//!   current rule list and replaces the whole list with one raw
//!   JSON-patch operation.
//!
//! Both share the [`crate::rules::builder`] output; the divergence is
//! confined to the wire-formatting step.

use std::collections::BTreeMap;

use crate::api::types::{PatchOperation, Rule, SemanticInstruction};
use crate::api::FlagGateway;
use crate::error::{Error, Result};

/// How a rule update is submitted to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchStrategy {
    /// One `addRule` semantic instruction (default).
    #[default]
    Semantic,
    /// Full replace of the environment's rule list.
    Document,
}

/// Apply `rule` to a flag using the selected strategy.
///
/// `position` is the zero-based insertion index into the environment's
/// existing rule list, clamped to `[0, len]`; values beyond the end
/// append. Returns the success reported by the remote call.
///
/// # Errors
///
/// `FlagNotFound` if the flag does not exist, `EnvironmentNotFound`
/// (with the available environment keys) if the environment is absent
/// in semantic mode, plus any transport or service error.
pub async fn apply_rule<G: FlagGateway>(
    gateway: &G,
    strategy: PatchStrategy,
    project_key: &str,
    flag_key: &str,
    environment_key: &str,
    rule: &Rule,
    position: usize,
    comment: Option<&str>,
) -> Result<bool> {
    match strategy {
        PatchStrategy::Semantic => {
            apply_semantic(gateway, project_key, flag_key, environment_key, rule, position, comment)
                .await
        }
        PatchStrategy::Document => {
            apply_document(gateway, project_key, flag_key, environment_key, rule, position, comment)
                .await
        }
    }
}

async fn apply_semantic<G: FlagGateway>(
    gateway: &G,
    project_key: &str,
    flag_key: &str,
    environment_key: &str,
    rule: &Rule,
    position: usize,
    comment: Option<&str>,
) -> Result<bool> {
    let flag = gateway
        .get_flag(project_key, flag_key)
        .await?
        .ok_or_else(|| Error::FlagNotFound { key: flag_key.to_string() })?;

    let Some(config) = flag.environments.get(environment_key) else {
        return Err(Error::EnvironmentNotFound {
            key: environment_key.to_string(),
            available: flag.environment_keys(),
        });
    };

    // Existing rules are only needed for the insertion anchor; the
    // instruction itself carries none of them.
    let instruction = add_rule_instruction(rule, &config.rules, position);

    tracing::debug!(flag_key, environment_key, "applying semantic instruction");
    gateway
        .apply_semantic_instruction(project_key, flag_key, environment_key, &instruction, comment)
        .await
}

async fn apply_document<G: FlagGateway>(
    gateway: &G,
    project_key: &str,
    flag_key: &str,
    environment_key: &str,
    rule: &Rule,
    position: usize,
    comment: Option<&str>,
) -> Result<bool> {
    // Independent fetch: no snapshot is shared with earlier validation.
    let flag = gateway
        .get_flag(project_key, flag_key)
        .await?
        .ok_or_else(|| Error::FlagNotFound { key: flag_key.to_string() })?;

    let existing = flag
        .environments
        .get(environment_key)
        .map(|config| config.rules.clone())
        .unwrap_or_default();

    let operation = replace_rules_operation(environment_key, existing, rule.clone(), position)?;

    tracing::debug!(flag_key, environment_key, "applying document patch");
    gateway
        .apply_document_patch(project_key, flag_key, &[operation], comment)
        .await
}

/// Translate a rule into one `addRule` semantic instruction.
///
/// The rule's ordered weight list becomes a keyed mapping from variation
/// reference to weight. When `position > 0` points into the existing
/// list and the rule at the clamped position carries a stable id, the
/// instruction is anchored before that rule; otherwise it carries no
/// anchor and the service appends at its default position.
#[must_use]
pub fn add_rule_instruction(
    rule: &Rule,
    existing_rules: &[Rule],
    position: usize,
) -> SemanticInstruction {
    let before_rule_id = if position > 0 && !existing_rules.is_empty() {
        let clamped = position.min(existing_rules.len());
        existing_rules.get(clamped).and_then(|anchor| anchor.id.clone())
    } else {
        None
    };

    let mut instruction = SemanticInstruction {
        kind: "addRule".to_string(),
        description: Some(rule.description.clone()),
        track_events: Some(rule.track_events),
        clauses: rule.clauses.clone(),
        variation_id: None,
        variation: None,
        rollout_context_kind: None,
        rollout_bucket_by: None,
        rollout_weights: None,
        before_rule_id,
    };

    if let Some(rollout) = &rule.rollout {
        let weights: BTreeMap<String, u32> = rollout
            .weights
            .iter()
            .map(|w| (w.variation.as_key(), w.weight))
            .collect();
        instruction.rollout_context_kind = Some(rollout.context_kind.clone());
        instruction.rollout_bucket_by = Some(rollout.bucket_by.clone());
        instruction.rollout_weights = Some(weights);
    } else {
        instruction.variation = rule.variation;
    }

    instruction
}

/// Splice `rule` into `existing` at `position` and wrap the result in a
/// full-list replace operation for the environment's rules path.
///
/// # Errors
///
/// Returns a JSON error if the resulting list cannot be serialized.
pub fn replace_rules_operation(
    environment_key: &str,
    mut existing: Vec<Rule>,
    rule: Rule,
    position: usize,
) -> Result<PatchOperation> {
    let index = position.min(existing.len());
    existing.insert(index, rule);

    Ok(PatchOperation {
        op: "replace".to_string(),
        path: format!("/environments/{environment_key}/rules"),
        value: serde_json::to_value(existing)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        EnvironmentInfo, FlagDocument, FlagStatus, Rollout, RolloutWeight, VariationRef,
    };
    use crate::rules::builder::{build_rollout_rule, RolloutRuleSpec};
    use std::sync::Mutex;

    /// In-memory gateway capturing what the strategies submit.
    struct FakeGateway {
        flag: Option<FlagDocument>,
        semantic_calls: Mutex<Vec<(String, SemanticInstruction, Option<String>)>>,
        document_calls: Mutex<Vec<(Vec<PatchOperation>, Option<String>)>>,
    }

    impl FakeGateway {
        fn with_flag(flag: FlagDocument) -> Self {
            Self {
                flag: Some(flag),
                semantic_calls: Mutex::new(Vec::new()),
                document_calls: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                flag: None,
                semantic_calls: Mutex::new(Vec::new()),
                document_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FlagGateway for FakeGateway {
        async fn get_flag(&self, _project: &str, _key: &str) -> Result<Option<FlagDocument>> {
            Ok(self.flag.clone())
        }

        async fn get_project_environments(&self, _project: &str) -> Result<Vec<EnvironmentInfo>> {
            Ok(Vec::new())
        }

        async fn get_flag_status(
            &self,
            _project: &str,
            _key: &str,
            _environment: Option<&str>,
        ) -> Result<Option<FlagStatus>> {
            Ok(None)
        }

        async fn apply_semantic_instruction(
            &self,
            _project: &str,
            _key: &str,
            environment_key: &str,
            instruction: &SemanticInstruction,
            comment: Option<&str>,
        ) -> Result<bool> {
            self.semantic_calls.lock().unwrap().push((
                environment_key.to_string(),
                instruction.clone(),
                comment.map(ToString::to_string),
            ));
            Ok(true)
        }

        async fn apply_document_patch(
            &self,
            _project: &str,
            _key: &str,
            operations: &[PatchOperation],
            comment: Option<&str>,
        ) -> Result<bool> {
            self.document_calls
                .lock()
                .unwrap()
                .push((operations.to_vec(), comment.map(ToString::to_string)));
            Ok(true)
        }
    }

    fn existing_rule(id: Option<&str>, description: &str) -> Rule {
        Rule {
            id: id.map(ToString::to_string),
            description: description.to_string(),
            track_events: false,
            clauses: vec![],
            rollout: None,
            variation: Some(0),
            extra: serde_json::Map::new(),
        }
    }

    fn flag_with_rules(rules: Vec<Rule>) -> FlagDocument {
        serde_json::from_value(serde_json::json!({
            "key": "api-v2-rollout",
            "name": "API v2 rollout",
            "variations": [
                {"_id": "vid-1", "value": true},
                {"_id": "vid-2", "value": false}
            ],
            "environments": {
                "production": {
                    "on": true,
                    "rules": serde_json::to_value(rules).unwrap()
                }
            }
        }))
        .unwrap()
    }

    fn users_api_rule(refs: &[VariationRef]) -> Rule {
        build_rollout_rule(
            &RolloutRuleSpec {
                name: "Users API",
                endpoint_pattern: "GET /api/v1/users",
                percentages: [80, 20],
                bucket_by: "key",
                context_kind: "request",
                track_events: true,
            },
            refs,
        )
    }

    #[tokio::test]
    async fn test_semantic_missing_flag_is_not_found() {
        let gateway = FakeGateway::empty();
        let rule = users_api_rule(&[]);
        let err = apply_rule(
            &gateway,
            PatchStrategy::Semantic,
            "web",
            "api-v2-rollout",
            "production",
            &rule,
            0,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::FlagNotFound { .. }));
        assert!(gateway.semantic_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_semantic_missing_environment_lists_available() {
        let gateway = FakeGateway::with_flag(flag_with_rules(vec![]));
        let rule = users_api_rule(&[]);
        let err = apply_rule(
            &gateway,
            PatchStrategy::Semantic,
            "web",
            "api-v2-rollout",
            "staging",
            &rule,
            0,
            None,
        )
        .await
        .unwrap_err();

        match err {
            Error::EnvironmentNotFound { key, available } => {
                assert_eq!(key, "staging");
                assert_eq!(available, vec!["production".to_string()]);
            }
            other => panic!("expected EnvironmentNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_semantic_submits_keyed_weights() {
        let refs = vec![
            VariationRef::ById("vid-1".to_string()),
            VariationRef::ById("vid-2".to_string()),
        ];
        let gateway = FakeGateway::with_flag(flag_with_rules(vec![]));
        let rule = users_api_rule(&refs);
        let ok = apply_rule(
            &gateway,
            PatchStrategy::Semantic,
            "web",
            "api-v2-rollout",
            "production",
            &rule,
            0,
            Some("gradual rollout"),
        )
        .await
        .unwrap();
        assert!(ok);

        let calls = gateway.semantic_calls.lock().unwrap();
        let (env, instruction, comment) = &calls[0];
        assert_eq!(env, "production");
        assert_eq!(comment.as_deref(), Some("gradual rollout"));
        assert_eq!(instruction.kind, "addRule");
        assert_eq!(instruction.description.as_deref(), Some("Users API"));
        assert_eq!(instruction.track_events, Some(true));
        assert_eq!(instruction.rollout_bucket_by.as_deref(), Some("key"));
        assert_eq!(instruction.rollout_context_kind.as_deref(), Some("request"));

        let weights = instruction.rollout_weights.as_ref().unwrap();
        assert_eq!(weights["vid-1"], 80_000);
        assert_eq!(weights["vid-2"], 20_000);
        assert!(instruction.variation.is_none());
        assert!(instruction.before_rule_id.is_none());
    }

    #[test]
    fn test_anchor_attached_when_position_has_stable_id() {
        let existing = vec![
            existing_rule(Some("rule-a"), "first"),
            existing_rule(Some("rule-b"), "second"),
        ];
        let instruction = add_rule_instruction(&users_api_rule(&[]), &existing, 1);
        assert_eq!(instruction.before_rule_id.as_deref(), Some("rule-b"));
    }

    #[test]
    fn test_anchor_omitted_at_position_zero() {
        let existing = vec![existing_rule(Some("rule-a"), "first")];
        let instruction = add_rule_instruction(&users_api_rule(&[]), &existing, 0);
        assert!(instruction.before_rule_id.is_none());
    }

    #[test]
    fn test_anchor_omitted_when_position_past_end() {
        let existing = vec![
            existing_rule(Some("rule-a"), "first"),
            existing_rule(Some("rule-b"), "second"),
        ];
        // Clamped position indexes one past the last rule: append fallback.
        let instruction = add_rule_instruction(&users_api_rule(&[]), &existing, 7);
        assert!(instruction.before_rule_id.is_none());
    }

    #[test]
    fn test_anchor_omitted_when_target_rule_lacks_id() {
        let existing = vec![
            existing_rule(Some("rule-a"), "first"),
            existing_rule(None, "second"),
        ];
        let instruction = add_rule_instruction(&users_api_rule(&[]), &existing, 1);
        assert!(instruction.before_rule_id.is_none());
    }

    #[test]
    fn test_fixed_variation_rule_carries_no_rollout_fields() {
        let rule = existing_rule(None, "fixed outcome");
        let instruction = add_rule_instruction(&rule, &[], 0);
        assert_eq!(instruction.variation, Some(0));
        assert!(instruction.rollout_weights.is_none());
        assert!(instruction.rollout_bucket_by.is_none());
    }

    #[tokio::test]
    async fn test_document_splices_at_position() {
        let existing = vec![
            existing_rule(Some("rule-a"), "first"),
            existing_rule(Some("rule-b"), "second"),
        ];
        let gateway = FakeGateway::with_flag(flag_with_rules(existing));
        let rule = users_api_rule(&[]);
        let ok = apply_rule(
            &gateway,
            PatchStrategy::Document,
            "web",
            "api-v2-rollout",
            "production",
            &rule,
            1,
            None,
        )
        .await
        .unwrap();
        assert!(ok);

        let calls = gateway.document_calls.lock().unwrap();
        let (operations, comment) = &calls[0];
        assert!(comment.is_none());
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].op, "replace");
        assert_eq!(operations[0].path, "/environments/production/rules");

        let rules = operations[0].value.as_array().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0]["description"], "first");
        assert_eq!(rules[1]["description"], "Users API");
        assert_eq!(rules[2]["description"], "second");
    }

    #[tokio::test]
    async fn test_document_position_past_end_appends() {
        let existing = vec![existing_rule(Some("rule-a"), "first")];
        let gateway = FakeGateway::with_flag(flag_with_rules(existing));
        let rule = users_api_rule(&[]);
        apply_rule(
            &gateway,
            PatchStrategy::Document,
            "web",
            "api-v2-rollout",
            "production",
            &rule,
            99,
            None,
        )
        .await
        .unwrap();

        let calls = gateway.document_calls.lock().unwrap();
        let rules = calls[0].0[0].value.as_array().unwrap().clone();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.last().unwrap()["description"], "Users API");
    }

    #[tokio::test]
    async fn test_document_absent_environment_starts_empty_list() {
        let gateway = FakeGateway::with_flag(flag_with_rules(vec![]));
        let rule = users_api_rule(&[]);
        apply_rule(
            &gateway,
            PatchStrategy::Document,
            "web",
            "api-v2-rollout",
            "staging",
            &rule,
            0,
            None,
        )
        .await
        .unwrap();

        let calls = gateway.document_calls.lock().unwrap();
        let (operations, _) = &calls[0];
        assert_eq!(operations[0].path, "/environments/staging/rules");
        assert_eq!(operations[0].value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_document_replace_preserves_unmodeled_rule_fields() {
        let existing: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {
                "_id": "rule-a",
                "description": "first",
                "ref": "rl-7",
                "clauses": [
                    {"_id": "cl-1", "attribute": "segment", "op": "segmentMatch", "values": ["beta"]}
                ],
                "variation": 0
            }
        ]))
        .unwrap();

        let operation =
            replace_rules_operation("production", existing, users_api_rule(&[]), 1).unwrap();
        let rules = operation.value.as_array().unwrap();

        // The re-serialized existing rule keeps everything the service sent
        assert_eq!(rules[0]["ref"], "rl-7");
        assert_eq!(rules[0]["clauses"][0]["_id"], "cl-1");
        assert_eq!(rules[0]["clauses"][0]["op"], "segmentMatch");
        assert_eq!(rules[1]["description"], "Users API");
    }

    /// Both strategies must put the same rule effect on the wire: same
    /// clause, same two weights, same resulting position.
    #[tokio::test]
    async fn test_strategies_produce_equivalent_rule_effects() {
        let refs = vec![
            VariationRef::ById("vid-1".to_string()),
            VariationRef::ById("vid-2".to_string()),
        ];
        let rule = users_api_rule(&refs);

        let semantic = FakeGateway::with_flag(flag_with_rules(vec![]));
        apply_rule(&semantic, PatchStrategy::Semantic, "web", "f", "production", &rule, 0, None)
            .await
            .unwrap();
        let instruction = semantic.semantic_calls.lock().unwrap()[0].1.clone();

        let document = FakeGateway::with_flag(flag_with_rules(vec![]));
        apply_rule(&document, PatchStrategy::Document, "web", "f", "production", &rule, 0, None)
            .await
            .unwrap();
        let submitted: Vec<Rule> = serde_json::from_value(
            document.document_calls.lock().unwrap()[0].0[0].value.clone(),
        )
        .unwrap();

        // Same clause
        assert_eq!(instruction.clauses, submitted[0].clauses);

        // Same weights, despite map vs. ordered-list wire shapes
        let doc_rollout = submitted[0].rollout.as_ref().unwrap();
        let doc_weights: BTreeMap<String, u32> = doc_rollout
            .weights
            .iter()
            .map(|w| (w.variation.as_key(), w.weight))
            .collect();
        assert_eq!(instruction.rollout_weights.as_ref(), Some(&doc_weights));
        assert_eq!(
            instruction.rollout_bucket_by.as_deref(),
            Some(doc_rollout.bucket_by.as_str())
        );

        // Same position: both target the front of an empty list
        assert!(instruction.before_rule_id.is_none());
        assert_eq!(submitted.len(), 1);
    }
}
