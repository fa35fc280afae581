use crate::config::{FunctionConfig, ReadinessPolicy};
use crate::readiness::condition::{Condition, REASON_CREATING, TYPE_NO_ERRORS, TYPE_READY};
use crate::resource::{DesiredMap, ObservedMap, Ready, ResourceDocument};
use serde_json::Value;

/// Outcome of one evaluation pass over an immutable snapshot.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Desired resources, with readiness flags filled in where the policy allows it.
    pub desired: DesiredMap,
    /// The synthesized composite condition. Always present, `False` iff `unready` is non-empty.
    pub condition: Condition,
    /// Names of composed resources that contributed an error fragment.
    pub unready: Vec<String>,
}

/// Derives composed-resource readiness from observed status conditions and rolls
/// every disqualifying condition up into a single composite condition.
///
/// Stateless: each call reads one snapshot and builds a fresh outcome.
#[derive(Clone, Copy, Debug)]
pub struct ReadinessAggregator {
    policy: ReadinessPolicy,
}

impl ReadinessAggregator {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &FunctionConfig) -> Self {
        Self::new(config.policy)
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    /// Evaluate every desired resource against its observed counterpart.
    ///
    /// Desired resources are walked in lexicographic name order so the digest is
    /// stable across runs with identical inputs. A desired resource missing from
    /// the observed snapshot, or observed without a `status.conditions` list, is
    /// skipped: no readiness change, no fragment.
    pub fn evaluate(
        &self,
        composite: &ResourceDocument,
        observed: &ObservedMap,
        mut desired: DesiredMap,
    ) -> Evaluation {
        let composite_ref = format!(
            "{}/{}/{}",
            composite.api_version(),
            composite.kind(),
            composite.name()
        );
        tracing::debug!(
            composite = %composite_ref,
            desired_count = desired.len(),
            observed_count = observed.len(),
            "evaluating composed resource readiness"
        );

        let mut fragments = Vec::new();
        let mut unready = Vec::new();

        for (name, entry) in desired.iter_mut() {
            let Some(observed_entry) = observed.get(name) else {
                crate::readiness_event!(
                    debug,
                    "observed_missing",
                    composite = composite_ref,
                    resource = name
                );
                continue;
            };

            let Some(conditions) = observed_entry.resource.conditions() else {
                crate::readiness_event!(
                    debug,
                    "conditions_missing",
                    composite = composite_ref,
                    resource = name
                );
                continue;
            };

            let outcome = walk_conditions(&composite_ref, name, conditions);

            if !outcome.fragments.is_empty() {
                unready.push(name.clone());
            }
            fragments.extend(outcome.fragments);

            if self.policy.sets_readiness() && outcome.passed && entry.ready.is_unspecified() {
                crate::readiness_event!(
                    info,
                    "readiness_detected",
                    composite = composite_ref,
                    resource = name
                );
                entry.ready = Ready::True;
            }
        }

        let condition = if fragments.is_empty() {
            Condition::available(TYPE_NO_ERRORS)
        } else {
            crate::readiness_event!(
                info,
                "unready_digest",
                composite = composite_ref,
                resources = unready.join(",")
            );
            Condition::reconcile_error(
                TYPE_NO_ERRORS,
                format!("Unready conditions:\n {}", fragments.join("\n")),
            )
        };

        Evaluation {
            desired,
            condition,
            unready,
        }
    }
}

struct ChildOutcome {
    fragments: Vec<String>,
    passed: bool,
}

/// Walk one resource's condition list in order, stopping at the first entry that
/// settles the outcome.
fn walk_conditions(composite: &str, name: &str, entries: &[Value]) -> ChildOutcome {
    let mut fragments = Vec::new();
    let mut passed = !entries.is_empty();

    for entry in entries {
        let condition = match Condition::from_value(entry) {
            Ok(condition) => condition,
            Err(_) => {
                // Degrade to "no signal" for this resource; never an error fragment.
                crate::readiness_event!(
                    debug,
                    "condition_malformed",
                    composite = composite,
                    resource = name
                );
                passed = false;
                break;
            }
        };

        if condition.reason == REASON_CREATING && condition.condition_type == TYPE_READY {
            // A resource still being created never counts as erroring.
            crate::readiness_event!(
                info,
                "resource_creating",
                composite = composite,
                resource = name
            );
            fragments.clear();
            passed = false;
            break;
        }

        if !condition.status.is_true() {
            crate::readiness_event!(
                info,
                "condition_not_true",
                composite = composite,
                resource = name,
                condition = condition.condition_type,
                status = condition.status.as_str()
            );
            fragments.push(format!(
                "\n=> {} {}={} {}\n\n{}",
                name,
                condition.condition_type,
                condition.status.as_str(),
                condition.reason,
                condition.message
            ));
            passed = false;
            break;
        }
    }

    ChildOutcome { fragments, passed }
}
