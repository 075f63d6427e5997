use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolgate_policy::gate::EXECUTE_OPERATION;
use toolgate_policy::{FeatureFlags, RiskAssessment, ToolArgs};

use crate::error::Result;
use crate::key::{IdempotencyInput, derive_idempotency_key, ttl_for_tier};

/// What the runtime should hand to its dedupe store for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyHint {
    pub key: String,
    pub ttl_seconds: u64,
}

/// Default fingerprint for a tool execution: tool name, the `execute`
/// operation, and the resolved target (`null` when there is none).
pub fn operation_fingerprint(tool_name: &str, tool_args: &ToolArgs) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("tool".into(), Value::String(tool_name.to_string()));
    map.insert("operation".into(), Value::String(EXECUTE_OPERATION.to_string()));
    map.insert(
        "target".into(),
        tool_args.resolved_target().cloned().unwrap_or(Value::Null),
    );
    map
}

/// Key and TTL for a mutating action, or `None` when idempotency is switched
/// off or the action does not mutate anything.
pub fn plan_idempotency<P: Serialize>(
    flags: &FeatureFlags,
    assessment: RiskAssessment,
    input: &IdempotencyInput<P>,
) -> Result<Option<IdempotencyHint>> {
    if !flags.idempotency_v1 || !assessment.mutating {
        return Ok(None);
    }
    let key = derive_idempotency_key(input)?;
    let ttl_seconds = ttl_for_tier(assessment.tier);
    tracing::debug!(
        invocation_id = %input.invocation_id,
        risk_tier = %assessment.tier,
        ttl_seconds,
        "derived idempotency key"
    );
    Ok(Some(IdempotencyHint { key, ttl_seconds }))
}
