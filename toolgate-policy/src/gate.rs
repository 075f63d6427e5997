use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ToolArgs;
use crate::flags::{FeatureFlags, GateMode};
use crate::risk::{RiskTier, infer_risk_tier};

pub const GATE_DECISION_SCHEMA: &str = "policy-gate-decision/v0";
pub const GATE_EVENT_TYPE: &str = "policy.gate.evaluated";
pub const EXECUTION_GATE: &str = "execution";
pub const POLICY_VERSION: &str = "p2-min-slice-v1";
pub const EXECUTE_OPERATION: &str = "execute";

/// Outcome of a gate evaluation. There is no blocking outcome: `Challenge`
/// is the strongest action a gate can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Challenge,
}

impl GateDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Challenge => "challenge",
        }
    }
}

impl std::fmt::Display for GateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a gate reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    PolicyDisabled,
    ShadowAllow,
    EnforceShadowEmitOnly,
    HighRiskChallenge,
    EnforceAllow,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PolicyDisabled => "policy_disabled",
            Self::ShadowAllow => "shadow_allow",
            Self::EnforceShadowEmitOnly => "enforce_shadow_emit_only",
            Self::HighRiskChallenge => "high_risk_challenge",
            Self::EnforceAllow => "enforce_allow",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action a gate was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateAction {
    pub tool: String,
    pub operation: String,
    /// Resolved target with its original JSON type, `null` when absent.
    pub target: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateMeta {
    pub mode: GateMode,
    pub shadow_emit_only: bool,
    /// What enforcement would have decided. Only set when the decision was
    /// softened (shadow mode, or enforce with shadow-emit-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub would_decision: Option<GateDecision>,
}

/// Audit record for one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGateDecision {
    pub schema: String,
    pub event_type: String,
    pub run_id: String,
    pub root_session_id: String,
    pub invocation_id: String,
    pub gate_name: String,
    pub decision: GateDecision,
    pub reason_code: ReasonCode,
    pub policy_version: String,
    pub risk_tier: RiskTier,
    /// RFC 3339 UTC timestamp with `+00:00` offset.
    pub timestamp: String,
    pub action: GateAction,
    pub meta: GateMeta,
}

impl PolicyGateDecision {
    /// Flat JSON object handed to the event sink.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_challenge(&self) -> bool {
        self.decision == GateDecision::Challenge
    }
}

/// Inputs for a single gate evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub tool_name: &'a str,
    pub tool_args: &'a ToolArgs,
    pub run_id: &'a str,
    pub root_session_id: &'a str,
    pub invocation_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    decision: GateDecision,
    reason_code: ReasonCode,
    would_decision: Option<GateDecision>,
}

impl Outcome {
    fn new(decision: GateDecision, reason_code: ReasonCode) -> Self {
        Self {
            decision,
            reason_code,
            would_decision: None,
        }
    }

    fn softened(reason_code: ReasonCode, tier: RiskTier) -> Self {
        let would = if tier.is_elevated() {
            GateDecision::Challenge
        } else {
            GateDecision::Allow
        };
        Self {
            decision: GateDecision::Allow,
            reason_code,
            would_decision: Some(would),
        }
    }
}

fn resolve_outcome(flags: &FeatureFlags, tier: RiskTier) -> Outcome {
    if !flags.policy_gates_v1 {
        return Outcome::new(GateDecision::Allow, ReasonCode::PolicyDisabled);
    }
    match (flags.policy_gates_mode, flags.p2_shadow_emit_only) {
        (GateMode::Off, _) => Outcome::new(GateDecision::Allow, ReasonCode::PolicyDisabled),
        (GateMode::Shadow, _) => Outcome::softened(ReasonCode::ShadowAllow, tier),
        (GateMode::Enforce, true) => Outcome::softened(ReasonCode::EnforceShadowEmitOnly, tier),
        (GateMode::Enforce, false) if tier == RiskTier::T3 => {
            Outcome::new(GateDecision::Challenge, ReasonCode::HighRiskChallenge)
        }
        (GateMode::Enforce, false) => Outcome::new(GateDecision::Allow, ReasonCode::EnforceAllow),
    }
}

/// Stateless execution gate. The only thing it owns is the clock used to
/// stamp decisions.
#[derive(Debug, Clone)]
pub struct PolicyGateEngine {
    clock: fn() -> DateTime<Utc>,
}

impl Default for PolicyGateEngine {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl PolicyGateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    pub fn evaluate(&self, flags: &FeatureFlags, request: &GateRequest<'_>) -> PolicyGateDecision {
        let risk_tier = infer_risk_tier(request.tool_name, request.tool_args);
        let outcome = resolve_outcome(flags, risk_tier);

        tracing::debug!(
            tool = request.tool_name,
            invocation_id = request.invocation_id,
            risk_tier = %risk_tier,
            mode = %flags.policy_gates_mode,
            decision = %outcome.decision,
            reason_code = %outcome.reason_code,
            "execution gate evaluated"
        );

        PolicyGateDecision {
            schema: GATE_DECISION_SCHEMA.to_string(),
            event_type: GATE_EVENT_TYPE.to_string(),
            run_id: request.run_id.to_string(),
            root_session_id: request.root_session_id.to_string(),
            invocation_id: request.invocation_id.to_string(),
            gate_name: EXECUTION_GATE.to_string(),
            decision: outcome.decision,
            reason_code: outcome.reason_code,
            policy_version: POLICY_VERSION.to_string(),
            risk_tier,
            timestamp: (self.clock)().to_rfc3339(),
            action: GateAction {
                tool: request.tool_name.to_string(),
                operation: EXECUTE_OPERATION.to_string(),
                target: request.tool_args.resolved_target().cloned(),
            },
            meta: GateMeta {
                mode: flags.policy_gates_mode,
                shadow_emit_only: flags.p2_shadow_emit_only,
                would_decision: outcome.would_decision,
            },
        }
    }
}

/// Evaluate the execution gate for one tool call using the system clock.
pub fn evaluate_execution_gate(
    flags: &FeatureFlags,
    tool_name: &str,
    tool_args: &ToolArgs,
    run_id: &str,
    root_session_id: &str,
    invocation_id: &str,
) -> PolicyGateDecision {
    PolicyGateEngine::default().evaluate(
        flags,
        &GateRequest {
            tool_name,
            tool_args,
            run_id,
            root_session_id,
            invocation_id,
        },
    )
}
