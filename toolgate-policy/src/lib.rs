pub mod action;
pub mod flags;
pub mod gate;
pub mod risk;

// Re-export key types for convenience.
pub use action::{ToolArgs, is_truthy};
pub use flags::{FeatureFlags, GateMode, SharedFlags, parse_bool_flag};
pub use gate::{
    GateAction, GateDecision, GateMeta, GateRequest, PolicyGateDecision, PolicyGateEngine,
    ReasonCode, evaluate_execution_gate,
};
pub use risk::{
    ParseRiskTierError, RiskAssessment, RiskTier, assess_tool, infer_risk_tier, is_mutating_tool,
};
