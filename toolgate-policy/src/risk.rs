use serde::{Deserialize, Serialize};

use crate::action::ToolArgs;

/// Ordinal classification of an action's potential harm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    /// Read-only or informational tools.
    T0,
    /// Default for unclassified tools.
    T1,
    /// Mutating tools: writes, navigation, memory mutation.
    T2,
    /// High-autonomy or high-blast-radius tools.
    T3,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::T0 => "T0",
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::T3 => "T3",
        }
    }

    /// T2 and above would be challenged once enforcement is real.
    pub fn is_elevated(self) -> bool {
        self >= Self::T2
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk tier: {0:?}")]
pub struct ParseRiskTierError(pub String);

impl std::str::FromStr for RiskTier {
    type Err = ParseRiskTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T0" => Ok(Self::T0),
            "T1" => Ok(Self::T1),
            "T2" => Ok(Self::T2),
            "T3" => Ok(Self::T3),
            _ => Err(ParseRiskTierError(s.to_string())),
        }
    }
}

const MUTATING_TOOLS: &[&str] = &[
    "browser",
    "browser_agent",
    "code_execution_tool",
    "openclaw_tool",
    "memory_save",
    "memory_delete",
    "memory_forget",
    "behaviour_adjustment",
    "call_subordinate",
];

const HIGH_AUTONOMY_TOOLS: &[&str] = &[
    "openclaw_tool",
    "code_execution_tool",
    "browser_agent",
    "call_subordinate",
];

/// Tools that accept `url` / `path` arguments for read-only lookups.
const READ_ONLY_TOOLS: &[&str] = &[
    "knowledge_tool",
    "webpage_content_tool",
    "memory_load",
    "input",
    "response",
];

const BROWSER_PREFIX: &str = "browser_";

fn normalize_tool_name(tool_name: &str) -> String {
    tool_name.trim().to_ascii_lowercase()
}

fn is_mutating_normalized(name: &str, args: &ToolArgs) -> bool {
    if MUTATING_TOOLS.contains(&name) || name.starts_with(BROWSER_PREFIX) {
        return true;
    }
    args.has_location_key() && !READ_ONLY_TOOLS.contains(&name)
}

fn infer_tier_normalized(name: &str, args: &ToolArgs) -> RiskTier {
    // Order matters: a name can match more than one category.
    if HIGH_AUTONOMY_TOOLS.contains(&name) {
        RiskTier::T3
    } else if is_mutating_normalized(name, args) {
        RiskTier::T2
    } else if READ_ONLY_TOOLS.contains(&name) {
        RiskTier::T0
    } else {
        RiskTier::T1
    }
}

/// Whether a tool call mutates state outside the agent.
pub fn is_mutating_tool(tool_name: &str, tool_args: &ToolArgs) -> bool {
    is_mutating_normalized(&normalize_tool_name(tool_name), tool_args)
}

/// Infer the risk tier for a tool call. Unknown tools fall through to T1.
pub fn infer_risk_tier(tool_name: &str, tool_args: &ToolArgs) -> RiskTier {
    infer_tier_normalized(&normalize_tool_name(tool_name), tool_args)
}

/// Tier and mutation flag for one tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub mutating: bool,
}

pub fn assess_tool(tool_name: &str, tool_args: &ToolArgs) -> RiskAssessment {
    let name = normalize_tool_name(tool_name);
    RiskAssessment {
        tier: infer_tier_normalized(&name, tool_args),
        mutating: is_mutating_normalized(&name, tool_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArgs {
        ToolArgs::from_value(value)
    }

    #[test]
    fn test_mutating_tool_detection() {
        assert!(is_mutating_tool(
            "openclaw_tool",
            &args(json!({ "command": "message send" }))
        ));
        assert!(is_mutating_tool(
            "browser",
            &args(json!({ "url": "https://example.com" }))
        ));
        assert!(!is_mutating_tool("response", &args(json!({ "text": "ok" }))));
    }

    #[test]
    fn test_known_names_match_case_insensitively() {
        assert!(is_mutating_tool("  Memory_Save ", &ToolArgs::new()));
        assert_eq!(infer_risk_tier("CODE_EXECUTION_TOOL", &ToolArgs::new()), RiskTier::T3);
    }

    #[test]
    fn test_browser_prefix_is_mutating() {
        assert!(is_mutating_tool("browser_open", &ToolArgs::new()));
        assert_eq!(infer_risk_tier("browser_open", &ToolArgs::new()), RiskTier::T2);
    }

    #[test]
    fn test_location_keys_mark_unknown_tools_mutating() {
        for key in ["path", "file", "file_path", "url", "target"] {
            let a = args(json!({ key: "x" }));
            assert!(is_mutating_tool("custom_tool", &a), "key {key}");
            assert_eq!(infer_risk_tier("custom_tool", &a), RiskTier::T2);
        }
    }

    #[test]
    fn test_read_only_tools_may_take_locations() {
        let a = args(json!({ "url": "https://example.com" }));
        assert!(!is_mutating_tool("webpage_content_tool", &a));
        assert_eq!(infer_risk_tier("webpage_content_tool", &a), RiskTier::T0);
        assert!(!is_mutating_tool("memory_load", &args(json!({ "path": "notes" }))));
    }

    #[test]
    fn test_risk_tier_inference() {
        assert_eq!(infer_risk_tier("openclaw_tool", &ToolArgs::new()), RiskTier::T3);
        assert_eq!(
            infer_risk_tier("memory_save", &args(json!({ "fact": "x" }))),
            RiskTier::T2
        );
        assert_eq!(
            infer_risk_tier("response", &args(json!({ "text": "ok" }))),
            RiskTier::T0
        );
        assert_eq!(infer_risk_tier("something_new", &ToolArgs::new()), RiskTier::T1);
        assert_eq!(infer_risk_tier("", &ToolArgs::new()), RiskTier::T1);
    }

    #[test]
    fn test_autonomy_set_wins_over_other_categories() {
        // browser_agent is both mutating and prefixed; the autonomy check comes first.
        assert_eq!(infer_risk_tier("browser_agent", &ToolArgs::new()), RiskTier::T3);
        assert_eq!(
            infer_risk_tier("call_subordinate", &args(json!({ "message": "go" }))),
            RiskTier::T3
        );
    }

    #[test]
    fn test_assess_tool_combines_both() {
        let assessment = assess_tool("memory_delete", &ToolArgs::new());
        assert_eq!(
            assessment,
            RiskAssessment {
                tier: RiskTier::T2,
                mutating: true,
            }
        );
        assert!(!assess_tool("knowledge_tool", &ToolArgs::new()).mutating);
    }

    #[test]
    fn test_tier_ordering_and_parsing() {
        assert!(RiskTier::T0 < RiskTier::T1);
        assert!(RiskTier::T2 < RiskTier::T3);
        assert!(RiskTier::T2.is_elevated());
        assert!(!RiskTier::T1.is_elevated());
        assert_eq!(" t3 ".parse::<RiskTier>(), Ok(RiskTier::T3));
        assert!("T4".parse::<RiskTier>().is_err());
        assert_eq!(serde_json::to_string(&RiskTier::T2).unwrap(), "\"T2\"");
    }
}
