use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

pub const POLICY_GATES_V1_ENV: &str = "POLICY_GATES_V1";
pub const POLICY_GATES_MODE_ENV: &str = "POLICY_GATES_MODE";
pub const IDEMPOTENCY_V1_ENV: &str = "IDEMPOTENCY_V1";
pub const RETRY_ORCHESTRATOR_V1_ENV: &str = "RETRY_ORCHESTRATOR_V1";
pub const P2_SHADOW_EMIT_ONLY_ENV: &str = "P2_SHADOW_EMIT_ONLY";

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Gate modes controlling whether policy evaluation has any effect beyond logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Gating is inert; every action is allowed with `policy_disabled`.
    #[default]
    Off,
    /// Decisions are computed and reported, never applied.
    Shadow,
    /// Decisions are applied unless `p2_shadow_emit_only` is set.
    Enforce,
}

impl GateMode {
    /// Normalize a raw configuration value. Anything other than
    /// `off` / `shadow` / `enforce` (case-insensitive) is `Off`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "shadow" => Self::Shadow,
            "enforce" => Self::Enforce,
            _ => Self::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Shadow => "shadow",
            Self::Enforce => "enforce",
        }
    }
}

impl std::fmt::Display for GateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable feature-flag snapshot consumed by the gate engine.
///
/// Built once at process start and passed by reference into every
/// evaluation. To change flags at runtime, publish a new snapshot through
/// [`SharedFlags`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Master switch for policy gates.
    pub policy_gates_v1: bool,
    pub policy_gates_mode: GateMode,
    pub idempotency_v1: bool,
    /// Part of the flag surface; no decision logic reads it yet.
    pub retry_orchestrator_v1: bool,
    /// Forces enforce mode to behave like shadow mode.
    pub p2_shadow_emit_only: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            policy_gates_v1: false,
            policy_gates_mode: GateMode::Off,
            idempotency_v1: false,
            retry_orchestrator_v1: false,
            p2_shadow_emit_only: true,
        }
    }
}

impl FeatureFlags {
    /// Load flags from an arbitrary key lookup. Unset keys take their
    /// defaults (all off, `p2_shadow_emit_only` on).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag =
            |name: &str, default: bool| lookup(name).map_or(default, |raw| parse_bool_flag(&raw));
        let policy_gates_mode = lookup(POLICY_GATES_MODE_ENV)
            .map(|raw| GateMode::parse_lenient(&raw))
            .unwrap_or_default();

        Self {
            policy_gates_v1: flag(POLICY_GATES_V1_ENV, false),
            policy_gates_mode,
            idempotency_v1: flag(IDEMPOTENCY_V1_ENV, false),
            retry_orchestrator_v1: flag(RETRY_ORCHESTRATOR_V1_ENV, false),
            p2_shadow_emit_only: flag(P2_SHADOW_EMIT_ONLY_ENV, true),
        }
    }

    /// Load flags from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// True when gating produces anything other than `policy_disabled`.
    pub fn gates_active(&self) -> bool {
        self.policy_gates_v1 && self.policy_gates_mode != GateMode::Off
    }
}

/// Parse a boolean flag value. Only `1`, `true`, `yes` and `on` are truthy.
pub fn parse_bool_flag(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&normalized.as_str())
}

/// Atomically swappable holder for the current [`FeatureFlags`] snapshot.
///
/// Readers take a snapshot per evaluation and never observe a partially
/// updated flag set.
#[derive(Debug)]
pub struct SharedFlags {
    current: ArcSwap<FeatureFlags>,
}

impl SharedFlags {
    pub fn new(flags: FeatureFlags) -> Self {
        Self {
            current: ArcSwap::from_pointee(flags),
        }
    }

    pub fn snapshot(&self) -> Arc<FeatureFlags> {
        self.current.load_full()
    }

    /// Replace the current snapshot. In-flight evaluations keep the snapshot
    /// they already loaded.
    pub fn publish(&self, flags: FeatureFlags) {
        tracing::info!(
            policy_gates_v1 = flags.policy_gates_v1,
            mode = %flags.policy_gates_mode,
            idempotency_v1 = flags.idempotency_v1,
            shadow_emit_only = flags.p2_shadow_emit_only,
            "publishing feature flag snapshot"
        );
        self.current.store(Arc::new(flags));
    }
}

impl Default for SharedFlags {
    fn default() -> Self {
        Self::new(FeatureFlags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_safe_and_off() {
        let flags = FeatureFlags::from_lookup(|_| None);
        assert_eq!(flags, FeatureFlags::default());
        assert!(!flags.policy_gates_v1);
        assert_eq!(flags.policy_gates_mode, GateMode::Off);
        assert!(!flags.idempotency_v1);
        assert!(!flags.retry_orchestrator_v1);
        assert!(flags.p2_shadow_emit_only);
    }

    #[test]
    fn test_reads_overrides() {
        let flags = FeatureFlags::from_lookup(lookup_from(&[
            (POLICY_GATES_V1_ENV, "true"),
            (POLICY_GATES_MODE_ENV, "enforce"),
            (IDEMPOTENCY_V1_ENV, "1"),
            (RETRY_ORCHESTRATOR_V1_ENV, "yes"),
            (P2_SHADOW_EMIT_ONLY_ENV, "false"),
        ]));
        assert_eq!(
            flags,
            FeatureFlags {
                policy_gates_v1: true,
                policy_gates_mode: GateMode::Enforce,
                idempotency_v1: true,
                retry_orchestrator_v1: true,
                p2_shadow_emit_only: false,
            }
        );
    }

    #[test]
    fn test_values_are_trimmed_and_case_insensitive() {
        let flags = FeatureFlags::from_lookup(lookup_from(&[
            (POLICY_GATES_V1_ENV, "  ON "),
            (POLICY_GATES_MODE_ENV, " Shadow\n"),
        ]));
        assert!(flags.policy_gates_v1);
        assert_eq!(flags.policy_gates_mode, GateMode::Shadow);
    }

    #[test]
    fn test_invalid_mode_normalizes_to_off() {
        let flags = FeatureFlags::from_lookup(lookup_from(&[(POLICY_GATES_MODE_ENV, "block")]));
        assert_eq!(flags.policy_gates_mode, GateMode::Off);
        assert_eq!(GateMode::parse_lenient(""), GateMode::Off);
    }

    #[test]
    fn test_set_but_unrecognized_bool_is_false() {
        // An explicit non-truthy value overrides the `true` default.
        let flags =
            FeatureFlags::from_lookup(lookup_from(&[(P2_SHADOW_EMIT_ONLY_ENV, "enabled")]));
        assert!(!flags.p2_shadow_emit_only);
        assert!(!parse_bool_flag(""));
        assert!(parse_bool_flag("YES"));
    }

    #[test]
    fn test_gates_active() {
        let mut flags = FeatureFlags::default();
        assert!(!flags.gates_active());
        flags.policy_gates_v1 = true;
        assert!(!flags.gates_active());
        flags.policy_gates_mode = GateMode::Shadow;
        assert!(flags.gates_active());
    }

    #[test]
    fn test_shared_flags_publish_replaces_snapshot() {
        let shared = SharedFlags::default();
        let before = shared.snapshot();
        shared.publish(FeatureFlags {
            policy_gates_v1: true,
            policy_gates_mode: GateMode::Shadow,
            ..FeatureFlags::default()
        });
        let after = shared.snapshot();

        // The earlier snapshot is unaffected by the swap.
        assert!(!before.policy_gates_v1);
        assert!(after.policy_gates_v1);
        assert_eq!(after.policy_gates_mode, GateMode::Shadow);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GateMode::Enforce).unwrap(), "\"enforce\"");
        assert_eq!(GateMode::Shadow.to_string(), "shadow");
    }
}
