use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use toolgate_policy::RiskTier;

use crate::canonical::to_canonical_json;
use crate::error::Result;

/// Literal prefix of every key. Bump the version segment whenever the
/// canonical encoding changes.
pub const IDEMPOTENCY_KEY_PREFIX: &str = "idem:v1:";

pub const DEFAULT_TTL_SECONDS: u64 = 15 * 60;
pub const T2_TTL_SECONDS: u64 = 24 * 60 * 60;
pub const T3_TTL_SECONDS: u64 = 72 * 60 * 60;

/// Description of one mutating operation.
///
/// `operation_fingerprint` says *what* the operation is (tool, action,
/// target); `payload` is its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyInput<P = Value> {
    pub root_session_id: String,
    pub invocation_id: String,
    pub operation_fingerprint: Map<String, Value>,
    pub payload: P,
}

impl<P> IdempotencyInput<P> {
    pub fn new(
        root_session_id: impl Into<String>,
        invocation_id: impl Into<String>,
        operation_fingerprint: Map<String, Value>,
        payload: P,
    ) -> Self {
        Self {
            root_session_id: root_session_id.into(),
            invocation_id: invocation_id.into(),
            operation_fingerprint,
            payload,
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// SHA-256 hex digest of the canonical JSON encoding of `payload`.
pub fn payload_digest<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    Ok(sha256_hex(to_canonical_json(payload)?.as_bytes()))
}

/// Derive `idem:v1:<sha256>` over
/// `root_session_id|invocation_id|canonical(fingerprint)|payload_digest`.
pub fn derive_idempotency_key<P: Serialize>(input: &IdempotencyInput<P>) -> Result<String> {
    let fingerprint = to_canonical_json(&input.operation_fingerprint)?;
    let digest = payload_digest(&input.payload)?;
    let joined = [
        input.root_session_id.as_str(),
        input.invocation_id.as_str(),
        fingerprint.as_str(),
        digest.as_str(),
    ]
    .join("|");
    Ok(format!("{IDEMPOTENCY_KEY_PREFIX}{}", sha256_hex(joined.as_bytes())))
}

/// Suggested record TTL for a tier given as text. Matching is
/// case-insensitive but exact: padded, unknown or empty tiers get the short
/// default.
pub fn ttl_seconds_for_risk_tier(risk_tier: &str) -> u64 {
    match risk_tier.to_uppercase().as_str() {
        "T2" => T2_TTL_SECONDS,
        "T3" => T3_TTL_SECONDS,
        _ => DEFAULT_TTL_SECONDS,
    }
}

pub fn ttl_for_tier(tier: RiskTier) -> u64 {
    match tier {
        RiskTier::T2 => T2_TTL_SECONDS,
        RiskTier::T3 => T3_TTL_SECONDS,
        RiskTier::T0 | RiskTier::T1 => DEFAULT_TTL_SECONDS,
    }
}
