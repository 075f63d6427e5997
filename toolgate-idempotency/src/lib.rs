pub mod canonical;
pub mod error;
pub mod key;
pub mod plan;

pub use canonical::to_canonical_json;
pub use error::{IdempotencyError, Result};
pub use key::{
    IDEMPOTENCY_KEY_PREFIX, IdempotencyInput, derive_idempotency_key, payload_digest,
    ttl_for_tier, ttl_seconds_for_risk_tier,
};
pub use plan::{IdempotencyHint, operation_fingerprint, plan_idempotency};
