//! Idempotency keys for stage moves.
//!
//! A key identifies one logical transition of a lead from one stage to
//! another. It carries no timestamp or random part, so a retried move of the
//! same transition produces the same key and the backend can recognize it.
//! A lead moved away and later back along the same transition also produces
//! the same key; the backend's dedup window decides whether that collides.

use sha2::{Digest, Sha256};

/// Prefix on every stage-move key
pub const KEY_PREFIX: &str = "mv_";

/// Derive the idempotency key for moving `lead_id` from `from_stage_id` to
/// `to_stage_id`. An empty `from_stage_id` stands for "no stage".
///
/// Components are length-prefixed before hashing so that no two distinct
/// argument triples share an encoding.
pub fn idempotency_key(lead_id: &str, from_stage_id: &str, to_stage_id: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [lead_id, from_stage_id, to_stage_id] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{}{}", KEY_PREFIX, hex::encode(hasher.finalize()))
}
