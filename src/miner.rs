//! Proof-of-work search
//!
//! A nonce is accepted when `sha256(provisional_hash ++ decimal(nonce))`,
//! rendered as lowercase hex, starts with [`DIFFICULTY_PREFIX`]. The
//! provisional hash is the block hash computed with nonce 0.
//!
//! The difficulty is fixed: four hex zeros means roughly 65 536 attempts on
//! average. [`proof_of_work`] has no exit other than success; callers that
//! need to stop early use [`proof_of_work_cancellable`].

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Required leading hex digits of a proof digest.
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Default number of attempts between two reads of a cancellation flag.
pub const DEFAULT_CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Hex digest tested against [`DIFFICULTY_PREFIX`] for a given nonce.
pub fn proof_digest(provisional_hash: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provisional_hash.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn valid_proof(provisional_hash: &str, nonce: u64) -> bool {
    proof_digest(provisional_hash, nonce).starts_with(DIFFICULTY_PREFIX)
}

/// Blocking search for the first nonce, counting up from 0, that satisfies
/// [`valid_proof`].
pub fn proof_of_work(provisional_hash: &str) -> u64 {
    let never = AtomicBool::new(false);
    // Unreachable None: the flag is never set.
    proof_of_work_cancellable(provisional_hash, &never, u64::MAX).unwrap_or_default()
}

/// Same search as [`proof_of_work`], reading `cancel` every `check_interval`
/// attempts. Returns `None` once the flag is observed set.
pub fn proof_of_work_cancellable(
    provisional_hash: &str,
    cancel: &AtomicBool,
    check_interval: u64,
) -> Option<u64> {
    let check_interval = check_interval.max(1);
    let started = Instant::now();
    let mut nonce = 0u64;

    loop {
        if nonce % check_interval == 0 && cancel.load(Ordering::Relaxed) {
            debug!(attempts = nonce, "proof-of-work search cancelled");
            return None;
        }
        if valid_proof(provisional_hash, nonce) {
            debug!(
                nonce,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "proof-of-work found"
            );
            return Some(nonce);
        }
        nonce += 1;
    }
}
