//! Memo nonces.
//!
//! A nonce is `(unix_millis << 16) | counter`. The counter starts at a random
//! 16-bit value and increments on every call, so two memos produced in the
//! same millisecond still differ. On top of that, every nonce handed out is
//! strictly greater than the previous one from the same generator, which
//! covers a wall clock that steps backwards.

use chrono::Utc;
use parking_lot::Mutex;
use rand::RngCore;

#[derive(Debug, Default)]
struct NonceState {
    counter: Option<u16>,
    last: u64,
}

/// Thread-safe source of unique memo nonces.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    state: Mutex<NonceState>,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a nonce strictly greater than any previously returned by this
    /// generator.
    pub fn next_nonce(&self) -> u64 {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(millis)
    }

    fn next_at(&self, millis: u64) -> u64 {
        let mut state = self.state.lock();
        let counter = state
            .counter
            .get_or_insert_with(|| rand::thread_rng().next_u32() as u16);
        *counter = counter.wrapping_add(1);
        let candidate = (millis << 16) | u64::from(*counter);

        let nonce = candidate.max(state.last.saturating_add(1));
        state.last = nonce;
        nonce
    }
}
