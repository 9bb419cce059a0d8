// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The two rate-limit buckets named in spec.md §4.5: per-session-and-token
//! for player actions, per-owner for session/preset mutations. Stream
//! endpoints are never subject to either bucket.

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

/// A keyed token bucket: one independent quota per key string.
pub struct KeyedLimiter {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl KeyedLimiter {
    pub fn per_minute(n: u32) -> Self {
        // Documented panic: the fallback literal `1` is never zero.
        #[allow(clippy::unwrap_used)]
        let quota = Quota::per_minute(NonZeroU32::new(n).unwrap_or_else(|| NonZeroU32::new(1).unwrap()));
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// `true` if `key` is under quota right now.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}

/// The action bucket key named in spec.md §4.5: `"{sessionId}:{playerTokenOrAddr}"`.
pub fn action_bucket_key(session_key: &str, player_token: &str) -> String {
    format!("{session_key}:{player_token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keys_have_independent_quotas() {
        let limiter = KeyedLimiter::per_minute(1);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn action_bucket_key_combines_session_and_token() {
        assert_eq!(action_bucket_key("s1", "tok1"), "s1:tok1");
    }
}
