//! Best-effort classification of executor failure messages.
//!
//! Executor error strings are free-form. Known fragments are mapped to a
//! fixed, user-presentable message; anything unmatched passes through
//! unchanged rather than being hidden behind a generic apology.

/// Friendly message for executor-side timeouts.
pub const MSG_GENERATION_TIMEOUT: &str =
    "The generation took too long and was aborted. Please try again.";

/// Friendly message when an adaptation targets a user with no active plan.
pub const MSG_NO_ACTIVE_PLAN: &str =
    "No active training plan was found to adapt. Generate a plan first.";

/// Friendly message when the executor rejected the request outright.
pub const MSG_EXECUTOR_REJECTED: &str =
    "The generation service rejected this request. Please try again later.";

/// Substring → friendly message table, checked in order.
const KNOWN_FRAGMENTS: &[(&str, &str)] = &[
    ("timeout", MSG_GENERATION_TIMEOUT),
    ("timed out", MSG_GENERATION_TIMEOUT),
    ("no active plan", MSG_NO_ACTIVE_PLAN),
    ("rejected", MSG_EXECUTOR_REJECTED),
];

/// Map a stored executor error message to a user-presentable one.
///
/// Matching is case-insensitive substring search over [`KNOWN_FRAGMENTS`].
/// Unmatched messages are returned as-is.
pub fn classify_failure(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    for (fragment, friendly) in KNOWN_FRAGMENTS {
        if lowered.contains(fragment) {
            return (*friendly).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_fragment_maps_to_friendly_message() {
        assert_eq!(
            classify_failure("Worker timeout after 300s"),
            MSG_GENERATION_TIMEOUT
        );
        assert_eq!(classify_failure("request TIMED OUT"), MSG_GENERATION_TIMEOUT);
    }

    #[test]
    fn no_active_plan_fragment_maps() {
        assert_eq!(
            classify_failure("adaptation failed: no active plan for user 7"),
            MSG_NO_ACTIVE_PLAN
        );
    }

    #[test]
    fn unmatched_message_passes_through_raw() {
        let raw = "model returned malformed exercise list";
        assert_eq!(classify_failure(raw), raw);
    }
}
