//! Generation request constants, validation, and job-key derivation.
//!
//! A *job key* identifies the class of work a queue entry represents
//! (e.g. "a PPL split generation"). Two requests with the same job key
//! resume the same in-flight entry; different keys conflict. The key is
//! always derived here -- callers never infer sameness from the opaque
//! context payload.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Split types
// ---------------------------------------------------------------------------

/// Push / pull / legs.
pub const SPLIT_PPL: &str = "ppl";
/// Upper body / lower body alternation.
pub const SPLIT_UPPER_LOWER: &str = "upper_lower";
/// Whole-body sessions.
pub const SPLIT_FULL_BODY: &str = "full_body";
/// One muscle group per day.
pub const SPLIT_BRO: &str = "bro";

/// All split types the planner can generate.
pub const VALID_SPLIT_TYPES: &[&str] = &[SPLIT_PPL, SPLIT_UPPER_LOWER, SPLIT_FULL_BODY, SPLIT_BRO];

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// Generate a new training split from scratch.
pub const JOB_SPLIT_GENERATION: &str = "split_generation";
/// Adapt an existing plan based on user feedback.
pub const JOB_PLAN_ADAPTATION: &str = "plan_adaptation";

/// Executor event name for split generation.
pub const EVENT_GENERATE_SPLIT: &str = "plan/generate.requested";
/// Executor event name for plan adaptation.
pub const EVENT_ADAPT_PLAN: &str = "plan/adapt.requested";

// ---------------------------------------------------------------------------
// Progress phases
// ---------------------------------------------------------------------------

/// Phase label for a freshly created entry.
pub const PHASE_QUEUED: &str = "queued";
/// Phase label emitted on stream open for a non-terminal entry.
pub const PHASE_STARTING: &str = "starting";

/// Training days per week must fall in this inclusive range.
pub const MIN_DAYS_PER_WEEK: u8 = 1;
pub const MAX_DAYS_PER_WEEK: u8 = 7;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a requested split type against [`VALID_SPLIT_TYPES`].
pub fn validate_split_type(split_type: &str) -> Result<(), CoreError> {
    if VALID_SPLIT_TYPES.contains(&split_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid split type '{split_type}'. Valid types: {}",
            VALID_SPLIT_TYPES.join(", ")
        )))
    }
}

/// Validate the requested training frequency.
pub fn validate_days_per_week(days: u8) -> Result<(), CoreError> {
    if (MIN_DAYS_PER_WEEK..=MAX_DAYS_PER_WEEK).contains(&days) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "days_per_week must be between {MIN_DAYS_PER_WEEK} and {MAX_DAYS_PER_WEEK}, got {days}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Job keys
// ---------------------------------------------------------------------------

/// Job key for a split generation request.
///
/// Requests for the same split type resume each other; asking for a
/// different split while one is generating is a conflict.
pub fn split_generation_job_key(split_type: &str) -> String {
    format!("{JOB_SPLIT_GENERATION}:{split_type}")
}

/// Job key for an adaptation of a specific plan.
pub fn plan_adaptation_job_key(plan_id: crate::types::DbId) -> String {
    format!("{JOB_PLAN_ADAPTATION}:{plan_id}")
}

// ---------------------------------------------------------------------------
// Progress forwarding
// ---------------------------------------------------------------------------

/// Whether an observed progress value should be forwarded to the client.
///
/// Only strictly increasing values are forwarded, so a client sees a
/// non-decreasing sequence even if the store briefly reports stale data.
pub fn should_forward_progress(last_sent: i16, observed: i16) -> bool {
    observed > last_sent
}
