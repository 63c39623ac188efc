use chrono::{Days, NaiveDateTime};

/// Escalating review intervals in days, applied on consecutive correct
/// answers (Ebbinghaus forgetting curve approximation). The last entry
/// is reused once a card has been reviewed four or more times.
pub const REVIEW_INTERVALS: [u64; 5] = [1, 3, 7, 14, 30];

/// Result of scheduling a single review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub review_count: i32,
    pub next_review_at: NaiveDateTime,
}

/// Computes the updated review count and next review date for a card.
///
/// The review counter increments on every attempt, correct or not. A
/// correct answer picks its interval from `REVIEW_INTERVALS` indexed by
/// the pre-increment count; an incorrect answer drops the card back to
/// a one-day cadence without resetting the counter.
///
/// Dates advance by calendar days, not fixed 86400-second offsets, so
/// month and year boundaries behave as a user would expect.
pub fn compute_next_review(
    current_review_count: i32,
    was_correct: bool,
    now: NaiveDateTime,
) -> ReviewOutcome {
    // Clamp: a negative count cannot come from a well-formed caller.
    let count = current_review_count.max(0);

    let interval_days = if was_correct {
        let idx = (count as usize).min(REVIEW_INTERVALS.len() - 1);
        REVIEW_INTERVALS[idx]
    } else {
        1
    };

    ReviewOutcome {
        review_count: count + 1,
        next_review_at: now + Days::new(interval_days),
    }
}

/// Review date for a freshly created card: one day out, zero reviews.
pub fn initial_next_review(now: NaiveDateTime) -> NaiveDateTime {
    now + Days::new(1)
}
