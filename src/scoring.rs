//! Pure scoring rules for live questions: base points, a speed bonus that
//! decays linearly to zero at the time limit, and a streak multiplier.

/// Divisor applied to the remaining milliseconds to obtain the speed bonus.
const SPEED_BONUS_DIVISOR: f64 = 100.0;
/// Multiplier gained per consecutive correct answer.
const STREAK_STEP: f64 = 0.1;

/// Compute the points awarded for a correct answer.
///
/// `elapsed_ms` past the deadline yields no speed bonus rather than a
/// penalty. The streak multiplier is applied before truncation, so a streak
/// of 3 on 1000 base points answered instantly on a 20 s question yields
/// `floor((1000 + 200) * 1.3)`.
pub fn score(base_points: u32, time_limit_secs: u32, elapsed_ms: u64, streak: u32) -> u32 {
    let limit_ms = u64::from(time_limit_secs) * 1000;
    let remaining_ms = limit_ms.saturating_sub(elapsed_ms);
    let speed_bonus = remaining_ms as f64 / SPEED_BONUS_DIVISOR;
    let multiplier = 1.0 + STREAK_STEP * f64::from(streak);

    ((f64::from(base_points) + speed_bonus) * multiplier).floor() as u32
}

/// Points awarded for an incorrect or timed-out answer. The caller is
/// responsible for resetting the player's streak.
pub fn missed_score() -> u32 {
    0
}
