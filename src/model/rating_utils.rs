use crate::model::constants::{NOTE_SCORE, NOTE_SCORE_OFFSET, SHORT_MAP_MAX_SCORES, STAR_BONUS_MULTIPLIER};

/// Maximum achievable score for a map with the given note count.
/// Returns `None` for note counts below 1.
pub fn max_score(notes: i32) -> Option<i64> {
    match notes {
        n if n > SHORT_MAP_MAX_SCORES.len() as i32 => Some(n as i64 * NOTE_SCORE - NOTE_SCORE_OFFSET),
        n if n >= 1 => Some(SHORT_MAP_MAX_SCORES[(n - 1) as usize]),
        _ => None
    }
}

/// Percent accuracy of a raw score against the map's maximum score.
pub fn accuracy(score: i64, max_score: i64) -> f64 {
    score as f64 / max_score as f64 * 100.0
}

/// Inverts `cr = star_rating * STAR_BONUS_MULTIPLIER * weight`.
///
/// Returns `None` when the result is not a finite, usable rating, which
/// happens when the weight is zero (accuracy at the bottom of the curve).
pub fn star_rating(weight: f64, desired_cr: f64) -> Option<f64> {
    if weight <= 0.0 {
        return None;
    }

    let rating = desired_cr / STAR_BONUS_MULTIPLIER / weight;
    rating.is_finite().then_some(rating)
}

/// Composite rating a score earns on a map with the given star rating.
pub fn cr(star_rating: f64, weight: f64) -> f64 {
    star_rating * STAR_BONUS_MULTIPLIER * weight
}
