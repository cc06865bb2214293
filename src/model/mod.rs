//! Curve evaluation and star rating recalibration.
//!
//! For every leaderboard in a pool the top score keeps the CR it has today:
//! 1. Work out the top score's accuracy from the map's maximum score.
//! 2. Weigh that accuracy with the new curve.
//! 3. Solve `cr = star_rating * STAR_BONUS_MULTIPLIER * weight` for the star rating.
pub mod commands;
pub mod constants;
pub mod curve;
pub mod rating_utils;

pub use commands::{generate_commands, write_commands, CommandError, Commands, Reweight};
pub use curve::{Curve, CurveError, CurveKind};
