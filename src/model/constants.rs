// Rating constants
pub const STAR_BONUS_MULTIPLIER: f64 = 50.0;
// Curve constants
pub const MAX_CURVE_POINTS: usize = 15;
pub const MAX_ACCURACY: f64 = 100.0;
// Score constants
pub const NOTE_SCORE: i64 = 920;
pub const NOTE_SCORE_OFFSET: i64 = 7245;
/// Maximum achievable score for maps with 1..=13 notes, where the
/// combo multiplier has not reached its cap yet.
pub const SHORT_MAP_MAX_SCORES: [i64; 13] =
    [115, 345, 575, 805, 1035, 1495, 1955, 2415, 2875, 3335, 3795, 4255, 4715];
// Command script constants
pub const NEW_COMMANDS_FILE: &str = "newCommands.txt";
pub const REVERT_COMMANDS_FILE: &str = "revertCommands.txt";
