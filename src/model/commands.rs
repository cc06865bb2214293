use std::{fs, io, path::Path};

use thiserror::Error;
use tracing::{debug, info, info_span, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::{
    api::{
        api_structs::{LeaderboardInfo, Score},
        ApiClient, ApiError, Transport
    },
    model::{
        constants::{NEW_COMMANDS_FILE, REVERT_COMMANDS_FILE},
        curve::Curve,
        rating_utils::{accuracy, max_score, star_rating}
    },
    utils::progress_utils::progress_style
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("leaderboard {leaderboard_id} has no scores")]
    NoScores { leaderboard_id: String },

    #[error("leaderboard {leaderboard_id} has an invalid note count of {notes}")]
    InvalidNoteCount { leaderboard_id: String, notes: i32 },

    #[error("the top score on leaderboard {leaderboard_id} has no CR in pool '{pool}'")]
    MissingCr { leaderboard_id: String, pool: String },

    #[error("leaderboard {leaderboard_id} has no forced star rating in pool '{pool}'")]
    MissingStarRating { leaderboard_id: String, pool: String },

    #[error(
        "cannot preserve {desired_cr} CR on leaderboard {leaderboard_id}: the new curve weights its top \
         score at {weight}"
    )]
    DegenerateWeight {
        leaderboard_id: String,
        weight: f64,
        desired_cr: f64
    }
}

/// Star rating change for a single leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Reweight {
    pub leaderboard_id: String,
    pub name: String,
    pub accuracy: f64,
    pub weight: f64,
    pub desired_cr: f64,
    pub old_star_rating: f64,
    pub new_star_rating: f64
}

/// The two command scripts. Line `n` of both refers to the same leaderboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Commands {
    pub new_commands: String,
    pub revert_commands: String
}

impl Commands {
    pub fn push(&mut self, pool: &str, reweight: &Reweight) {
        self.new_commands
            .push_str(&set_manual_command(&reweight.leaderboard_id, pool, reweight.new_star_rating));
        self.revert_commands
            .push_str(&set_manual_command(&reweight.leaderboard_id, pool, reweight.old_star_rating));
    }

    pub fn len(&self) -> usize {
        self.new_commands.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.new_commands.is_empty()
    }
}

pub fn set_manual_command(leaderboard_id: &str, pool: &str, star_rating: f64) -> String {
    format!("!set_manual {} {} {:.6}\n", leaderboard_id, pool, star_rating)
}

/// Computes the star rating that keeps the top score's CR in `pool`
/// unchanged once `curve` is in effect.
pub fn reweigh(
    leaderboard_id: &str,
    info: &LeaderboardInfo,
    top_score: &Score,
    pool: &str,
    curve: &Curve
) -> Result<Reweight, CommandError> {
    let max = max_score(info.notes).ok_or_else(|| CommandError::InvalidNoteCount {
        leaderboard_id: leaderboard_id.to_string(),
        notes: info.notes
    })?;

    let accuracy = accuracy(top_score.score, max);
    let weight = curve.evaluate(accuracy);

    let desired_cr = *top_score.cr.get(pool).ok_or_else(|| CommandError::MissingCr {
        leaderboard_id: leaderboard_id.to_string(),
        pool: pool.to_string()
    })?;

    let old_star_rating = *info
        .forced_star_rating
        .get(pool)
        .ok_or_else(|| CommandError::MissingStarRating {
            leaderboard_id: leaderboard_id.to_string(),
            pool: pool.to_string()
        })?;

    let new_star_rating = star_rating(weight, desired_cr).ok_or_else(|| CommandError::DegenerateWeight {
        leaderboard_id: leaderboard_id.to_string(),
        weight,
        desired_cr
    })?;

    Ok(Reweight {
        leaderboard_id: leaderboard_id.to_string(),
        name: info.name.clone(),
        accuracy,
        weight,
        desired_cr,
        old_star_rating,
        new_star_rating
    })
}

/// Builds both scripts for `leaderboard_ids`, in order. Any failure aborts
/// the whole run; nothing partial is returned.
pub async fn generate_commands<T: Transport>(
    client: &mut ApiClient<T>,
    leaderboard_ids: &[String],
    pool: &str,
    curve: &Curve
) -> Result<Commands, CommandError> {
    info!(leaderboards = leaderboard_ids.len(), "Generating reweight commands");

    let span = info_span!("reweigh");
    span.pb_set_style(&progress_style());
    span.pb_set_length(leaderboard_ids.len() as u64);

    async {
        let mut commands = Commands::default();
        for id in leaderboard_ids {
            let info = client.leaderboard_info(id).await?;
            let scores = client.scores(id, 0).await?;
            let top_score = scores.first().ok_or_else(|| CommandError::NoScores {
                leaderboard_id: id.clone()
            })?;

            let reweight = reweigh(id, &info, top_score, pool, curve)?;
            debug!(
                id = %reweight.leaderboard_id,
                name = %reweight.name,
                accuracy = reweight.accuracy,
                weight = reweight.weight,
                old = reweight.old_star_rating,
                new = reweight.new_star_rating,
                "Reweighed leaderboard"
            );

            commands.push(pool, &reweight);
            Span::current().pb_inc(1);
        }

        Ok::<_, CommandError>(commands)
    }
    .instrument(span)
    .await
}

/// Writes both scripts into `dir`, replacing existing files. Both are staged
/// as `.tmp` files first so a failed write leaves the previous scripts alone.
pub fn write_commands(dir: &Path, commands: &Commands) -> io::Result<()> {
    let files = [
        (NEW_COMMANDS_FILE, &commands.new_commands),
        (REVERT_COMMANDS_FILE, &commands.revert_commands)
    ];

    for (name, content) in files {
        fs::write(dir.join(format!("{}.tmp", name)), content)?;
    }

    for (name, _) in files {
        fs::rename(dir.join(format!("{}.tmp", name)), dir.join(name))?;
    }

    info!(dir = %dir.display(), commands = commands.len(), "Wrote command files");
    Ok(())
}
