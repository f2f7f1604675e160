use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::achievements::{self, Achievement};
use crate::model::{CompletedSession, User};
use crate::session::RaceOutcome;
use crate::store::{KeyValueStore, Storage, StoreError};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Race was run by player {raced_by}, not {recorded_for}")]
    WrongPlayer { raced_by: Uuid, recorded_for: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    pub session: CompletedSession,
    /// Everything the race's own figures unlock.
    pub achievements: Vec<Achievement>,
    /// Unlocked by this race for the first time in the player's history.
    pub newly_unlocked: Vec<Achievement>,
    /// The player after this race was counted.
    pub user: User,
}

/// Store `outcome` and fold it into `user`'s lifetime stats.
///
/// The updated player is saved and becomes the current one. An outcome raced
/// by someone else is rejected before anything is written.
pub fn record_race<K: KeyValueStore>(
    storage: &mut Storage<K>,
    user: &User,
    outcome: RaceOutcome,
) -> Result<RaceReport, GameError> {
    let RaceOutcome {
        session,
        achievements: met,
    } = outcome;

    if session.user_id != user.id {
        warn!(raced_by = %session.user_id, recorded_for = %user.id, "race belongs to another player");
        return Err(GameError::WrongPlayer {
            raced_by: session.user_id,
            recorded_for: user.id,
        });
    }

    storage.save_session(&session)?;

    let before = achievements::progress_for(user.best_wpm, user.best_accuracy, user.total_games);

    let mut updated = user.clone();
    updated.total_games = updated.total_games.saturating_add(1);
    updated.best_wpm = updated.best_wpm.max(session.wpm);
    updated.best_accuracy = updated.best_accuracy.max(session.accuracy);

    storage.save_user(&updated)?;
    storage.set_current_user(Some(&updated))?;

    let after = achievements::progress_for(
        updated.best_wpm,
        updated.best_accuracy,
        updated.total_games,
    );
    let newly_unlocked = achievements::newly_unlocked(&after, &achievements::unlocked_ids(&before));

    info!(
        user = %updated.username,
        total_games = updated.total_games,
        best_wpm = updated.best_wpm,
        new_achievements = newly_unlocked.len(),
        "race recorded"
    );

    Ok(RaceReport {
        session,
        achievements: met,
        newly_unlocked,
        user: updated,
    })
}
