use crate::achievements::{self, Achievement};
use crate::model::{CompletedSession, User};
use crate::store::{KeyValueStore, Storage, StoreError};
use crate::util::{mean, std_dev};

/// A player's standing: lifetime stats, achievement progress and history.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: User,
    /// The whole catalog, unlocked entries derived from the player's bests.
    pub achievements: Vec<Achievement>,
    /// Newest first, at most the requested number.
    pub recent_sessions: Vec<CompletedSession>,
    pub mean_wpm: Option<f64>,
    pub wpm_std_dev: Option<f64>,
}

impl Profile {
    pub fn load<K: KeyValueStore>(
        storage: &Storage<K>,
        user: &User,
        recent: usize,
    ) -> Result<Self, StoreError> {
        let history = storage.user_sessions(user.id)?;
        let wpms: Vec<f64> = history.iter().map(|s| f64::from(s.wpm)).collect();

        Ok(Self {
            user: user.clone(),
            achievements: achievements::progress_for(
                user.best_wpm,
                user.best_accuracy,
                user.total_games,
            ),
            mean_wpm: mean(&wpms),
            wpm_std_dev: std_dev(&wpms),
            recent_sessions: history.into_iter().take(recent).collect(),
        })
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn profile_summarizes_history() {
        let mut storage = Storage::new(MemoryStore::new());
        let mut user = User::new("racer", "racer@example.com", "#10B981");
        user.total_games = 3;
        user.best_wpm = 80;
        user.best_accuracy = 96;

        for (wpm, ago) in [(40, 3), (80, 2), (60, 1)] {
            storage
                .save_session(&CompletedSession {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    username: user.username.clone(),
                    wpm,
                    accuracy: 96,
                    time_taken_seconds: 30.0,
                    text_length: 80,
                    is_personal_best: false,
                    created_at: Utc::now() - Duration::minutes(ago),
                })
                .unwrap();
        }

        let profile = Profile::load(&storage, &user, 2).unwrap();
        assert_eq!(profile.achievements.len(), 11);
        let unlocked: Vec<_> = profile.unlocked().map(|a| a.id).collect();
        assert_eq!(unlocked, vec!["speed_50", "speed_75", "accuracy_95"]);
        assert_eq!(profile.unlocked_count(), 3);

        let recent: Vec<_> = profile.recent_sessions.iter().map(|s| s.wpm).collect();
        assert_eq!(recent, vec![60, 80]);
        assert_eq!(profile.mean_wpm, Some(60.0));
        assert!(profile.wpm_std_dev.unwrap() > 16.0);
    }

    #[test]
    fn new_player_has_no_history() {
        let storage = Storage::new(MemoryStore::new());
        let user = User::new("fresh", "fresh@example.com", "#10B981");
        let profile = Profile::load(&storage, &user, 10).unwrap();
        assert!(profile.recent_sessions.is_empty());
        assert_eq!(profile.unlocked_count(), 0);
        assert_eq!(profile.mean_wpm, None);
        assert_eq!(profile.wpm_std_dev, None);
    }
}
