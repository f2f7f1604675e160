use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::{KeyValueStore, Storage, StoreError};

pub const DEFAULT_SIZE: usize = 10;
pub const EMPTY_MESSAGE: &str = "No races yet. Be the first!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Medal for a 1-based rank, if it earns one.
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// 1-based.
    pub rank: usize,
    pub username: String,
    pub wpm: u32,
    pub accuracy: i32,
    pub is_current_user: bool,
    pub is_personal_best: bool,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardRow {
    pub fn medal(&self) -> Option<Medal> {
        Medal::for_rank(self.rank)
    }
}

/// Fastest races across every player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn load<K: KeyValueStore>(
        storage: &Storage<K>,
        current_user_id: Option<Uuid>,
        size: usize,
    ) -> Result<Self, StoreError> {
        let rows = storage
            .top_sessions(size)?
            .into_iter()
            .enumerate()
            .map(|(idx, session)| LeaderboardRow {
                rank: idx + 1,
                is_current_user: Some(session.user_id) == current_user_id,
                username: session.username,
                wpm: session.wpm,
                accuracy: session.accuracy,
                is_personal_best: session.is_personal_best,
                created_at: session.created_at,
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
