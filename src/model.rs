use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Hex color (`#RRGGBB`) of the player's car.
    pub avatar_color: String,
    pub total_games: u32,
    pub total_wins: u32,
    #[serde(rename = "bestWPM")]
    pub best_wpm: u32,
    pub best_accuracy: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh player with no races.
    pub fn new(username: impl Into<String>, email: impl Into<String>, avatar_color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            avatar_color: avatar_color.into(),
            total_games: 0,
            total_wins: 0,
            best_wpm: 0,
            best_accuracy: 0,
            created_at: Utc::now(),
        }
    }
}

/// A finished race as handed to storage. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub wpm: u32,
    pub accuracy: i32,
    /// Active race time in seconds, paused intervals excluded.
    #[serde(rename = "timeTaken")]
    pub time_taken_seconds: f64,
    pub text_length: usize,
    pub is_personal_best: bool,
    pub created_at: DateTime<Utc>,
}

/// Who is racing, passed explicitly into each session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerContext {
    pub user_id: Uuid,
    pub username: String,
    /// Best WPM before this race; a race only counts as a personal best if it beats it.
    pub best_wpm: u32,
    /// Races completed before this one.
    pub total_games: u32,
}

impl From<&User> for PlayerContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            best_wpm: user.best_wpm,
            total_games: user.total_games,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_uses_stored_key_names() {
        let user = User::new("racer", "racer@example.com", "#EF4444");
        let json = serde_json::to_value(&user).unwrap();
        for key in [
            "id",
            "username",
            "email",
            "avatarColor",
            "totalGames",
            "totalWins",
            "bestWPM",
            "bestAccuracy",
            "createdAt",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn session_parses_browser_timestamps() {
        let json = r#"{
            "id": "6f1c1f0e-8d5b-4a8e-9a57-1f7b8f3c2d10",
            "userId": "0b7e4b1e-7a36-4d8c-8d5e-3c1e2a9b4f60",
            "username": "racer",
            "wpm": 64,
            "accuracy": 97,
            "timeTaken": 12.345,
            "textLength": 63,
            "isPersonalBest": true,
            "createdAt": "2024-05-01T10:20:30.123Z"
        }"#;
        let session: CompletedSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.wpm, 64);
        assert_eq!(session.time_taken_seconds, 12.345);
        assert!(session.is_personal_best);
        assert_eq!(session.created_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn player_context_from_user() {
        let mut user = User::new("racer", "racer@example.com", "#EF4444");
        user.best_wpm = 71;
        user.total_games = 4;
        let ctx = PlayerContext::from(&user);
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.best_wpm, 71);
        assert_eq!(ctx.total_games, 4);
    }
}
