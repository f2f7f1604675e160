use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::achievements::{self, Achievement};
use crate::corpus::RaceText;
use crate::model::{CompletedSession, PlayerContext};
use crate::scoring::{compute_accuracy, compute_wpm, ScoreSnapshot};
use crate::timer::{Clock, SessionTimer, SystemClock};

/// ```text
/// NotStarted --start--> Running --pause--> Paused
///                          ^                  |
///                          +-----resume-------+
/// Running --submit_input (full length)--> Finished
/// ```
///
/// Calls made in the wrong state are ignored. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionStatus {
    NotStarted,
    Running,
    Paused,
    Finished,
}

/// How a target character should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    /// Typed, but not what the target has at this position.
    Wrong(char),
    /// Next character to type.
    Cursor,
    Pending,
}

/// What a finished race hands to the completion handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceOutcome {
    pub session: CompletedSession,
    /// Everything the final figures unlock, previously granted or not.
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone)]
pub struct TypingSession<C: Clock = SystemClock> {
    target: RaceText,
    target_chars: Vec<char>,
    typed: String,
    current_index: usize,
    error_count: usize,
    status: SessionStatus,
    timer: SessionTimer<C>,
    player: PlayerContext,
    final_snapshot: Option<ScoreSnapshot>,
}

impl TypingSession<SystemClock> {
    pub fn new(target: RaceText, player: PlayerContext) -> Self {
        Self::with_clock(target, player, SystemClock)
    }
}

impl<C: Clock> TypingSession<C> {
    pub fn with_clock(target: RaceText, player: PlayerContext, clock: C) -> Self {
        let target_chars = target.as_str().chars().collect();

        Self {
            target,
            target_chars,
            typed: String::new(),
            current_index: 0,
            error_count: 0,
            status: SessionStatus::NotStarted,
            timer: SessionTimer::new(clock),
            player,
            final_snapshot: None,
        }
    }

    pub fn start(&mut self) {
        if self.status != SessionStatus::NotStarted {
            return;
        }

        self.timer.start();
        self.status = SessionStatus::Running;
        debug!(text_length = self.target_chars.len(), "race started");
    }

    pub fn pause(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }

        self.timer.pause();
        self.status = SessionStatus::Paused;
        debug!(typed = self.current_index, "race paused");
    }

    pub fn resume(&mut self) {
        if self.status != SessionStatus::Paused {
            return;
        }

        self.timer.resume();
        self.status = SessionStatus::Running;
        debug!(paused_for = ?self.timer.paused_duration(), "race resumed");
    }

    pub fn toggle_pause(&mut self) {
        match self.status {
            SessionStatus::Running => self.pause(),
            SessionStatus::Paused => self.resume(),
            _ => {}
        }
    }

    /// Replace the typed text with `text`.
    ///
    /// Only the first `target.len()` characters are kept. Returns the outcome on
    /// the update that reaches the end of the target, and `None` otherwise,
    /// including every call made while not running.
    pub fn submit_input(&mut self, text: &str) -> Option<RaceOutcome> {
        if self.status != SessionStatus::Running {
            return None;
        }

        let limit = self.target_chars.len();
        self.typed = text.chars().take(limit).collect();
        self.current_index = self.typed.chars().count();
        self.error_count = self
            .typed
            .chars()
            .zip(&self.target_chars)
            .filter(|(typed, expected)| typed != *expected)
            .count();

        if self.current_index >= limit {
            Some(self.finish())
        } else {
            None
        }
    }

    /// Append one character to the typed text.
    pub fn type_char(&mut self, c: char) -> Option<RaceOutcome> {
        let mut text = self.typed.clone();
        text.push(c);
        self.submit_input(&text)
    }

    /// Remove the last typed character.
    pub fn backspace(&mut self) {
        let mut text = self.typed.clone();
        if text.pop().is_some() {
            self.submit_input(&text);
        }
    }

    fn finish(&mut self) -> RaceOutcome {
        let elapsed = self.timer.elapsed();
        self.status = SessionStatus::Finished;

        let text_length = self.target_chars.len();
        let time_taken_seconds = elapsed.as_secs_f64();
        let wpm = compute_wpm(text_length, time_taken_seconds);
        let accuracy = compute_accuracy(text_length, self.error_count);

        self.final_snapshot = Some(ScoreSnapshot {
            wpm,
            accuracy,
            elapsed_seconds: elapsed.as_secs(),
        });

        let session = CompletedSession {
            id: Uuid::new_v4(),
            user_id: self.player.user_id,
            username: self.player.username.clone(),
            wpm,
            accuracy,
            time_taken_seconds,
            text_length,
            is_personal_best: wpm > self.player.best_wpm,
            created_at: Utc::now(),
        };

        let achievements =
            achievements::evaluate(wpm, accuracy, self.player.total_games.saturating_add(1));

        info!(
            wpm,
            accuracy,
            time_taken_seconds,
            personal_best = session.is_personal_best,
            achievements = achievements.len(),
            "race finished"
        );

        RaceOutcome {
            session,
            achievements,
        }
    }

    /// Live figures: defaults before the start, frozen after the finish.
    pub fn snapshot(&self) -> ScoreSnapshot {
        match (self.status, self.final_snapshot) {
            (SessionStatus::NotStarted, _) => ScoreSnapshot::default(),
            (SessionStatus::Finished, Some(snapshot)) => snapshot,
            _ => ScoreSnapshot::measure(self.current_index, self.error_count, self.timer.elapsed()),
        }
    }

    /// Typed share of the target, 0.0 to 100.0.
    pub fn progress(&self) -> f64 {
        (self.current_index as f64 / self.target_chars.len() as f64) * 100.0
    }

    /// Each target character with its display state.
    pub fn char_states(&self) -> impl Iterator<Item = (char, CharState)> + '_ {
        let typed: Vec<char> = self.typed.chars().collect();
        let cursor = self.current_index;

        self.target_chars
            .iter()
            .enumerate()
            .map(move |(idx, &expected)| {
                let state = match typed.get(idx) {
                    Some(&c) if c == expected => CharState::Correct,
                    Some(&c) => CharState::Wrong(c),
                    None if idx == cursor => CharState::Cursor,
                    None => CharState::Pending,
                };
                (expected, state)
            })
    }

    /// Discard this race and start over, `NotStarted`, on `text`.
    pub fn reset(&mut self, text: RaceText, player: PlayerContext)
    where
        C: Clone,
    {
        debug!(status = %self.status, "race reset");
        let clock = self.timer.clock().clone();
        *self = Self::with_clock(text, player, clock);
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn target(&self) -> &RaceText {
        &self.target
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn player(&self) -> &PlayerContext {
        &self.player
    }

    pub fn timer(&self) -> &SessionTimer<C> {
        &self.timer
    }
}
