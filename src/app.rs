use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::Config;
use crate::corpus::TextSource;
use crate::game::{self, GameError, RaceReport};
use crate::leaderboard::Leaderboard;
use crate::model::{PlayerContext, User};
use crate::profile::Profile;
use crate::runtime::RaceEvent;
use crate::session::{SessionStatus, TypingSession};
use crate::store::{KeyValueStore, Storage, StoreError};
use crate::timer::{Clock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Ready, racing, paused or finished, depending on the session.
    Race,
    Leaderboard,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App<K: KeyValueStore, C: Clock + Clone = SystemClock> {
    storage: Storage<K>,
    user: User,
    session: TypingSession<C>,
    texts: TextSource,
    rng: StdRng,
    state: AppState,
    report: Option<RaceReport>,
    leaderboard: Leaderboard,
    profile: Option<Profile>,
    leaderboard_size: usize,
    recent_sessions: usize,
}

impl<K: KeyValueStore> App<K, SystemClock> {
    pub fn new(storage: Storage<K>, user: User, texts: TextSource, config: &Config) -> Self {
        Self::with_clock(storage, user, texts, config, SystemClock)
    }
}

impl<K: KeyValueStore, C: Clock + Clone> App<K, C> {
    pub fn with_clock(
        storage: Storage<K>,
        user: User,
        texts: TextSource,
        config: &Config,
        clock: C,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        let session =
            TypingSession::with_clock(texts.next_text(&mut rng), PlayerContext::from(&user), clock);

        Self {
            storage,
            user,
            session,
            texts,
            rng,
            state: AppState::Race,
            report: None,
            leaderboard: Leaderboard::default(),
            profile: None,
            leaderboard_size: config.leaderboard_size,
            recent_sessions: config.recent_sessions,
        }
    }

    pub fn handle(&mut self, event: RaceEvent) -> Result<Control, GameError> {
        match event {
            RaceEvent::Key(key) => self.on_key(key),
            RaceEvent::Resize | RaceEvent::Tick => Ok(Control::Continue),
            RaceEvent::Closed => Ok(Control::Quit),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<Control, GameError> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Ok(Control::Quit),
            KeyCode::Char('c') if ctrl => return Ok(Control::Quit),
            KeyCode::Char('n') if ctrl => {
                self.new_race();
                return Ok(Control::Continue);
            }
            _ => {}
        }

        // while the race is live every printable key is input
        if self.state == AppState::Race && self.session.status() == SessionStatus::Running {
            match key.code {
                KeyCode::Tab => self.session.pause(),
                KeyCode::Backspace => self.session.backspace(),
                KeyCode::Char(c) if !ctrl => {
                    if let Some(outcome) = self.session.type_char(c) {
                        let report = game::record_race(&mut self.storage, &self.user, outcome)?;
                        self.user = report.user.clone();
                        self.report = Some(report);
                    }
                }
                _ => {}
            }
            return Ok(Control::Continue);
        }

        match key.code {
            KeyCode::Enter if self.state == AppState::Race => match self.session.status() {
                SessionStatus::NotStarted => self.session.start(),
                SessionStatus::Paused => self.session.resume(),
                SessionStatus::Finished => self.new_race(),
                SessionStatus::Running => {}
            },
            KeyCode::Tab if self.state == AppState::Race => self.session.resume(),
            KeyCode::Char('n') => self.new_race(),
            KeyCode::Char('l') => self.show_leaderboard()?,
            KeyCode::Char('p') => self.show_profile()?,
            KeyCode::Backspace | KeyCode::Char('b') => self.state = AppState::Race,
            _ => {}
        }

        Ok(Control::Continue)
    }

    /// Drop the current race, unfinished or not, and line up a fresh text.
    pub fn new_race(&mut self) {
        let text = self.texts.next_text(&mut self.rng);
        self.session.reset(text, PlayerContext::from(&self.user));
        self.report = None;
        self.state = AppState::Race;
    }

    pub fn show_leaderboard(&mut self) -> Result<(), StoreError> {
        self.leaderboard =
            Leaderboard::load(&self.storage, Some(self.user.id), self.leaderboard_size)?;
        debug!(rows = self.leaderboard.rows.len(), "leaderboard loaded");
        self.state = AppState::Leaderboard;
        Ok(())
    }

    pub fn show_profile(&mut self) -> Result<(), StoreError> {
        self.profile = Some(Profile::load(
            &self.storage,
            &self.user,
            self.recent_sessions,
        )?);
        self.state = AppState::Profile;
        Ok(())
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn session(&self) -> &TypingSession<C> {
        &self.session
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Result of the race just finished, until the next one starts.
    pub fn report(&self) -> Option<&RaceReport> {
        self.report.as_ref()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn storage(&self) -> &Storage<K> {
        &self.storage
    }
}
