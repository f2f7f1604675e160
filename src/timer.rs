use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for race timing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and hand another
/// to the session under test.
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("offset", &self.offset.get())
            .finish()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Active race time, excluding paused intervals.
///
/// Elapsed time is `now - started_at - paused_total`, where an ongoing pause
/// is counted up to `now`. The value is therefore frozen while paused.
#[derive(Debug, Clone)]
pub struct SessionTimer<C: Clock> {
    clock: C,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl<C: Clock> SessionTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            started_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Starts the timer; ignored if already started.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Ignored unless running.
    pub fn pause(&mut self) {
        if self.is_running() {
            self.paused_at = Some(self.clock.now());
        }
    }

    /// Ignored unless paused.
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += self.clock.now().saturating_duration_since(paused_at);
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.has_started() && !self.is_paused()
    }

    /// Total time spent paused so far, including an ongoing pause.
    pub fn paused_duration(&self) -> Duration {
        let ongoing = self
            .paused_at
            .map(|paused_at| self.clock.now().saturating_duration_since(paused_at))
            .unwrap_or_default();

        self.paused_total + ongoing
    }

    /// Active time since [`start`](Self::start), zero before it.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self
                .clock
                .now()
                .saturating_duration_since(started_at)
                .saturating_sub(self.paused_duration()),
            None => Duration::ZERO,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
