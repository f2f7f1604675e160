use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RaceEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within one refresh interval.
    Tick,
    /// The input source is gone; no further events will arrive.
    Closed,
}

pub trait RaceEventSource {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<RaceEvent, RecvTimeoutError>;
}

/// Events delivered over a channel, either from a terminal reader thread or
/// pushed directly by a test.
pub struct ChannelEventSource {
    rx: Receiver<RaceEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<RaceEvent>) -> Self {
        Self { rx }
    }

    /// A source paired with the sender that feeds it.
    pub fn pair() -> (Sender<RaceEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Read crossterm events on a background thread.
    ///
    /// Only key presses are forwarded; release and repeat reports are dropped.
    pub fn terminal() -> Self {
        let (tx, source) = Self::pair();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => RaceEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => RaceEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(forwarded).is_err() {
                debug!("event receiver dropped");
                break;
            }
        });

        source
    }
}

impl RaceEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<RaceEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Hands out one event at a time, falling back to `Tick` once per interval.
pub struct Runner<E: RaceEventSource, T: Ticker> {
    events: E,
    ticker: T,
}

impl<E: RaceEventSource, T: Ticker> Runner<E, T> {
    pub fn new(events: E, ticker: T) -> Self {
        Self { events, ticker }
    }

    pub fn step(&self) -> RaceEvent {
        match self.events.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => RaceEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("event source disconnected");
                RaceEvent::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn idle_step_ticks() {
        let (_tx, source) = ChannelEventSource::pair();
        let runner = Runner::new(source, FixedTicker::from_millis(1));
        assert_eq!(runner.step(), RaceEvent::Tick);
    }

    #[test]
    fn disconnected_source_reports_closed() {
        let (tx, source) = ChannelEventSource::pair();
        drop(tx);
        let runner = Runner::new(source, FixedTicker::from_millis(100));
        assert_eq!(runner.step(), RaceEvent::Closed);
        assert_eq!(runner.step(), RaceEvent::Closed);
    }

    #[test]
    fn queued_events_drain_before_closed() {
        let (tx, source) = ChannelEventSource::pair();
        tx.send(RaceEvent::Resize).unwrap();
        drop(tx);
        let runner = Runner::new(source, FixedTicker::from_millis(100));
        assert_eq!(runner.step(), RaceEvent::Resize);
        assert_eq!(runner.step(), RaceEvent::Closed);
    }

    #[test]
    fn queued_events_come_out_in_order() {
        let (tx, source) = ChannelEventSource::pair();
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        tx.send(RaceEvent::Key(key)).unwrap();
        tx.send(RaceEvent::Resize).unwrap();

        let runner = Runner::new(source, FixedTicker::from_millis(50));
        assert_eq!(runner.step(), RaceEvent::Key(key));
        assert_eq!(runner.step(), RaceEvent::Resize);
        assert_eq!(runner.step(), RaceEvent::Tick);
    }

    #[test]
    fn zero_interval_is_bumped() {
        assert_eq!(FixedTicker::from_millis(0).interval(), Duration::from_millis(1));
    }
}
