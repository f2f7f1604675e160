use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typing_racer::app::{App, AppState, Control};
use typing_racer::config::Config;
use typing_racer::corpus::{RaceText, TextSource};
use typing_racer::model::User;
use typing_racer::runtime::{ChannelEventSource, FixedTicker, RaceEvent, Runner};
use typing_racer::session::SessionStatus;
use typing_racer::store::{FileStore, Storage};
use typing_racer::timer::ManualClock;

fn key(code: KeyCode) -> RaceEvent {
    RaceEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless race through the runtime without a TTY: events go in over a
// channel, the runner hands them to the app one step at a time.
#[test]
fn headless_race_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let user = User::new("ghost", "ghost@example.com", "#06B6D4");

    let mut storage = Storage::new(FileStore::open(&path).unwrap());
    storage.save_user(&user).unwrap();
    storage.set_current_user(Some(&user)).unwrap();

    let clock = ManualClock::new();
    let mut app = App::with_clock(
        storage,
        user.clone(),
        TextSource::Fixed(RaceText::new("hi there").unwrap()),
        &Config::default(),
        clock.clone(),
    );

    let (tx, source) = ChannelEventSource::pair();
    let runner = Runner::new(source, FixedTicker::from_millis(5));

    tx.send(key(KeyCode::Enter)).unwrap();
    for c in "hi there".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Char('l'))).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();

    let mut quit = false;
    for _ in 0..100u32 {
        if app.handle(runner.step()).unwrap() == Control::Quit {
            quit = true;
            break;
        }
        clock.advance(Duration::from_millis(250));
    }

    assert!(quit, "escape should end the loop");
    assert_eq!(app.session().status(), SessionStatus::Finished);
    assert_eq!(app.state(), AppState::Leaderboard);
    assert_eq!(app.leaderboard().rows.len(), 1);

    // 8 characters over 8 keystroke gaps of 250ms is 48 WPM
    let report = app.report().unwrap();
    assert_eq!(report.session.wpm, 48);
    assert_eq!(report.session.accuracy, 100);

    let reopened = Storage::new(FileStore::open(&path).unwrap());
    assert_eq!(reopened.all_sessions().unwrap(), vec![report.session.clone()]);
    assert_eq!(
        reopened.current_user().unwrap().map(|u| u.total_games),
        Some(1)
    );
}

#[test]
fn idle_runner_only_ticks() {
    let (_tx, source) = ChannelEventSource::pair();
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(2)));
    for _ in 0..3 {
        assert_eq!(runner.step(), RaceEvent::Tick);
    }
}

#[test]
fn loop_ends_when_input_goes_away() {
    let user = User::new("ghost", "ghost@example.com", "#06B6D4");
    let mut app = App::with_clock(
        Storage::new(typing_racer::store::MemoryStore::new()),
        user,
        TextSource::Fixed(RaceText::new("hi there").unwrap()),
        &Config::default(),
        ManualClock::new(),
    );

    let (tx, source) = ChannelEventSource::pair();
    let runner = Runner::new(source, FixedTicker::from_millis(100));
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char('h'))).unwrap();
    drop(tx);

    let mut steps = 0;
    while app.handle(runner.step()).unwrap() == Control::Continue {
        steps += 1;
        assert!(steps < 10, "loop kept running after input closed");
    }
    assert_eq!(steps, 2);
    assert_eq!(app.session().typed(), "h");
}
