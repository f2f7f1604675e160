pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::App;
use crate::scoring::ScoreSnapshot;
use crate::session::{CharState, TypingSession};
use crate::store::KeyValueStore;
use crate::timer::Clock;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl<K: KeyValueStore, C: Clock + Clone> Widget for &App<K, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.state(), self.session().status()).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Area left after the screen margins, never larger than `area`.
fn inner(area: Rect) -> Rect {
    let h = HORIZONTAL_MARGIN.min(area.width / 4);
    let v = VERTICAL_MARGIN.min(area.height / 4);
    Rect {
        x: area.x + h,
        y: area.y + v,
        width: area.width.saturating_sub(h * 2),
        height: area.height.saturating_sub(v * 2),
    }
}

/// Player's car color, cyan when the stored value does not parse.
fn avatar_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Cyan)
}

/// The target text colored by what has been typed so far.
fn race_text<C: Clock>(session: &TypingSession<C>) -> Line<'static> {
    let correct = bold().fg(Color::Green);
    let wrong = bold().fg(Color::Red);
    let cursor = dim_bold().add_modifier(Modifier::UNDERLINED);
    let pending = dim_bold();

    session
        .char_states()
        .map(|(expected, state)| match state {
            CharState::Correct => Span::styled(expected.to_string(), correct),
            CharState::Wrong(typed) => Span::styled(
                match typed {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                wrong,
            ),
            CharState::Cursor => Span::styled(expected.to_string(), cursor),
            CharState::Pending => Span::styled(expected.to_string(), pending),
        })
        .collect::<Vec<_>>()
        .into()
}

fn stats_line(snapshot: ScoreSnapshot, progress: f64) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "{} wpm   {}% acc   {}s   {:.0}%",
            snapshot.wpm, snapshot.accuracy, snapshot.elapsed_seconds, progress
        ),
        bold(),
    ))
}

/// Key legend shown at the bottom of every screen.
fn legend(keys: &[(&str, &str)]) -> Line<'static> {
    let text = keys
        .iter()
        .map(|(key, action)| format!("({key}) {action}"))
        .collect::<Vec<_>>()
        .join(" / ");
    Line::from(Span::styled(text, italic()))
}
