use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{avatar_color, bold, dim_bold, inner, italic, legend, race_text, stats_line};
use crate::app::{App, AppState};
use crate::leaderboard::{LeaderboardRow, EMPTY_MESSAGE};
use crate::session::{SessionStatus, TypingSession};
use crate::store::KeyValueStore;
use crate::timer::Clock;

/// One full-screen view of the app.
pub trait Screen<K: KeyValueStore, C: Clock + Clone> {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer);
}

pub struct ReadyScreen;
pub struct RaceScreen;
pub struct ResultsScreen;
pub struct LeaderboardScreen;
pub struct ProfileScreen;

pub fn current_screen<K: KeyValueStore, C: Clock + Clone>(
    state: AppState,
    status: SessionStatus,
) -> Box<dyn Screen<K, C>> {
    match (state, status) {
        (AppState::Leaderboard, _) => Box::new(LeaderboardScreen),
        (AppState::Profile, _) => Box::new(ProfileScreen),
        (AppState::Race, SessionStatus::NotStarted) => Box::new(ReadyScreen),
        (AppState::Race, SessionStatus::Running | SessionStatus::Paused) => Box::new(RaceScreen),
        (AppState::Race, SessionStatus::Finished) => Box::new(ResultsScreen),
    }
}

/// Rows the race text needs at `width` columns.
fn text_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let text_width = text.width();
    if text_width <= width {
        1
    } else {
        (text_width.div_ceil(width) + 1) as u16
    }
}

fn race_text_widget<C: Clock>(session: &TypingSession<C>, single_line: bool) -> Paragraph<'static> {
    Paragraph::new(race_text(session))
        .alignment(if single_line {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
}

fn player_line(username: &str, color: &str, detail: String) -> Line<'static> {
    Line::from(vec![
        Span::styled("■ ", Style::default().fg(avatar_color(color))),
        Span::styled(username.to_string(), bold()),
        Span::styled(format!("   {detail}"), dim_bold()),
    ])
}

impl<K: KeyValueStore, C: Clock + Clone> Screen<K, C> for ReadyScreen {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer) {
        let area = inner(area);
        let session = app.session();
        let user = app.user();
        let lines = text_height(session.target().as_str(), area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(lines),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled("TYPING RACER", bold().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(player_line(
            &user.username,
            &user.avatar_color,
            format!("best {} wpm   {} races", user.best_wpm, user.total_games),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        race_text_widget(session, lines == 1).render(chunks[3], buf);

        Paragraph::new(legend(&[
            ("enter", "start"),
            ("n", "new text"),
            ("l", "leaderboard"),
            ("p", "profile"),
            ("esc", "quit"),
        ]))
        .render(chunks[5], buf);
    }
}

impl<K: KeyValueStore, C: Clock + Clone> Screen<K, C> for RaceScreen {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer) {
        let area = inner(area);
        let session = app.session();
        let user = app.user();
        let paused = session.status() == SessionStatus::Paused;
        let lines = text_height(session.target().as_str(), area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(lines),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let progress = session.progress();
        Gauge::default()
            .block(Block::bordered().title(Span::styled(format!(" {} ", user.username), bold())))
            .gauge_style(Style::default().fg(avatar_color(&user.avatar_color)))
            .ratio((progress / 100.0).clamp(0.0, 1.0))
            .label(format!("{progress:.0}%"))
            .render(chunks[0], buf);

        Paragraph::new(stats_line(session.snapshot(), progress))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        race_text_widget(session, lines == 1).render(chunks[3], buf);

        if paused {
            Paragraph::new(Span::styled(
                "PAUSED - press Tab to resume",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
        }

        let keys: &[(&str, &str)] = if paused {
            &[
                ("tab", "resume"),
                ("n", "new race"),
                ("l", "leaderboard"),
                ("p", "profile"),
                ("esc", "quit"),
            ]
        } else {
            &[("tab", "pause"), ("ctrl+n", "new race"), ("esc", "quit")]
        };
        Paragraph::new(legend(keys)).render(chunks[6], buf);
    }
}

impl<K: KeyValueStore, C: Clock + Clone> Screen<K, C> for ResultsScreen {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer) {
        let area = inner(area);
        let session = app.session();

        let mut lines = vec![
            Line::from(Span::styled("Race complete!", bold().fg(Color::Yellow))),
            Line::default(),
        ];

        match app.report() {
            Some(report) => {
                let race = &report.session;
                lines.push(Line::from(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {:.1}s   {} errors",
                        race.wpm,
                        race.accuracy,
                        race.time_taken_seconds,
                        session.error_count()
                    ),
                    bold(),
                )));
                if race.is_personal_best {
                    lines.push(Line::from(Span::styled(
                        "NEW PERSONAL BEST",
                        bold().fg(Color::Green),
                    )));
                }
                lines.push(Line::default());

                if report.newly_unlocked.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("{} achievements met this race", report.achievements.len()),
                        dim_bold(),
                    )));
                } else {
                    lines.push(Line::from(Span::styled("New achievements", bold())));
                    lines.extend(report.newly_unlocked.iter().map(|achievement| {
                        Line::from(vec![
                            Span::raw(format!("{} ", achievement.icon)),
                            Span::styled(achievement.title, bold().fg(Color::Magenta)),
                            Span::styled(format!(" - {}", achievement.description), italic()),
                        ])
                    }));
                }
            }
            None => {
                let snapshot = session.snapshot();
                lines.push(Line::from(Span::styled(
                    format!("{} wpm   {}% acc", snapshot.wpm, snapshot.accuracy),
                    bold(),
                )));
            }
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new(legend(&[
            ("n", "new race"),
            ("l", "leaderboard"),
            ("p", "profile"),
            ("esc", "quit"),
        ]))
        .render(chunks[1], buf);
    }
}

fn leaderboard_row(row: &LeaderboardRow) -> Row<'static> {
    let rank = match row.medal() {
        Some(medal) => format!("{} {}", medal.icon(), row.rank),
        None => format!("   {}", row.rank),
    };
    let badges = [(row.is_current_user, "YOU"), (row.is_personal_best, "PB")]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, badge)| *badge)
        .collect::<Vec<_>>()
        .join(" ");

    let style = if row.is_current_user {
        bold().fg(Color::Blue)
    } else {
        Style::default()
    };

    Row::new(vec![
        rank,
        row.username.clone(),
        format!("{} wpm", row.wpm),
        format!("{}%", row.accuracy),
        row.created_at.format("%Y-%m-%d").to_string(),
        badges,
    ])
    .style(style)
}

impl<K: KeyValueStore, C: Clock + Clone> Screen<K, C> for LeaderboardScreen {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer) {
        let area = inner(area);
        let board = app.leaderboard();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled("LEADERBOARD", bold().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        if board.is_empty() {
            Paragraph::new(Span::styled(EMPTY_MESSAGE, italic()))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        } else {
            Table::new(
                board.rows.iter().map(leaderboard_row),
                [
                    Constraint::Length(6),
                    Constraint::Min(10),
                    Constraint::Length(8),
                    Constraint::Length(5),
                    Constraint::Length(10),
                    Constraint::Length(6),
                ],
            )
            .header(Row::new(["Rank", "Player", "Speed", "Acc", "Date", ""]).style(dim_bold()))
            .column_spacing(2)
            .render(chunks[1], buf);
        }

        Paragraph::new(legend(&[("b", "back"), ("p", "profile"), ("n", "new race"), ("esc", "quit")]))
            .render(chunks[2], buf);
    }
}

impl<K: KeyValueStore, C: Clock + Clone> Screen<K, C> for ProfileScreen {
    fn render(&self, app: &App<K, C>, area: Rect, buf: &mut Buffer) {
        let area = inner(area);
        let Some(profile) = app.profile() else {
            return;
        };
        let user = &profile.user;

        let average = match (profile.mean_wpm, profile.wpm_std_dev) {
            (Some(mean), Some(sd)) => format!("{mean:.1} ± {sd:.1} wpm"),
            _ => "-".to_string(),
        };

        let mut lines = vec![
            player_line(&user.username, &user.avatar_color, user.email.clone()),
            Line::default(),
            Line::from(Span::styled(
                format!(
                    "Races: {}   Best: {} wpm   Best accuracy: {}%   Average: {}",
                    user.total_games, user.best_wpm, user.best_accuracy, average
                ),
                bold(),
            )),
            Line::default(),
            Line::from(Span::styled(
                format!(
                    "Achievements {}/{}",
                    profile.unlocked_count(),
                    profile.achievements.len()
                ),
                bold(),
            )),
        ];

        lines.extend(profile.achievements.iter().map(|achievement| {
            let style = if achievement.unlocked {
                bold().fg(Color::Magenta)
            } else {
                dim_bold()
            };
            Line::from(vec![
                Span::raw(if achievement.unlocked { "[x] " } else { "[ ] " }),
                Span::raw(format!("{} ", achievement.icon)),
                Span::styled(achievement.title, style),
                Span::styled(format!(" - {}", achievement.description), italic()),
            ])
        }));

        let header_height = lines.len() as u16 + 1;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(lines).render(chunks[0], buf);

        Table::new(
            profile.recent_sessions.iter().map(|race| {
                Row::new(vec![
                    race.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    format!("{} wpm", race.wpm),
                    format!("{}%", race.accuracy),
                    format!("{:.1}s", race.time_taken_seconds),
                    if race.is_personal_best { "PB" } else { "" }.to_string(),
                ])
            }),
            [
                Constraint::Length(16),
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(3),
            ],
        )
        .header(Row::new(["Recent races", "Speed", "Acc", "Time", ""]).style(dim_bold()))
        .column_spacing(2)
        .render(chunks[1], buf);

        Paragraph::new(legend(&[("b", "back"), ("l", "leaderboard"), ("n", "new race"), ("esc", "quit")]))
            .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_takes_one_line() {
        assert_eq!(text_height("hello", 80), 1);
    }

    #[test]
    fn long_text_gets_a_spare_line() {
        let text = "a".repeat(100);
        assert_eq!(text_height(&text, 40), 4);
        assert_eq!(text_height(&text, 0), 101);
    }
}
