use std::io;
use std::path::Path;

use serde::Serialize;

use crate::model::CompletedSession;

/// One line of the exported race history.
#[derive(Debug, Serialize)]
struct HistoryRecord<'a> {
    date: String,
    username: &'a str,
    wpm: u32,
    accuracy: i32,
    time_taken_seconds: f64,
    text_length: usize,
    personal_best: bool,
}

impl<'a> From<&'a CompletedSession> for HistoryRecord<'a> {
    fn from(session: &'a CompletedSession) -> Self {
        Self {
            date: session.created_at.to_rfc3339(),
            username: &session.username,
            wpm: session.wpm,
            accuracy: session.accuracy,
            time_taken_seconds: session.time_taken_seconds,
            text_length: session.text_length,
            personal_best: session.is_personal_best,
        }
    }
}

/// Write `sessions` as CSV with a header row.
pub fn write_history<W: io::Write>(writer: W, sessions: &[CompletedSession]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for session in sessions {
        out.serialize(HistoryRecord::from(session))?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_history<P: AsRef<Path>>(path: P, sessions: &[CompletedSession]) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_history(file, sessions)
}
