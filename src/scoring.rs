use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::round_half_up;

/// Characters that make up one "word" for WPM purposes.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute for `correct_characters` typed over `elapsed_seconds`.
///
/// Returns 0 while no time can be measured yet (zero, negative or non-finite
/// elapsed time). There is no upper bound: finishing a short text in a fraction
/// of a second produces a very large figure.
///
/// ```
/// use typing_racer::scoring::compute_wpm;
///
/// assert_eq!(compute_wpm(250, 60.0), 50);
/// assert_eq!(compute_wpm(250, 0.0), 0);
/// ```
pub fn compute_wpm(correct_characters: usize, elapsed_seconds: f64) -> u32 {
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return 0;
    }

    let words = correct_characters as f64 / CHARS_PER_WORD;
    let minutes = elapsed_seconds / 60.0;

    round_half_up(words / minutes) as u32
}

/// Percentage of `total_characters` that were not errors, rounded.
///
/// An empty input is vacuously perfect. Errors are mismatched positions, so the
/// caller guarantees `error_count <= total_characters`; breaking that yields a
/// negative value rather than a panic.
pub fn compute_accuracy(total_characters: usize, error_count: usize) -> i32 {
    if total_characters == 0 {
        return 100;
    }

    let total = total_characters as f64;
    let correct = total_characters as i64 - error_count as i64;

    round_half_up((correct as f64 / total) * 100.0) as i32
}

/// Live figures shown while a race is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub wpm: u32,
    pub accuracy: i32,
    pub elapsed_seconds: u64,
}

impl ScoreSnapshot {
    /// Measure the typed prefix so far.
    ///
    /// Elapsed time is truncated to whole seconds, so the live WPM stays at 0
    /// during the first second of a race.
    pub fn measure(typed_characters: usize, error_count: usize, elapsed: Duration) -> Self {
        let elapsed_seconds = elapsed.as_secs();

        Self {
            wpm: compute_wpm(typed_characters, elapsed_seconds as f64),
            accuracy: compute_accuracy(typed_characters, error_count),
            elapsed_seconds,
        }
    }
}

impl Default for ScoreSnapshot {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            elapsed_seconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wpm_is_zero_without_elapsed_time() {
        for chars in [0, 1, 250, 10_000] {
            assert_eq!(compute_wpm(chars, 0.0), 0);
            assert_eq!(compute_wpm(chars, -3.5), 0);
            assert_eq!(compute_wpm(chars, f64::NAN), 0);
        }
    }

    #[test]
    fn wpm_uses_five_characters_per_word() {
        assert_eq!(compute_wpm(250, 60.0), 50);
        assert_eq!(compute_wpm(50, 60.0), 10);
        assert_eq!(compute_wpm(100, 120.0), 10);
        assert_eq!(compute_wpm(25, 30.0), 10);
    }

    #[test]
    fn wpm_rounds_half_up() {
        // 13 chars in 60s = 2.6 words
        assert_eq!(compute_wpm(13, 60.0), 3);
        // 12 chars in 60s = 2.4 words
        assert_eq!(compute_wpm(12, 60.0), 2);
        // 15 chars in 120s = 1.5 wpm
        assert_eq!(compute_wpm(15, 120.0), 2);
    }

    #[test]
    fn wpm_is_unbounded_for_tiny_elapsed_time() {
        assert_eq!(compute_wpm(60, 0.5), 1440);
    }

    #[test]
    fn accuracy_of_empty_input_is_perfect() {
        assert_eq!(compute_accuracy(0, 0), 100);
        assert_eq!(compute_accuracy(0, 7), 100);
    }

    #[test]
    fn accuracy_bounds() {
        for total in [1, 5, 63, 1000] {
            assert_eq!(compute_accuracy(total, 0), 100);
            assert_eq!(compute_accuracy(total, total), 0);
        }
    }

    #[test]
    fn accuracy_rounds() {
        assert_eq!(compute_accuracy(3, 1), 67);
        assert_eq!(compute_accuracy(8, 1), 88); // 87.5
        assert_eq!(compute_accuracy(63, 3), 95);
    }

    #[test]
    fn accuracy_goes_negative_when_caller_invariant_breaks() {
        assert_eq!(compute_accuracy(4, 8), -100);
    }

    #[test]
    fn snapshot_truncates_elapsed_seconds() {
        let snapshot = ScoreSnapshot::measure(50, 5, Duration::from_millis(60_900));
        assert_eq!(snapshot.elapsed_seconds, 60);
        assert_eq!(snapshot.wpm, 10);
        assert_eq!(snapshot.accuracy, 90);

        let early = ScoreSnapshot::measure(4, 0, Duration::from_millis(900));
        assert_eq!(early.wpm, 0);
        assert_eq!(early.accuracy, 100);
    }

    #[test]
    fn default_snapshot_matches_an_unstarted_race() {
        assert_eq!(
            ScoreSnapshot::default(),
            ScoreSnapshot {
                wpm: 0,
                accuracy: 100,
                elapsed_seconds: 0
            }
        );
    }
}
