use std::collections::HashSet;
use std::ops::Deref;

use serde::Serialize;

/// Which metric an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AchievementKind {
    /// Words per minute of a single race.
    Speed,
    /// Accuracy percentage of a single race.
    Accuracy,
    /// Lifetime number of completed races.
    Games,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub kind: AchievementKind,
    pub title: &'static str,
    pub description: &'static str,
    /// Inclusive threshold for the metric named by `kind`.
    pub threshold: u32,
    pub icon: &'static str,
}

impl AchievementDefinition {
    /// Whether the metric selected by `kind` meets the threshold.
    pub fn is_met(&self, wpm: u32, accuracy: i32, total_games: u32) -> bool {
        match self.kind {
            AchievementKind::Speed => wpm >= self.threshold,
            AchievementKind::Accuracy => i64::from(accuracy) >= i64::from(self.threshold),
            AchievementKind::Games => total_games >= self.threshold,
        }
    }
}

const fn def(
    id: &'static str,
    kind: AchievementKind,
    title: &'static str,
    description: &'static str,
    threshold: u32,
    icon: &'static str,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        kind,
        title,
        description,
        threshold,
        icon,
    }
}

/// Every achievement, in display order.
pub static CATALOG: [AchievementDefinition; 11] = [
    def("speed_50", AchievementKind::Speed, "Speed Apprentice", "Reach 50 WPM", 50, "🚗"),
    def("speed_75", AchievementKind::Speed, "Speed Racer", "Reach 75 WPM", 75, "🏎️"),
    def("speed_100", AchievementKind::Speed, "Speed Demon", "Reach 100 WPM", 100, "🚀"),
    def("speed_125", AchievementKind::Speed, "Velocity Master", "Reach 125 WPM", 125, "⚡"),
    def("speed_150", AchievementKind::Speed, "Lightning Typer", "Reach 150 WPM", 150, "💫"),
    def("accuracy_95", AchievementKind::Accuracy, "Precision Driver", "Achieve 95% accuracy", 95, "🎯"),
    def("accuracy_98", AchievementKind::Accuracy, "Perfect Control", "Achieve 98% accuracy", 98, "💎"),
    def("accuracy_100", AchievementKind::Accuracy, "Flawless Victory", "Achieve 100% accuracy", 100, "👑"),
    def("games_10", AchievementKind::Games, "Getting Started", "Complete 10 races", 10, "🎮"),
    def("games_50", AchievementKind::Games, "Dedicated Racer", "Complete 50 races", 50, "🏁"),
    def("games_100", AchievementKind::Games, "Century Club", "Complete 100 races", 100, "💯"),
];

/// A catalog entry together with whether it is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub definition: &'static AchievementDefinition,
    pub unlocked: bool,
}

impl Deref for Achievement {
    type Target = AchievementDefinition;

    fn deref(&self) -> &Self::Target {
        self.definition
    }
}

/// All achievements whose threshold is met, in catalog order, each marked unlocked.
///
/// ```
/// use typing_racer::achievements::evaluate;
///
/// let unlocked = evaluate(50, 90, 5);
/// assert_eq!(unlocked.len(), 1);
/// assert_eq!(unlocked[0].id, "speed_50");
/// ```
pub fn evaluate(wpm: u32, accuracy: i32, total_games: u32) -> Vec<Achievement> {
    CATALOG
        .iter()
        .filter(|definition| definition.is_met(wpm, accuracy, total_games))
        .map(|definition| Achievement {
            definition,
            unlocked: true,
        })
        .collect()
}

/// The whole catalog with unlock flags derived from a player's best figures.
pub fn progress_for(best_wpm: u32, best_accuracy: i32, total_games: u32) -> Vec<Achievement> {
    CATALOG
        .iter()
        .map(|definition| Achievement {
            definition,
            unlocked: definition.is_met(best_wpm, best_accuracy, total_games),
        })
        .collect()
}

/// Entries of `evaluated` that are unlocked and not in `previously_unlocked`.
pub fn newly_unlocked(evaluated: &[Achievement], previously_unlocked: &HashSet<&str>) -> Vec<Achievement> {
    evaluated
        .iter()
        .filter(|achievement| achievement.unlocked && !previously_unlocked.contains(achievement.id))
        .copied()
        .collect()
}

/// Ids of the unlocked entries in `achievements`.
pub fn unlocked_ids(achievements: &[Achievement]) -> HashSet<&'static str> {
    achievements
        .iter()
        .filter(|achievement| achievement.unlocked)
        .map(|achievement| achievement.definition.id)
        .collect()
}
