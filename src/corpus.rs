use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use rand::Rng;

/// Built-in race texts.
pub const BUILTIN_TEXTS: [&str; 20] = [
    "The quick brown fox jumps over the lazy dog near the riverbank.",
    "Racing through the digital highway, fingers dance across the keyboard with lightning speed.",
    "In the world of typing, accuracy and speed combine to create the perfect rhythm.",
    "Challenge yourself to reach new heights as each keystroke brings you closer to victory.",
    "Speed demons unite as we race through words, sentences, and paragraphs with precision.",
    "Master the art of typing through dedication, practice, and unwavering determination.",
    "Every champion was once a beginner who refused to give up on their dreams.",
    "The keyboard becomes an extension of your thoughts when you type at maximum velocity.",
    "Breaking records requires focus, skill, and the burning desire to be the best.",
    "Your fingers are the engine, your mind is the driver, and victory is the destination.",
    "Precision and velocity merge into one seamless motion as you dominate the track.",
    "Champions are made through countless hours of practice and relentless pursuit of excellence.",
    "The sweet sound of victory echoes through the digital realm as you cross the finish line.",
    "From novice to expert, every journey begins with a single keystroke and endless determination.",
    "Speed typing is not just a skill, it is an art form mastered through dedication.",
    "Conquer the leaderboard by combining lightning-fast reflexes with pinpoint accuracy.",
    "Your path to greatness is paved with practice, perseverance, and passion for perfection.",
    "In this race, your only opponent is yourself and your previous best performance.",
    "Unlock your true potential by pushing beyond your limits with every single race.",
    "The thrill of competition drives us forward as we chase the ultimate high score.",
];

/// The text a race is typed against. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RaceText(String);

impl RaceText {
    /// `None` for an empty string.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for RaceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-empty pool of race texts.
#[derive(Debug, Clone)]
pub struct Corpus {
    texts: Vec<RaceText>,
}

impl Corpus {
    pub fn builtin() -> Self {
        Self {
            texts: BUILTIN_TEXTS
                .iter()
                .map(|text| RaceText(text.to_string()))
                .collect(),
        }
    }

    /// One text per non-blank line; surrounding whitespace is trimmed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let texts: Vec<RaceText> = contents
            .lines()
            .filter_map(|line| RaceText::new(line.trim()))
            .collect();

        if texts.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no race texts in {}", path.as_ref().display()),
            ));
        }

        Ok(Self { texts })
    }

    pub fn texts(&self) -> &[RaceText] {
        &self.texts
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> RaceText {
        self.texts[rng.gen_range(0..self.texts.len())].clone()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Where the next race's text comes from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// Always race the same text.
    Fixed(RaceText),
    /// A random text from the pool each time.
    Random(Corpus),
}

impl TextSource {
    pub fn next_text<R: Rng + ?Sized>(&self, rng: &mut R) -> RaceText {
        match self {
            TextSource::Fixed(text) => text.clone(),
            TextSource::Random(corpus) => corpus.pick(rng),
        }
    }
}

impl Default for TextSource {
    fn default() -> Self {
        TextSource::Random(Corpus::builtin())
    }
}
