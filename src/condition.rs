use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed sky-state classification driving both visuals and display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Sunny,
        Condition::Cloudy,
        Condition::Rainy,
        Condition::Stormy,
        Condition::Snowy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "Sunny",
            Condition::Cloudy => "Cloudy",
            Condition::Rainy => "Rainy",
            Condition::Stormy => "Stormy",
            Condition::Snowy => "Snowy",
        }
    }

    /// Glyph used by text displays and the mock payload icon field.
    pub fn glyph(&self) -> &'static str {
        match self {
            Condition::Sunny => "☀️",
            Condition::Cloudy => "☁️",
            Condition::Rainy => "🌧️",
            Condition::Stormy => "⛈️",
            Condition::Snowy => "❄️",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two shapes an upstream condition arrives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCondition<'a> {
    Text(&'a str),
    Code(u16),
}

pub fn normalize(raw: RawCondition<'_>) -> Condition {
    match raw {
        RawCondition::Text(text) => from_text(text),
        RawCondition::Code(code) => from_code(code),
    }
}

// Storm keywords are checked first so "thunderstorm with rain" stays Stormy.
const KEYWORD_GROUPS: &[(&[&str], Condition)] = &[
    (&["storm", "thunder"], Condition::Stormy),
    (&["sun", "clear"], Condition::Sunny),
    (&["cloud"], Condition::Cloudy),
    (&["rain", "drizzle"], Condition::Rainy),
    (&["snow"], Condition::Snowy),
];

/// Classify a free-text description by case-insensitive keyword match.
pub fn from_text(text: &str) -> Condition {
    let lower = text.to_lowercase();

    KEYWORD_GROUPS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, condition)| *condition)
        .unwrap_or_default()
}

/// Map an OpenWeather condition id to a condition.
pub fn from_code(code: u16) -> Condition {
    match code {
        200..=232 => Condition::Stormy,
        300..=321 => Condition::Rainy,
        // Freezing rain is shown as snow.
        511 => Condition::Snowy,
        500..=531 => Condition::Rainy,
        600..=622 => Condition::Snowy,
        // Tornado
        781 => Condition::Stormy,
        701..=771 => Condition::Cloudy,
        800 => Condition::Sunny,
        801..=804 => Condition::Cloudy,
        _ => Condition::Sunny,
    }
}
