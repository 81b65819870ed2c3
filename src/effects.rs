//! Condition → visual effect mapping.
//!
//! Everything here is a pure table lookup; the profiles are compared by value
//! in tests and recomputed on every render.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgba()` string with the given alpha.
    pub fn rgba(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Sun,
    Cloud,
    CloudRain,
    Bolt,
    Snowflake,
}

impl Icon {
    pub fn token(&self) -> &'static str {
        match self {
            Icon::Sun => "fas fa-sun text-yellow-400",
            Icon::Cloud => "fas fa-cloud text-gray-300",
            Icon::CloudRain => "fas fa-cloud-rain text-blue-300",
            Icon::Bolt => "fas fa-bolt text-yellow-300",
            Icon::Snowflake => "fas fa-snowflake text-blue-100",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Float,
    Bounce,
    Lightning,
    Spin,
}

impl Animation {
    pub fn token(&self) -> &'static str {
        match self {
            Animation::Float => "float",
            Animation::Bounce => "animate-bounce",
            Animation::Lightning => "lightning",
            Animation::Spin => "animate-spin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Background {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
}

impl Background {
    pub fn class(&self) -> &'static str {
        match self {
            Background::Sunny => "weather-bg-sunny",
            Background::Cloudy => "weather-bg-cloudy",
            Background::Rainy => "weather-bg-rainy",
            Background::Stormy => "weather-bg-stormy",
            Background::Snowy => "weather-bg-snowy",
        }
    }
}

/// How particles move once spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleMotion {
    /// Wander and bounce off the edges.
    Bounce,
    /// Always fall; wrap to the top at a random column.
    Fall,
    /// Drift sideways while falling; wrap to the top.
    Drift,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleProfile {
    pub count: usize,
    pub color: Rgb,
    /// Upper bound on per-particle velocity, in pixels per frame.
    pub speed: f64,
    /// Upper bound on the random particle radius, in pixels.
    pub size: f64,
    pub motion: ParticleMotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectProfile {
    pub icon: Icon,
    pub animation: Option<Animation>,
    pub particles: ParticleProfile,
    pub background: Background,
}

pub fn select_effect(condition: Condition) -> EffectProfile {
    match condition {
        Condition::Sunny => EffectProfile {
            icon: Icon::Sun,
            animation: Some(Animation::Float),
            particles: ParticleProfile {
                count: 50,
                color: Rgb::new(255, 215, 0),
                speed: 0.5,
                size: 2.0,
                motion: ParticleMotion::Bounce,
            },
            background: Background::Sunny,
        },
        Condition::Cloudy => EffectProfile {
            icon: Icon::Cloud,
            animation: None,
            particles: ParticleProfile {
                count: 50,
                color: Rgb::new(200, 200, 200),
                speed: 0.3,
                size: 3.0,
                motion: ParticleMotion::Bounce,
            },
            background: Background::Cloudy,
        },
        Condition::Rainy => EffectProfile {
            icon: Icon::CloudRain,
            animation: Some(Animation::Bounce),
            particles: ParticleProfile {
                count: 200,
                color: Rgb::new(100, 149, 237),
                speed: 5.0,
                size: 2.0,
                motion: ParticleMotion::Fall,
            },
            background: Background::Rainy,
        },
        Condition::Stormy => EffectProfile {
            icon: Icon::Bolt,
            animation: Some(Animation::Lightning),
            particles: ParticleProfile {
                count: 200,
                color: Rgb::new(50, 50, 100),
                speed: 8.0,
                size: 2.0,
                motion: ParticleMotion::Fall,
            },
            background: Background::Stormy,
        },
        Condition::Snowy => EffectProfile {
            icon: Icon::Snowflake,
            animation: Some(Animation::Spin),
            particles: ParticleProfile {
                count: 150,
                color: Rgb::new(255, 255, 255),
                speed: 2.0,
                size: 4.0,
                motion: ParticleMotion::Drift,
            },
            background: Background::Snowy,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_counts() {
        let counts: Vec<_> = Condition::ALL
            .iter()
            .map(|c| select_effect(*c).particles.count)
            .collect();
        assert_eq!(counts, vec![50, 50, 200, 200, 150]);
    }

    #[test]
    fn test_cloudy_has_no_animation() {
        assert_eq!(select_effect(Condition::Cloudy).animation, None);
        for condition in [Condition::Sunny, Condition::Rainy, Condition::Stormy, Condition::Snowy] {
            assert!(select_effect(condition).animation.is_some());
        }
    }

    #[test]
    fn test_selection_is_stable() {
        for condition in Condition::ALL {
            assert_eq!(select_effect(condition), select_effect(condition));
        }
    }

    #[test]
    fn test_backgrounds_are_distinct() {
        let classes: Vec<_> = Condition::ALL
            .iter()
            .map(|c| select_effect(*c).background.class())
            .collect();
        assert_eq!(
            classes,
            vec![
                "weather-bg-sunny",
                "weather-bg-cloudy",
                "weather-bg-rainy",
                "weather-bg-stormy",
                "weather-bg-snowy"
            ]
        );
    }

    #[test]
    fn test_rgba() {
        assert_eq!(Rgb::new(1, 2, 3).rgba(0.5), "rgba(1, 2, 3, 0.50)");
    }
}
