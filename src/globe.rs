//! Globe scene model: city markers on a sphere with per-condition styling.
//!
//! There is no GPU here. The model holds positions, scales and animation
//! state so a front end (or the terminal dashboard) can draw whatever it likes.

use std::f64::consts::PI;

use serde::Serialize;

use crate::condition::Condition;
use crate::render::GlobeView;

/// Markers float just above the unit globe surface.
pub const MARKER_RADIUS: f64 = 1.1;
pub const HIGHLIGHT_SCALE: f64 = 1.5;

const ROTATION_STEP: f64 = 0.001;
const CLOUD_ROTATION_STEP: f64 = 0.0005;

/// Payload handed to the globe after each successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobeUpdate {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature: i64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub fn lat_lon_to_position(lat: f64, lon: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat) * (PI / 180.0);
    let theta = (lon + 180.0) * (PI / 180.0);

    Vec3 {
        x: -(radius * phi.sin() * theta.cos()),
        y: radius * phi.cos(),
        z: radius * phi.sin() * theta.sin(),
    }
}

pub fn marker_color(condition: Condition) -> u32 {
    match condition {
        Condition::Sunny => 0xffeb3b,
        Condition::Cloudy => 0x9e9e9e,
        Condition::Rainy => 0x2196f3,
        Condition::Stormy => 0x9c27b0,
        Condition::Snowy => 0xe3f2fd,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationKind {
    /// Vertical bob with a gentle sway (rain).
    Bob,
    /// Visibility toggles on a fixed frame cadence (storm).
    Flash,
    /// Slow bob with continuous spin (snow).
    Drift,
    /// Scale oscillates between bounds (highlighted city).
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationParams {
    pub step: f64,
    pub amplitude: f64,
    pub spin: f64,
    pub min: f64,
    pub max: f64,
    pub period: u32,
}

impl AnimationParams {
    const NONE: AnimationParams = AnimationParams {
        step: 0.0,
        amplitude: 0.0,
        spin: 0.0,
        min: 0.0,
        max: 0.0,
        period: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerAnimation {
    pub kind: AnimationKind,
    /// Accumulated time for wave animations; frame counter for flashes.
    pub phase: f64,
    pub params: AnimationParams,
    /// Pulse direction.
    pub growing: bool,
}

impl MarkerAnimation {
    pub fn bob() -> Self {
        Self::new(
            AnimationKind::Bob,
            AnimationParams {
                step: 0.1,
                amplitude: 0.02,
                spin: 0.1,
                ..AnimationParams::NONE
            },
        )
    }

    pub fn flash() -> Self {
        Self::new(
            AnimationKind::Flash,
            AnimationParams {
                period: 30,
                ..AnimationParams::NONE
            },
        )
    }

    pub fn drift() -> Self {
        Self::new(
            AnimationKind::Drift,
            AnimationParams {
                step: 0.05,
                amplitude: 0.01,
                spin: 0.02,
                ..AnimationParams::NONE
            },
        )
    }

    pub fn pulse() -> Self {
        Self::new(
            AnimationKind::Pulse,
            AnimationParams {
                step: 0.01,
                min: 1.3,
                max: 1.7,
                ..AnimationParams::NONE
            },
        )
    }

    fn new(kind: AnimationKind, params: AnimationParams) -> Self {
        Self {
            kind,
            phase: 0.0,
            params,
            growing: false,
        }
    }

    pub fn for_condition(condition: Condition) -> Option<Self> {
        match condition {
            Condition::Rainy => Some(Self::bob()),
            Condition::Stormy => Some(Self::flash()),
            Condition::Snowy => Some(Self::drift()),
            Condition::Sunny | Condition::Cloudy => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub city: String,
    pub temperature: i64,
    pub condition: Condition,
    pub color: u32,
    pub anchor: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f64,
    pub visible: bool,
    pub highlighted: bool,
    pub animation: Option<MarkerAnimation>,
    pub pulse: Option<MarkerAnimation>,
}

impl Marker {
    pub fn new(city: &str, lat: f64, lon: f64, temperature: i64, condition: Condition) -> Self {
        let anchor = lat_lon_to_position(lat, lon, MARKER_RADIUS);
        Self {
            city: city.to_string(),
            temperature,
            condition,
            color: marker_color(condition),
            anchor,
            position: anchor,
            rotation: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
            scale: 1.0,
            visible: true,
            highlighted: false,
            animation: MarkerAnimation::for_condition(condition),
            pulse: None,
        }
    }

    pub fn highlight(mut self) -> Self {
        self.highlighted = true;
        self.scale = HIGHLIGHT_SCALE;
        self.pulse = Some(MarkerAnimation::pulse());
        self
    }

    pub fn label(&self) -> String {
        format!("{}°", self.temperature)
    }

    fn advance(&mut self) {
        if let Some(anim) = self.animation.as_mut() {
            match anim.kind {
                AnimationKind::Bob => {
                    anim.phase += anim.params.step;
                    self.position.y = self.anchor.y + anim.phase.sin() * anim.params.amplitude;
                    self.rotation.z = anim.phase.sin() * anim.params.spin;
                }
                AnimationKind::Drift => {
                    anim.phase += anim.params.step;
                    self.position.y = self.anchor.y + anim.phase.sin() * anim.params.amplitude;
                    self.rotation.y += anim.params.spin;
                }
                AnimationKind::Flash => {
                    let frame = anim.phase as u32;
                    if anim.params.period > 0 && frame % anim.params.period == 0 {
                        // Frame 0 shows, the next boundary hides.
                        self.visible = (frame / anim.params.period) % 2 == 0;
                    }
                    anim.phase += 1.0;
                }
                AnimationKind::Pulse => {}
            }
        }

        if let Some(pulse) = self.pulse.as_mut() {
            let p = pulse.params;
            if pulse.growing {
                self.scale += p.step;
                if self.scale >= p.max {
                    pulse.growing = false;
                }
            } else {
                self.scale -= p.step;
                if self.scale <= p.min {
                    pulse.growing = true;
                }
            }
        }
    }
}

struct ReferenceCity {
    city: &'static str,
    lat: f64,
    lon: f64,
    temperature: i64,
    condition: Condition,
}

const REFERENCE_CITIES: [ReferenceCity; 6] = [
    ReferenceCity { city: "New York", lat: 40.7128, lon: -74.0060, temperature: 22, condition: Condition::Sunny },
    ReferenceCity { city: "London", lat: 51.5074, lon: -0.1278, temperature: 15, condition: Condition::Cloudy },
    ReferenceCity { city: "Tokyo", lat: 35.6762, lon: 139.6503, temperature: 18, condition: Condition::Rainy },
    ReferenceCity { city: "Sydney", lat: -33.8688, lon: 151.2093, temperature: 25, condition: Condition::Sunny },
    ReferenceCity { city: "Dubai", lat: 25.2048, lon: 55.2708, temperature: 35, condition: Condition::Sunny },
    ReferenceCity { city: "Moscow", lat: 55.7558, lon: 37.6173, temperature: 5, condition: Condition::Snowy },
];

#[derive(Debug, Clone)]
pub struct Globe {
    pub rotation_y: f64,
    pub cloud_rotation_y: f64,
    pub auto_rotate: bool,
    reference: Vec<Marker>,
    highlighted: Option<Marker>,
    updates: u64,
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}

impl Globe {
    pub fn new() -> Self {
        let reference = REFERENCE_CITIES
            .iter()
            .map(|c| Marker::new(c.city, c.lat, c.lon, c.temperature, c.condition))
            .collect();

        Self {
            rotation_y: 0.0,
            cloud_rotation_y: 0.0,
            auto_rotate: true,
            reference,
            highlighted: None,
            updates: 0,
        }
    }

    pub fn reference_markers(&self) -> &[Marker] {
        &self.reference
    }

    pub fn highlighted(&self) -> Option<&Marker> {
        self.highlighted.as_ref()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.reference.iter().chain(self.highlighted.iter())
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Advance the scene by one frame.
    pub fn tick(&mut self) {
        if self.auto_rotate {
            self.rotation_y += ROTATION_STEP;
        }
        self.cloud_rotation_y += CLOUD_ROTATION_STEP;

        for marker in self.reference.iter_mut().chain(self.highlighted.iter_mut()) {
            marker.advance();
        }
    }
}

impl GlobeView for Globe {
    fn update_weather_data(&mut self, update: &GlobeUpdate) {
        tracing::debug!(
            "Globe highlight -> {} ({:.4}, {:.4}) {}",
            update.city,
            update.lat,
            update.lon,
            update.condition
        );
        let marker = Marker::new(
            &update.city,
            update.lat,
            update.lon,
            update.temperature,
            update.condition,
        )
        .highlight();
        self.highlighted = Some(marker);
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_position_on_sphere() {
        let north = lat_lon_to_position(90.0, 0.0, MARKER_RADIUS);
        assert!(approx(north.y, MARKER_RADIUS));
        assert!(approx(north.x, 0.0));

        let p = lat_lon_to_position(35.6762, 139.6503, MARKER_RADIUS);
        let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
        assert!(approx(r, MARKER_RADIUS));
    }

    #[test]
    fn test_prime_meridian_faces_positive_x() {
        let p = lat_lon_to_position(0.0, 0.0, 1.0);
        assert!(approx(p.x, 1.0));
        assert!(approx(p.y, 0.0));
    }

    #[test]
    fn test_reference_markers_present() {
        let globe = Globe::new();
        let cities: Vec<_> = globe.reference_markers().iter().map(|m| m.city.as_str()).collect();
        assert_eq!(cities, vec!["New York", "London", "Tokyo", "Sydney", "Dubai", "Moscow"]);
        assert!(globe.highlighted().is_none());
        assert_eq!(globe.markers().count(), 6);
    }

    #[test]
    fn test_update_replaces_highlight() {
        let mut globe = Globe::new();
        let paris = GlobeUpdate {
            city: "Paris".to_string(),
            lat: 48.8566,
            lon: 2.3522,
            temperature: 18,
            condition: Condition::Cloudy,
        };
        let oslo = GlobeUpdate {
            city: "Oslo".to_string(),
            lat: 59.9139,
            lon: 10.7522,
            temperature: -3,
            condition: Condition::Snowy,
        };

        globe.update_weather_data(&paris);
        globe.update_weather_data(&oslo);

        let highlighted: Vec<_> = globe.markers().filter(|m| m.highlighted).collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].city, "Oslo");
        assert_eq!(highlighted[0].label(), "-3°");
        assert_eq!(highlighted[0].color, 0xe3f2fd);
        assert_eq!(globe.markers().count(), 7);
    }

    #[test]
    fn test_pulse_stays_in_bounds() {
        let mut globe = Globe::new();
        globe.update_weather_data(&GlobeUpdate {
            city: "Tokyo".to_string(),
            lat: 35.6762,
            lon: 139.6503,
            temperature: 24,
            condition: Condition::Sunny,
        });

        let mut seen_min = f64::MAX;
        for _ in 0..200 {
            globe.tick();
            let scale = globe.highlighted().map(|m| m.scale).unwrap_or_default();
            assert!(scale > 1.28 && scale < 1.72, "scale {scale}");
            seen_min = seen_min.min(scale);
        }
        // First leg shrinks from 1.5.
        assert!(seen_min < 1.31);
    }

    #[test]
    fn test_storm_marker_flashes() {
        let mut marker = Marker::new("Miami", 25.76, -80.19, 30, Condition::Stormy);
        marker.advance();
        assert!(marker.visible);
        for _ in 0..30 {
            marker.advance();
        }
        assert!(!marker.visible);
    }

    #[test]
    fn test_tick_rotates() {
        let mut globe = Globe::new();
        for _ in 0..10 {
            globe.tick();
        }
        assert!(approx(globe.rotation_y, 0.01));
        assert!(approx(globe.cloud_rotation_y, 0.005));
    }

    #[test]
    fn test_rain_marker_bobs_around_anchor() {
        let mut marker = Marker::new("Tokyo", 35.6762, 139.6503, 18, Condition::Rainy);
        for _ in 0..50 {
            marker.advance();
            assert!((marker.position.y - marker.anchor.y).abs() <= 0.02 + 1e-12);
        }
    }
}
