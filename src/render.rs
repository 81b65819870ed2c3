//! Applies snapshots to the display, effect and globe collaborators.

use serde::Serialize;

use crate::condition::Condition;
use crate::effects::{select_effect, EffectProfile};
use crate::globe::GlobeUpdate;
use crate::snapshot::{DayPoint, HourPoint, WeatherSnapshot};
use crate::utils::round_whole;

/// Surface for the textual dashboard content.
///
/// Every method replaces its whole region; implementations never merge.
pub trait DisplaySurface {
    fn show_primary(&mut self, primary: PrimaryDisplay);
    fn replace_hourly(&mut self, hours: Vec<HourWidget>);
    fn replace_daily(&mut self, days: Vec<DayWidget>);
}

/// Background visual layer. Holds at most one active effect.
pub trait EffectLayer {
    fn clear(&mut self);
    fn install(&mut self, profile: &EffectProfile);
}

pub trait GlobeView {
    fn update_weather_data(&mut self, update: &GlobeUpdate);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryDisplay {
    pub city: String,
    pub country: String,
    pub temperature: String,
    pub condition: Condition,
    pub icon: &'static str,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
}

impl PrimaryDisplay {
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self {
            city: snapshot.city.clone(),
            country: snapshot.country.clone(),
            temperature: degrees(snapshot.temperature_c),
            condition: snapshot.condition,
            icon: select_effect(snapshot.condition).icon.token(),
            feels_like: degrees(snapshot.feels_like_c),
            humidity: format!("{}%", snapshot.humidity_pct),
            wind: format!("{} km/h", round_whole(snapshot.wind_kph)),
            pressure: format!("{} hPa", round_whole(snapshot.pressure_mb)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourWidget {
    pub time: String,
    pub temperature: String,
    pub condition: Condition,
    pub glyph: &'static str,
}

impl From<&HourPoint> for HourWidget {
    fn from(hour: &HourPoint) -> Self {
        Self {
            time: hour.time.clone(),
            temperature: degrees(hour.temp_c),
            condition: hour.condition,
            glyph: hour.condition.glyph(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayWidget {
    pub label: String,
    pub high: String,
    pub low: String,
    pub condition: Condition,
    pub glyph: &'static str,
}

impl From<&DayPoint> for DayWidget {
    fn from(day: &DayPoint) -> Self {
        Self {
            label: day.label.clone(),
            high: degrees(day.high_c),
            low: degrees(day.low_c),
            condition: day.condition,
            glyph: day.condition.glyph(),
        }
    }
}

fn degrees(celsius: f64) -> String {
    format!("{}°", round_whole(celsius))
}

/// Position of a render in initiation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Applied,
    /// A later-initiated render had already been applied.
    Superseded,
}

/// Last-initiated-wins renderer over the three collaborators.
pub struct RenderCoordinator<D, E, G> {
    display: D,
    effects: E,
    globe: G,
    next_ticket: u64,
    applied: Option<RenderTicket>,
}

impl<D, E, G> RenderCoordinator<D, E, G>
where
    D: DisplaySurface,
    E: EffectLayer,
    G: GlobeView,
{
    pub fn new(display: D, effects: E, globe: G) -> Self {
        Self {
            display,
            effects,
            globe,
            next_ticket: 1,
            applied: None,
        }
    }

    /// Reserve the next ticket. Call when the operation starts, not when it ends.
    pub fn begin(&mut self) -> RenderTicket {
        let ticket = RenderTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    pub fn is_stale(&self, ticket: RenderTicket) -> bool {
        self.applied.map_or(false, |applied| ticket < applied)
    }

    pub fn last_applied(&self) -> Option<RenderTicket> {
        self.applied
    }

    pub fn render(&mut self, ticket: RenderTicket, snapshot: &WeatherSnapshot) -> RenderOutcome {
        if self.is_stale(ticket) {
            tracing::debug!(
                "Dropping render #{} for {}; #{} already shown",
                ticket.0,
                snapshot.city,
                self.applied.map(|t| t.0).unwrap_or_default()
            );
            return RenderOutcome::Superseded;
        }

        self.display.show_primary(PrimaryDisplay::from_snapshot(snapshot));

        let profile = select_effect(snapshot.condition);
        self.effects.clear();
        self.effects.install(&profile);

        self.display
            .replace_hourly(snapshot.hourly.iter().map(HourWidget::from).collect());
        self.display
            .replace_daily(snapshot.daily.iter().map(DayWidget::from).collect());

        self.globe.update_weather_data(&GlobeUpdate {
            city: snapshot.city.clone(),
            lat: snapshot.lat,
            lon: snapshot.lon,
            temperature: round_whole(snapshot.temperature_c),
            condition: snapshot.condition,
        });

        self.applied = Some(ticket);
        tracing::debug!("Rendered #{} for {}", ticket.0, snapshot.city);
        RenderOutcome::Applied
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    pub fn globe(&self) -> &G {
        &self.globe
    }

    pub fn globe_mut(&mut self) -> &mut G {
        &mut self.globe
    }
}

/// Headless display that keeps the latest content of each region.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    pub primary: Option<PrimaryDisplay>,
    pub hourly: Vec<HourWidget>,
    pub daily: Vec<DayWidget>,
    pub writes: usize,
}

impl DisplaySurface for RecordingDisplay {
    fn show_primary(&mut self, primary: PrimaryDisplay) {
        self.primary = Some(primary);
        self.writes += 1;
    }

    fn replace_hourly(&mut self, hours: Vec<HourWidget>) {
        self.hourly = hours;
        self.writes += 1;
    }

    fn replace_daily(&mut self, days: Vec<DayWidget>) {
        self.daily = days;
        self.writes += 1;
    }
}
