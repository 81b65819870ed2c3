//! Search lifecycle: loading, success or fallback, history and suggestions.
//!
//! The session never awaits while holding state. A search is split into
//! `begin_search` (allocates the render ticket) and `complete_search`
//! (consumes the fetch result), with the network call in between. Callers
//! that want overlapping searches drive the two halves themselves; `search`
//! does both for the common case.

use std::time::{Duration, Instant};

use chrono::Utc;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::client::{UpstreamError, WeatherSource};
use crate::forecast::mock::fallback_snapshot;
use crate::forecast::types::WeatherPayload;
use crate::history::{HistoryStore, SearchHistory};
use crate::render::{DisplaySurface, EffectLayer, GlobeView, RenderCoordinator, RenderOutcome, RenderTicket};
use crate::snapshot::WeatherSnapshot;
use crate::transform::transform;

pub const POPULAR_CITIES: [&str; 25] = [
    "New York", "London", "Tokyo", "Paris", "Sydney",
    "Berlin", "Mumbai", "Moscow", "Dubai", "Singapore",
    "Toronto", "Los Angeles", "Chicago", "Miami", "Seattle",
    "Beijing", "Shanghai", "Hong Kong", "Seoul", "Bangkok",
    "Rome", "Madrid", "Amsterdam", "Vienna", "Prague",
];

pub const SUGGESTION_LIMIT: usize = 8;
pub const MIN_QUERY_LEN: usize = 2;
pub const SUCCESS_FLASH: Duration = Duration::from_secs(2);
pub const ERROR_FLASH: Duration = Duration::from_secs(3);

pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name";
pub const NOT_FOUND_MESSAGE: &str = "City not found. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Please enter a city name")]
    EmptyCity,
}

/// A search that has been started and is waiting on its fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub city: String,
    pub ticket: RenderTicket,
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Real data rendered and recorded in history.
    Updated(WeatherSnapshot),
    /// Fetch failed; a generated snapshot was rendered instead.
    Fallback {
        error: UpstreamError,
        snapshot: WeatherSnapshot,
    },
    /// A later search had already been rendered; nothing changed.
    Superseded,
}

pub struct SearchSession<D, E, G, S> {
    coordinator: RenderCoordinator<D, E, G>,
    source: S,
    store: Box<dyn HistoryStore>,
    history: SearchHistory,
    rng: StdRng,
    state: SessionState,
    message: Option<String>,
    flash_until: Option<Instant>,
    suggestions: Vec<String>,
    in_flight: usize,
    settled: Option<SessionState>,
}

impl<D, E, G, S> SearchSession<D, E, G, S>
where
    D: DisplaySurface,
    E: EffectLayer,
    G: GlobeView,
    S: WeatherSource,
{
    pub fn new(
        coordinator: RenderCoordinator<D, E, G>,
        source: S,
        store: Box<dyn HistoryStore>,
        rng: StdRng,
    ) -> Self {
        let history = match store.load() {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Ignoring unreadable search history: {}", e);
                SearchHistory::new()
            }
        };

        Self {
            coordinator,
            source,
            store,
            history,
            rng,
            state: SessionState::Idle,
            message: None,
            flash_until: None,
            suggestions: Vec::new(),
            in_flight: 0,
            settled: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn coordinator(&self) -> &RenderCoordinator<D, E, G> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut RenderCoordinator<D, E, G> {
        &mut self.coordinator
    }

    /// Input is locked while any search is outstanding.
    pub fn input_enabled(&self) -> bool {
        self.in_flight == 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Recompute suggestions for the current input text.
    pub fn on_input(&mut self, query: &str) -> &[String] {
        if query.chars().count() < MIN_QUERY_LEN {
            self.suggestions.clear();
            return &self.suggestions;
        }

        let needle = query.to_lowercase();
        let mut found: Vec<String> = POPULAR_CITIES
            .iter()
            .filter(|city| city.to_lowercase().contains(&needle))
            .map(|city| city.to_string())
            .collect();

        for entry in self.history.matching(query) {
            let lowered = entry.to_lowercase();
            if !found.iter().any(|f| f.to_lowercase() == lowered) {
                found.push(entry.clone());
            }
        }

        found.truncate(SUGGESTION_LIMIT);
        self.suggestions = found;
        &self.suggestions
    }

    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.clear();
    }

    /// Validate the input and start a search. Empty input never reaches Loading.
    pub fn begin_search(&mut self, input: &str, now: Instant) -> Result<PendingSearch, SearchError> {
        self.suggestions.clear();

        let city = input.trim();
        if city.is_empty() {
            self.message = Some(EMPTY_CITY_MESSAGE.to_string());
            self.flash_until = Some(now + ERROR_FLASH);
            return Err(SearchError::EmptyCity);
        }

        let ticket = self.coordinator.begin();
        self.in_flight += 1;
        self.state = SessionState::Loading;
        self.message = None;
        self.flash_until = None;
        tracing::info!("Searching weather for {} (#{})", city, ticket.value());

        Ok(PendingSearch {
            city: city.to_string(),
            ticket,
        })
    }

    pub fn complete_search(
        &mut self,
        pending: PendingSearch,
        result: Result<WeatherPayload, UpstreamError>,
        now: Instant,
    ) -> SearchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.coordinator.is_stale(pending.ticket) {
            tracing::debug!("Search for {} finished after a newer one; ignoring", pending.city);
            self.settle_if_idle(now);
            return SearchOutcome::Superseded;
        }

        let outcome = match result {
            Ok(payload) => {
                let snapshot = transform(&payload);
                if self.coordinator.render(pending.ticket, &snapshot) == RenderOutcome::Superseded {
                    self.settle_if_idle(now);
                    return SearchOutcome::Superseded;
                }

                self.history.add(&pending.city);
                if let Err(e) = self.store.save(&self.history) {
                    tracing::warn!("Failed to persist search history: {}", e);
                }

                self.settled = Some(SessionState::Success);
                SearchOutcome::Updated(snapshot)
            }
            Err(error) => {
                tracing::error!("Weather fetch for {} failed: {}", pending.city, error);
                let snapshot = fallback_snapshot(&pending.city, &mut self.rng, Utc::now().date_naive());
                if self.coordinator.render(pending.ticket, &snapshot) == RenderOutcome::Superseded {
                    self.settle_if_idle(now);
                    return SearchOutcome::Superseded;
                }

                self.settled = Some(SessionState::Error);
                SearchOutcome::Fallback { error, snapshot }
            }
        };

        self.settle_if_idle(now);
        outcome
    }

    /// Leave Loading only once every pending search has completed, using the
    /// result of the last one that rendered.
    fn settle_if_idle(&mut self, now: Instant) {
        if self.in_flight > 0 {
            return;
        }
        let Some(state) = self.settled.take() else {
            return;
        };

        self.state = state;
        match state {
            SessionState::Error => {
                self.message = Some(NOT_FOUND_MESSAGE.to_string());
                self.flash_until = Some(now + ERROR_FLASH);
            }
            _ => {
                self.message = None;
                self.flash_until = Some(now + SUCCESS_FLASH);
            }
        }
    }

    /// Run one search end to end against the configured source.
    pub async fn search(&mut self, input: &str) -> Result<SearchOutcome, SearchError> {
        let pending = self.begin_search(input, Instant::now())?;
        let result = self.source.fetch(&pending.city).await;
        Ok(self.complete_search(pending, result, Instant::now()))
    }

    /// Expire the success/error flash once its window has passed.
    pub fn poll_timers(&mut self, now: Instant) {
        let Some(deadline) = self.flash_until else {
            return;
        };
        if now < deadline {
            return;
        }

        self.flash_until = None;
        self.message = None;
        if self.in_flight == 0 && matches!(self.state, SessionState::Success | SessionState::Error) {
            self.state = SessionState::Idle;
        }
    }
}
