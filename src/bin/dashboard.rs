//! Terminal front end for the SkyPulse session.
//!
//! Runs one search per city argument against a SkyPulse server and prints
//! what the display, effect layer and globe would show.

use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skypulse::client::HttpWeatherSource;
use skypulse::config::ClientConfig;
use skypulse::globe::Globe;
use skypulse::history::JsonFileStore;
use skypulse::particles::ParticleLayer;
use skypulse::render::{RecordingDisplay, RenderCoordinator};
use skypulse::session::{SearchOutcome, SearchSession};

type Session = SearchSession<RecordingDisplay, ParticleLayer, Globe, HttpWeatherSource>;

#[derive(Debug, Parser)]
#[command(name = "skypulse-dashboard", version, about = "SkyPulse terminal dashboard")]
struct Cli {
    /// Cities to search, in order.
    #[arg(default_values_t = vec!["New York".to_string()])]
    cities: Vec<String>,

    /// Base URL of the SkyPulse server (defaults to SKYPULSE_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Seed for fallback data and particle placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Animation frames to simulate after each search.
    #[arg(long, default_value_t = 60)]
    ticks: usize,

    /// Show suggestions for this partial input before searching.
    #[arg(long)]
    suggest: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skypulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let api_url = cli.api_url.clone().unwrap_or(config.api_url);

    let (session_rng, particle_seed) = match cli.seed {
        Some(seed) => (StdRng::seed_from_u64(seed), seed),
        None => (StdRng::from_entropy(), fastrand::u64(..)),
    };

    let coordinator = RenderCoordinator::new(
        RecordingDisplay::default(),
        ParticleLayer::seeded(80.0, 24.0, particle_seed),
        Globe::new(),
    );
    let mut session: Session = SearchSession::new(
        coordinator,
        HttpWeatherSource::new(api_url),
        Box::new(JsonFileStore::new(config.history_file)),
        session_rng,
    );

    if let Some(partial) = cli.suggest.as_deref() {
        let suggestions = session.on_input(partial).join(", ");
        println!("Suggestions for {partial:?}: {suggestions}");
        session.dismiss_suggestions();
    }

    for city in &cli.cities {
        match session.search(city).await {
            Ok(SearchOutcome::Fallback { error, .. }) => {
                println!("! {} ({error})", session.message().unwrap_or_default());
            }
            Ok(_) => {}
            Err(e) => {
                println!("! {e}");
                continue;
            }
        }

        for _ in 0..cli.ticks {
            let coordinator = session.coordinator_mut();
            coordinator.globe_mut().tick();
            coordinator.effects_mut().frame();
        }
        session.poll_timers(Instant::now());

        print_dashboard(&session);
    }

    let recent = session.history().entries().join(", ");
    println!("Recent searches: {recent}");
    Ok(())
}

fn print_dashboard(session: &Session) {
    let coordinator = session.coordinator();
    let display = coordinator.display();

    let Some(primary) = display.primary.as_ref() else {
        return;
    };

    println!();
    println!("{} {}, {}", primary.condition.glyph(), primary.city, primary.country);
    println!(
        "  {}  {}  feels like {}",
        primary.temperature, primary.condition, primary.feels_like
    );
    println!(
        "  humidity {}  wind {}  pressure {}",
        primary.humidity, primary.wind, primary.pressure
    );

    let hours: Vec<String> = display
        .hourly
        .iter()
        .map(|h| format!("{} {} {}", h.time, h.glyph, h.temperature))
        .collect();
    println!("  Hourly: {}", hours.join(" | "));

    for day in &display.daily {
        println!("  {:<5} {} {:>4} / {:<4}", day.label, day.glyph, day.high, day.low);
    }

    if let Some(active) = coordinator.effects().active() {
        println!(
            "  Effect: {} ({} particles, {})",
            active.profile.background.class(),
            active.field.particles().len(),
            active.field.color().rgba(0.6)
        );
    }

    let globe = coordinator.globe();
    if let Some(marker) = globe.highlighted() {
        println!(
            "  Globe: {} at ({:.3}, {:.3}, {:.3}) scale {:.2} color #{:06x}, rotation {:.3} rad",
            marker.label(),
            marker.anchor.x,
            marker.anchor.y,
            marker.anchor.z,
            marker.scale,
            marker.color,
            globe.rotation_y
        );
    }
}
