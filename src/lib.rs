//! SkyPulse: a weather dashboard core plus the proxy server that feeds it.
//!
//! Data flows one way: a [`session::SearchSession`] fetches a raw payload,
//! [`transform::transform`] turns it into a [`snapshot::WeatherSnapshot`],
//! and the [`render::RenderCoordinator`] pushes that snapshot to the display,
//! the effect layer and the globe.

pub mod client;
pub mod condition;
pub mod config;
pub mod effects;
pub mod forecast;
pub mod globe;
pub mod history;
pub mod particles;
pub mod render;
pub mod routes;
pub mod session;
pub mod snapshot;
pub mod transform;
pub mod utils;

pub use condition::Condition;
pub use render::{RenderCoordinator, RenderOutcome, RenderTicket};
pub use session::{SearchOutcome, SearchSession, SessionState};
pub use snapshot::WeatherSnapshot;
