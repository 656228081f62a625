//! Core library for the `weatherbar` status widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather fetcher and the label formatting
//! - A scheduler that refreshes on startup, on an interval and on demand
//! - Display sinks that marshal label text onto the task owning the label
//!
//! It is used by `weatherbar-cli`, but any other front end can drive it the same way.

pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;
pub mod scheduler;

pub use config::Config;
pub use display::{ChannelSink, DisplayReceiver, DisplaySink};
pub use error::{ErrorKind, FetchError};
pub use model::{Coordinates, WeatherReading};
pub use provider::{WeatherProvider, fetch_display, provider_from_config};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerState};
