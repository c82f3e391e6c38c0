pub mod artifact;
pub mod calendar;
pub mod config;
pub mod error;
pub mod interpolate;
pub mod io;
pub mod loader;
pub mod metrics;
pub mod paths;
pub mod provider;
pub mod record;
pub mod report;
pub mod synth;
pub mod types;

pub use error::{Result, UptimeError};
