//! Headless host for the planet generator.
//!
//! Resolves directories, loads configuration, generates a planet, and drives
//! the cloud animation at a fixed frame rate.

pub mod error;
pub mod frame;
pub mod platform;
pub mod run;
pub mod settings;

pub use error::AppError;
pub use frame::FramePacer;
pub use run::{RunSummary, generate};
