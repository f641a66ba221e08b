//! Configuration management for portsweep.
//!
//! Provides XDG-compliant settings loading.

mod settings;

pub use settings::{AppSettings, Paths};
