//! # Printer Module
//!
//! This module provides paper and layout configuration.
//!
//! ## Modules
//!
//! - [`config`]: Paper widths, user preferences, the preferences file and resolved encoder settings

pub mod config;

pub use config::{EncoderSettings, PaperWidth, Preferences, PrintPreferences};
