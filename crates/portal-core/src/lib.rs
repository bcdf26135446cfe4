//! # portal-core
//!
//! Core types, settings, and ambient services for the borrower portal.
//! This crate has no portal dependencies and provides the foundation for the
//! document model and the page behaviors.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Portal settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`i18n`] - Display-string translation catalog
//! - [`clock`] - Wall-clock abstraction
//! - [`dates`] - Lenient parsing of server-rendered dates

pub mod clock;
pub mod dates;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PortalError, PortalResult, ValidationError};
pub use settings::{PortalSettings, SETTINGS};
