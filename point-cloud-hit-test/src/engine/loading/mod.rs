//! Asset loading for hit test configuration.

/// JSON settings asset loading and application once available.
pub mod settings_loader;
