//! # Storage Layer
//!
//! Persistent user settings.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `~/.config/proj/config.toml` |
//! | Plugins | directories with `plugin.json` | `~/.config/proj/plugins/` |
//!
//! ## Key Types
//!
//! - [`Config`] - Application configuration

mod config;

pub use config::{
    expand_path, ActionsConfig, Config, ConfigError, DisplayConfig, EditorConfig, PluginsConfig,
};
