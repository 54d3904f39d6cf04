//! Configuration loading.
//!
//! Two layers, both owned by external tooling and only read here:
//! - **Definition records** (skills, conditions, teammates): JSON files
//!   merged from a builtin directory (shipped read-only) and a custom
//!   directory (user-edited), custom overriding builtin by id.
//! - **Application settings** ([`AppConfig`]): tick interval, hotkeys,
//!   monitor knobs; stored at the platform config path via `confy`.

mod app_config;
mod definitions;

pub use app_config::{AppConfig, HotkeySettings};
pub use definitions::{ConfigError, DefinitionConfig, DefinitionSet, load_definitions};
