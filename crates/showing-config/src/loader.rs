// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./showing.toml` > `~/.config/showing/showing.toml` > `/etc/showing/showing.toml`
//! with environment variable overrides via `SHOWING_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ShowingConfig;

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &["service", "storage", "scheduling", "booking"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/showing/showing.toml` (system-wide)
/// 3. `~/.config/showing/showing.toml` (user XDG config)
/// 4. `./showing.toml` (local directory)
/// 5. `SHOWING_*` environment variables
pub fn load_config() -> Result<ShowingConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ShowingConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShowingConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShowingConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShowingConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ShowingConfig::default()))
        .merge(Toml::file("/etc/showing/showing.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("showing/showing.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("showing.toml"))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the section prefix becomes a dot, so `scheduling_store_timeout_ms`
/// maps to `scheduling.store_timeout_ms`.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: key names themselves contain
/// underscores.
fn env_provider() -> Env {
    Env::prefixed("SHOWING_").map(|key| env_key_to_path(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_at_section() {
        assert_eq!(
            env_key_to_path("scheduling_store_timeout_ms"),
            "scheduling.store_timeout_ms"
        );
        assert_eq!(
            env_key_to_path("storage_database_path"),
            "storage.database_path"
        );
        assert_eq!(env_key_to_path("service_log_level"), "service.log_level");
        assert_eq!(env_key_to_path("unknown_key"), "unknown_key");
    }
}
