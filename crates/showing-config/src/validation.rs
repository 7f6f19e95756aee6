// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive durations, and consistent limits.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ShowingConfig;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ShowingConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.service.log_level.as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            valid_levels.join(", ")
        ));
    }

    let scheduling = &config.scheduling;

    if scheduling.allowed_durations.is_empty() {
        fail("scheduling.allowed_durations must list at least one duration".to_string());
    }

    let mut seen = HashSet::new();
    for &minutes in &scheduling.allowed_durations {
        if minutes == 0 || minutes >= MINUTES_PER_DAY {
            fail(format!(
                "scheduling.allowed_durations entries must be between 1 and {}, got {minutes}",
                MINUTES_PER_DAY - 1
            ));
        }
        if !seen.insert(minutes) {
            fail(format!(
                "duplicate duration {minutes} in scheduling.allowed_durations"
            ));
        }
    }

    let granularity = scheduling.slot_granularity_minutes;
    if granularity == 0 || MINUTES_PER_DAY % granularity != 0 {
        fail(format!(
            "scheduling.slot_granularity_minutes must evenly divide a day, got {granularity}"
        ));
    }

    if scheduling.average_service_minutes == 0 {
        fail("scheduling.average_service_minutes must be positive".to_string());
    }

    if scheduling.max_advance_days == 0 {
        fail("scheduling.max_advance_days must be at least 1".to_string());
    }

    if scheduling.max_slot_days == 0 {
        fail("scheduling.max_slot_days must be at least 1".to_string());
    }

    if scheduling.store_timeout_ms == 0 {
        fail("scheduling.store_timeout_ms must be positive".to_string());
    }

    let booking = &config.booking;
    if booking.max_name_len == 0 {
        fail("booking.max_name_len must be positive".to_string());
    }
    if booking.min_phone_len > booking.max_phone_len {
        fail(format!(
            "booking.min_phone_len ({}) exceeds booking.max_phone_len ({})",
            booking.min_phone_len, booking.max_phone_len
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ShowingConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ShowingConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn granularity_must_divide_a_day() {
        let mut config = ShowingConfig::default();
        config.scheduling.slot_granularity_minutes = 7;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "slot_granularity_minutes"));
    }

    #[test]
    fn duplicate_and_zero_durations_are_all_reported() {
        let mut config = ShowingConfig::default();
        config.scheduling.allowed_durations = vec![30, 30, 0];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate duration 30"));
        assert!(has_message(&errors, "got 0"));
    }

    #[test]
    fn inverted_phone_bounds_fail_validation() {
        let mut config = ShowingConfig::default();
        config.booking.min_phone_len = 30;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "min_phone_len"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = ShowingConfig::default();
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = ShowingConfig::default();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.scheduling.allowed_durations = vec![15, 45];
        config.scheduling.slot_granularity_minutes = 30;
        assert!(validate_config(&config).is_ok());
    }
}
