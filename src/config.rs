//! Environment overrides for Namaz Vaktim
//!
//! This module handles parsing of environment variables that can optionally
//! override settings from the config file (see config_file module).
//!
//! Environment variables (all optional):
//! - NAMAZVAKTI_PREFS: Override the shared-preferences snapshot path
//! - NAMAZVAKTI_DEBOUNCE_MS: Override the trigger coalescing window

use crate::constants::{DEBOUNCE_MAX_MS, DEBOUNCE_MIN_MS};
use log::{debug, info, warn};
use std::env;
use std::path::PathBuf;

pub const ENV_PREFS: &str = "NAMAZVAKTI_PREFS";
pub const ENV_DEBOUNCE_MS: &str = "NAMAZVAKTI_DEBOUNCE_MS";

/// Parse the NAMAZVAKTI_PREFS environment variable
///
/// Returns None if not set or blank
pub fn parse_prefs_path() -> Option<PathBuf> {
    match env::var(ENV_PREFS) {
        Ok(val) if !val.trim().is_empty() => {
            info!("Preference snapshot set via environment variable: {}", val);
            Some(PathBuf::from(val))
        }
        Ok(_) => {
            warn!("{} is blank, ignoring", ENV_PREFS);
            None
        }
        Err(_) => {
            debug!("{} not set.", ENV_PREFS);
            None
        }
    }
}

/// Parse the NAMAZVAKTI_DEBOUNCE_MS environment variable
///
/// Returns Some(ms) if valid (250-10000 milliseconds)
/// Returns None if not set or invalid
pub fn parse_debounce_ms() -> Option<u64> {
    match env::var(ENV_DEBOUNCE_MS) {
        Ok(val) => match val.parse::<u64>() {
            Ok(ms) if (DEBOUNCE_MIN_MS..=DEBOUNCE_MAX_MS).contains(&ms) => {
                info!("Trigger debounce set via environment variable: {} ms", ms);
                Some(ms)
            }
            Ok(ms) => {
                warn!(
                    "Invalid debounce window: {} (must be {}-{} ms). Using config value.",
                    ms, DEBOUNCE_MIN_MS, DEBOUNCE_MAX_MS
                );
                None
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using config value.", ENV_DEBOUNCE_MS, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", ENV_DEBOUNCE_MS);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each variable is exercised by a single test so parallel tests never race
    // on the same environment entry.

    #[test]
    fn test_parse_debounce_ms() {
        env::set_var(ENV_DEBOUNCE_MS, "250");
        assert_eq!(parse_debounce_ms(), Some(250), "Should accept the minimum");

        env::set_var(ENV_DEBOUNCE_MS, "10000");
        assert_eq!(parse_debounce_ms(), Some(10000), "Should accept the maximum");

        env::set_var(ENV_DEBOUNCE_MS, "249");
        assert_eq!(parse_debounce_ms(), None, "Should reject below minimum");

        env::set_var(ENV_DEBOUNCE_MS, "10001");
        assert_eq!(parse_debounce_ms(), None, "Should reject above maximum");

        env::set_var(ENV_DEBOUNCE_MS, "fast");
        assert_eq!(parse_debounce_ms(), None, "Should reject non-numeric");

        env::set_var(ENV_DEBOUNCE_MS, "-5");
        assert_eq!(parse_debounce_ms(), None, "Should reject negative");

        env::remove_var(ENV_DEBOUNCE_MS);
        assert_eq!(parse_debounce_ms(), None, "Should return None when not set");
    }

    #[test]
    fn test_parse_prefs_path() {
        env::set_var(ENV_PREFS, "/data/prefs.json");
        assert_eq!(parse_prefs_path(), Some(PathBuf::from("/data/prefs.json")));

        env::set_var(ENV_PREFS, "   ");
        assert_eq!(parse_prefs_path(), None, "Blank value is ignored");

        env::remove_var(ENV_PREFS);
        assert_eq!(parse_prefs_path(), None);
    }
}
