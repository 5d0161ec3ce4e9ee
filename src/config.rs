// src/config.rs
use crate::extractors::{KeyPolicy, DEFAULT_LOCATION_TOKEN};
use crate::utils::AppError;

pub const LOCATION_TOKEN_ENV: &str = "SHEET_LOCATION_TOKEN";
pub const KEY_POLICY_ENV: &str = "SHEET_KEY_POLICY";

/// Extraction settings shared by every report job.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The place name that marks location rows.
    pub location_token: String,
    /// Key composition for header-anchored tables.
    pub key_policy: KeyPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self { location_token: DEFAULT_LOCATION_TOKEN.to_string(), key_policy: KeyPolicy::default() }
    }
}

impl Settings {
    /// Command-line values win, then the environment, then defaults.
    pub fn resolve(location_token: Option<String>, key_policy: Option<KeyPolicy>) -> Result<Self, AppError> {
        Self::resolve_with(location_token, key_policy, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        location_token: Option<String>,
        key_policy: Option<KeyPolicy>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let defaults = Self::default();

        let location_token = match location_token.or_else(|| env(LOCATION_TOKEN_ENV)) {
            Some(token) if token.trim().is_empty() => {
                return Err(AppError::Config("location token must not be empty".to_string()));
            }
            Some(token) => token.trim().to_string(),
            None => defaults.location_token,
        };

        let key_policy = match key_policy {
            Some(policy) => policy,
            None => match env(KEY_POLICY_ENV) {
                Some(raw) => raw.parse().map_err(|e| AppError::Config(format!("{}: {}", KEY_POLICY_ENV, e)))?,
                None => defaults.key_policy,
            },
        };

        let settings = Self { location_token, key_policy };
        tracing::debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }
}
