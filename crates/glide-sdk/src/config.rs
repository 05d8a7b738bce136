//! Client settings and loading
//!
//! Settings are built once at startup and passed by value into
//! `GlideClient::new`; nothing reads the environment after that.
//!
//! Precedence: explicit values (builder or TOML file) > `GLIDE_*` env vars >
//! production defaults. The client secret can come from the file, but
//! deployments usually leave it out and set `GLIDE_CLIENT_SECRET`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use glide_auth::{CredentialSet, ScopeSet};
use serde::Deserialize;

pub const ENV_CLIENT_ID: &str = "GLIDE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GLIDE_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "GLIDE_REDIRECT_URI";
pub const ENV_AUTH_BASE_URL: &str = "GLIDE_AUTH_BASE_URL";
pub const ENV_API_BASE_URL: &str = "GLIDE_API_BASE_URL";
pub const ENV_CONFIG_PATH: &str = "GLIDE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "glide.toml";

/// Root settings
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<Secret<String>>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub internal: InternalSettings,
    /// Per-request timeout for every HTTP exchange. Unset means none.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub scopes: ScopeSettings,
}

/// Endpoint overrides; unset fields fall back to production.
#[derive(Debug, Default, Deserialize)]
pub struct InternalSettings {
    #[serde(default)]
    pub auth_base_url: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// Scopes each service requires of its session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    pub magic_auth: Vec<String>,
    pub sim_swap: Vec<String>,
    pub telco_finder: Vec<String>,
    pub number_verify: Vec<String>,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            magic_auth: vec!["magic-auth".into()],
            sim_swap: vec!["sim-swap".into()],
            telco_finder: vec!["telco-finder".into()],
            number_verify: Vec::new(),
        }
    }
}

impl ScopeSettings {
    pub fn magic_auth(&self) -> ScopeSet {
        self.magic_auth.iter().map(String::as_str).collect()
    }

    pub fn sim_swap(&self) -> ScopeSet {
        self.sim_swap.iter().map(String::as_str).collect()
    }

    pub fn telco_finder(&self) -> ScopeSet {
        self.telco_finder.iter().map(String::as_str).collect()
    }

    pub fn number_verify(&self) -> ScopeSet {
        self.number_verify.iter().map(String::as_str).collect()
    }
}

impl Settings {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret<String>>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            ..Self::default()
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.internal.auth_base_url = Some(url.into());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.internal.api_base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn with_scopes(mut self, scopes: ScopeSettings) -> Self {
        self.scopes = scopes;
        self
    }

    /// Load settings from a TOML file, then fill unset fields from the env.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings.with_env_fallback())
    }

    /// Settings from `GLIDE_*` env vars alone.
    pub fn from_env() -> Self {
        Self::default().with_env_fallback()
    }

    /// Fill every unset or blank field from its `GLIDE_*` env var.
    pub fn with_env_fallback(mut self) -> Self {
        if self.client_id.trim().is_empty() {
            if let Some(id) = env_value(ENV_CLIENT_ID) {
                self.client_id = id;
            }
        }
        if self.client_secret.as_ref().is_none_or(|s| s.is_blank()) {
            if let Some(secret) = env_value(ENV_CLIENT_SECRET) {
                self.client_secret = Some(Secret::new(secret));
            }
        }
        fill_from_env(&mut self.redirect_uri, ENV_REDIRECT_URI);
        fill_from_env(&mut self.internal.auth_base_url, ENV_AUTH_BASE_URL);
        fill_from_env(&mut self.internal.api_base_url, ENV_API_BASE_URL);
        self
    }

    /// Resolve the settings file path from a CLI arg or the `GLIDE_CONFIG` env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate and build the credential set shared by every session manager.
    pub fn credentials(&self) -> common::Result<CredentialSet> {
        if self.client_id.trim().is_empty() {
            return Err(common::Error::Missing("client_id"));
        }
        let secret = match &self.client_secret {
            Some(secret) if !secret.is_blank() => secret.clone(),
            _ => return Err(common::Error::Missing("client_secret")),
        };
        if self.timeout_secs == Some(0) {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        let mut credentials = CredentialSet::new(self.client_id.clone(), secret);
        if let Some(redirect_uri) = &self.redirect_uri {
            credentials = credentials.with_redirect_uri(redirect_uri.clone());
        }
        if let Some(url) = non_blank(&self.internal.auth_base_url) {
            check_http_url("auth_base_url", url)?;
            credentials = credentials.with_auth_base_url(url);
        }
        if let Some(url) = non_blank(&self.internal.api_base_url) {
            check_http_url("api_base_url", url)?;
            credentials = credentials.with_api_base_url(url);
        }
        Ok(credentials)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn fill_from_env(field: &mut Option<String>, key: &str) {
    if non_blank(field).is_none() {
        if let Some(value) = env_value(key) {
            *field = Some(value);
        }
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_http_url(name: &str, url: &str) -> common::Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(common::Error::Config(format!(
            "{name} must start with http:// or https://, got: {url}"
        )))
    }
}
