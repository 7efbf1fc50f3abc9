//! Configuration module
//!
//! Client configuration read from the environment (after loading `.env`),
//! covering the backend address, the session being addressed, the bearer
//! credential and cache/timeout tuning.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::context::{SessionContext, Theme};

// Common constants
const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_APP_NAME: &str = "agent";
const CACHE_STALE_SECS: u64 = 30;
const MAX_CACHE_STALE_SECS: u64 = 600;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Path layout of the artifact endpoints.
///
/// `Rest` puts list/upload on `…/artifacts` and download/delete on
/// `…/artifacts/{name}`. `Legacy` matches the original backend router:
/// `…/artifacts-metadata`, `…/upload` and `…/artifacts/{name}/download`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteStyle {
    #[default]
    Rest,
    Legacy,
}

impl FromStr for RouteStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" => Ok(RouteStyle::Rest),
            "legacy" => Ok(RouteStyle::Legacy),
            _ => Err(anyhow::anyhow!("Invalid route style: {}", s)),
        }
    }
}

impl Display for RouteStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RouteStyle::Rest => write!(f, "rest"),
            RouteStyle::Legacy => write!(f, "legacy"),
        }
    }
}

/// Artifex client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub token: Option<String>,
    pub cache_stale_secs: u64,
    pub request_timeout_secs: u64,
    pub route_style: RouteStyle,
    pub theme: Theme,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(*key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = var(&["ARTIFEX_API_URL", "API_URL"])
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let user_id = var(&["ARTIFEX_USER_ID"])
            .ok_or_else(|| anyhow::anyhow!("Missing user id. Set ARTIFEX_USER_ID"))?;

        let session_id = var(&["ARTIFEX_SESSION_ID"])
            .ok_or_else(|| anyhow::anyhow!("Missing session id. Set ARTIFEX_SESSION_ID"))?;

        let cache_stale_secs = match var(&["ARTIFEX_CACHE_STALE_SECS"]) {
            Some(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("ARTIFEX_CACHE_STALE_SECS must be a valid number"))?,
            None => CACHE_STALE_SECS,
        };

        let request_timeout_secs = match var(&["ARTIFEX_REQUEST_TIMEOUT_SECS"]) {
            Some(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("ARTIFEX_REQUEST_TIMEOUT_SECS must be a valid number")
            })?,
            None => REQUEST_TIMEOUT_SECS,
        };

        let route_style = var(&["ARTIFEX_ROUTE_STYLE"])
            .map(|v| v.parse::<RouteStyle>())
            .transpose()?
            .unwrap_or_default();

        let theme = var(&["ARTIFEX_THEME"])
            .map(|v| v.parse::<Theme>())
            .transpose()?
            .unwrap_or_default();

        let config = ClientConfig {
            api_url,
            app_name: var(&["ARTIFEX_APP_NAME"]).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            user_id,
            session_id,
            token: var(&["ARTIFEX_TOKEN", "JWT_TOKEN"]),
            cache_stale_secs,
            request_timeout_secs,
            route_style,
            theme,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "ARTIFEX_API_URL must start with http:// or https://"
            ));
        }

        if self.app_name.is_empty() || self.user_id.is_empty() || self.session_id.is_empty() {
            return Err(anyhow::anyhow!(
                "App name, user id and session id must not be empty"
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "ARTIFEX_REQUEST_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.cache_stale_secs > MAX_CACHE_STALE_SECS {
            return Err(anyhow::anyhow!(
                "ARTIFEX_CACHE_STALE_SECS must be at most {} seconds",
                MAX_CACHE_STALE_SECS
            ));
        }

        Ok(())
    }

    pub fn cache_stale_window(&self) -> Duration {
        Duration::from_secs(self.cache_stale_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_context(&self) -> SessionContext {
        let ctx = SessionContext::new(&self.app_name, &self.user_id, &self.session_id)
            .with_theme(self.theme);
        match &self.token {
            Some(token) => ctx.with_token(token),
            None => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ARTIFEX_USER_ID", "u1"),
            ("ARTIFEX_SESSION_ID", "s1"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
        assert_eq!(config.token, None);
        assert_eq!(config.cache_stale_window(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.route_style, RouteStyle::Rest);
        assert!(!config.session_context().is_authenticated());
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("API_URL", "https://agents.example.com/"),
            ("ARTIFEX_APP_NAME", "analyst"),
            ("ARTIFEX_USER_ID", "u1"),
            ("ARTIFEX_SESSION_ID", "s1"),
            ("JWT_TOKEN", "tok"),
            ("ARTIFEX_CACHE_STALE_SECS", "5"),
            ("ARTIFEX_ROUTE_STYLE", "legacy"),
            ("ARTIFEX_THEME", "dark"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://agents.example.com");
        assert_eq!(config.route_style, RouteStyle::Legacy);

        let ctx = config.session_context();
        assert_eq!(ctx.app_name, "analyst");
        assert_eq!(ctx.token(), Some("tok"));
        assert_eq!(ctx.theme, Theme::Dark);
    }

    #[test]
    fn test_missing_session_is_an_error() {
        let err = ClientConfig::from_lookup(lookup(&[("ARTIFEX_USER_ID", "u1")])).unwrap_err();
        assert!(err.to_string().contains("ARTIFEX_SESSION_ID"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = [("ARTIFEX_USER_ID", "u1"), ("ARTIFEX_SESSION_ID", "s1")];

        let mut vars = base.to_vec();
        vars.push(("ARTIFEX_API_URL", "ftp://example.com"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("ARTIFEX_REQUEST_TIMEOUT_SECS", "0"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("ARTIFEX_CACHE_STALE_SECS", "3600"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("ARTIFEX_ROUTE_STYLE", "graphql"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }
}
