//! Explicitly passed session context.
//!
//! Everything an operation needs to address the backend (application, user,
//! session, bearer credential) plus the UI theme, threaded through
//! construction instead of being read from ambient storage.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Invalid theme: {}", s)),
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    token: Option<String>,
    pub theme: Theme,
}

impl SessionContext {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            token: None,
            theme: Theme::default(),
        }
    }

    /// Attach a bearer credential. Blank tokens are treated as absent.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// `/apps/{app}/users/{user}/sessions/{session}`, segments percent-encoded.
    pub fn session_path(&self) -> String {
        format!(
            "/apps/{}/users/{}/sessions/{}",
            encode_segment(&self.app_name),
            encode_segment(&self.user_id),
            encode_segment(&self.session_id)
        )
    }
}

// Keep the credential out of logs.
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SessionContext")
            .field("app_name", &self.app_name)
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("theme", &self.theme)
            .finish()
    }
}

/// Percent-encode one path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_unauthenticated() {
        let ctx = SessionContext::new("agent", "u1", "s1").with_token("   ");
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.token(), None);

        let ctx = ctx.with_token("abc");
        assert_eq!(ctx.token(), Some("abc"));
    }

    #[test]
    fn test_session_path() {
        let ctx = SessionContext::new("agent", "user@example.com", "s 1");
        assert_eq!(
            ctx.session_path(),
            "/apps/agent/users/user%40example.com/sessions/s%201"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let ctx = SessionContext::new("agent", "u1", "s1").with_token("secret-token");
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::default().to_string(), "light");
    }
}
