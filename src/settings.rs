use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{HarnessError, Result};

pub const DEFAULT_BASE_URL: &str = "https://d3s5nxhwblsjbi.cloudfront.net";

pub const BASE_URL_VAR: &str = "STORY_SPOILER_BASE_URL";
pub const TOKEN_VAR: &str = "STORY_SPOILER_TOKEN";
pub const EMAIL_VAR: &str = "STORY_SPOILER_EMAIL";
pub const PASSWORD_VAR: &str = "STORY_SPOILER_PASSWORD";
pub const FIXTURES_VAR: &str = "STORY_SPOILER_FIXTURES";

/// How state-dependent scenarios obtain the story they operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureMode {
    /// Edit and Delete reuse the id captured by the List scenario.
    #[default]
    Shared,
    /// Edit and Delete create and clean up their own story.
    Isolated,
}

impl FromStr for FixtureMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "shared" => Ok(FixtureMode::Shared),
            "isolated" => Ok(FixtureMode::Isolated),
            other => Err(HarnessError::Config(format!(
                "unknown fixture mode {:?}, expected \"shared\" or \"isolated\"",
                other
            ))),
        }
    }
}

impl fmt::Display for FixtureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureMode::Shared => write!(f, "shared"),
            FixtureMode::Isolated => write!(f, "isolated"),
        }
    }
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct Settings {
    pub base_url: Url,
    pub token: Option<String>,
    pub login: Option<LoginCredentials>,
    pub fixture_mode: FixtureMode,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("login", &self.login)
            .field("fixture_mode", &self.fixture_mode)
            .finish()
    }
}

impl Settings {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Settings {
            base_url: Url::parse(base_url)?,
            token: None,
            login: None,
            fixture_mode: FixtureMode::default(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_login(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(LoginCredentials {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_fixture_mode(mut self, mode: FixtureMode) -> Self {
        self.fixture_mode = mode;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut settings = Settings::new(&base_url)?;

        if let Some(token) = get(TOKEN_VAR) {
            settings = settings.with_token(token);
        }

        match (get(EMAIL_VAR), get(PASSWORD_VAR)) {
            (Some(email), Some(password)) => settings = settings.with_login(email, password),
            (Some(_), None) | (None, Some(_)) => {
                return Err(HarnessError::Config(format!(
                    "{} and {} must be set together",
                    EMAIL_VAR, PASSWORD_VAR
                )))
            }
            (None, None) => {}
        }

        if settings.token.is_none() && settings.login.is_none() {
            return Err(HarnessError::Config(format!(
                "set {} or both {} and {}",
                TOKEN_VAR, EMAIL_VAR, PASSWORD_VAR
            )));
        }

        if let Some(mode) = get(FIXTURES_VAR) {
            settings.fixture_mode = mode.parse()?;
        }

        Ok(settings)
    }
}
