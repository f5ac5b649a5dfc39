use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;
use url::Url;

use crate::client::endpoint;
use crate::decode::decode_one;
use crate::error::{HarnessError, Result};
use crate::models::{LoginRequest, LoginResponse};
use crate::settings::Settings;

pub const LOGIN_PATH: &str = "/api/Users/Authentication";

/// A non-empty bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(HarnessError::MissingToken);
        }
        Ok(Credential(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Clone)]
pub enum Authenticator {
    Static(Credential),
    Login { email: String, password: String },
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::Static(_) => f.write_str("Authenticator::Static"),
            Authenticator::Login { email, .. } => write!(f, "Authenticator::Login({})", email),
        }
    }
}

impl Authenticator {
    /// A configured token wins over the login pair.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if let Some(token) = &settings.token {
            return Ok(Authenticator::Static(Credential::new(token.clone())?));
        }
        match &settings.login {
            Some(login) => Ok(Authenticator::Login {
                email: login.email.clone(),
                password: login.password.clone(),
            }),
            None => Err(HarnessError::MissingToken),
        }
    }

    /// Produces the credential for the suite. Login goes through `http`, which must not
    /// carry an Authorization header of its own.
    pub async fn authenticate(&self, http: &reqwest::Client, base_url: &Url) -> Result<Credential> {
        match self {
            Authenticator::Static(credential) => {
                log::info!("Using configured bearer token");
                warn_if_expired(credential);
                Ok(credential.clone())
            }
            Authenticator::Login { email, password } => {
                log::info!("Logging in as {}", email);
                login(http, base_url, email, password).await
            }
        }
    }
}

async fn login(
    http: &reqwest::Client,
    base_url: &Url,
    email: &str,
    password: &str,
) -> Result<Credential> {
    let response = http
        .post(endpoint(base_url, LOGIN_PATH)?)
        .json(&LoginRequest {
            login_email: email,
            login_password: password,
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(HarnessError::Login { status, body });
    }

    let parsed: LoginResponse = decode_one(&body, &format!("POST {}", LOGIN_PATH))?;
    Credential::new(parsed.access_token.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT without checking its signature.
/// Returns `None` for tokens that are not JWTs or carry no expiry.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let header = decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp?, 0)
}

/// The warning logged for a configured token whose `exp` is not after `now`.
pub fn expiry_warning(token: &str, now: DateTime<Utc>) -> Option<String> {
    match token_expiry(token) {
        Some(exp) if exp <= now => Some(format!(
            "Configured bearer token expired at {}; requests will likely be rejected",
            exp
        )),
        _ => None,
    }
}

fn warn_if_expired(credential: &Credential) {
    match expiry_warning(credential.as_str(), Utc::now()) {
        Some(warning) => log::warn!("{}", warning),
        None => log::debug!("Configured bearer token is not known to be expired"),
    }
}
