use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::{Authenticator, Credential};
use crate::decode::{decode_list, decode_one};
use crate::error::{HarnessError, Result};
use crate::models::Message;
use crate::settings::Settings;

/// Status and raw body of one request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub context: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn expect_status(&self, expected: StatusCode) -> Result<&Self> {
        if self.status != expected {
            return Err(HarnessError::UnexpectedStatus {
                expected,
                actual: self.status,
                body: self.body.clone(),
            });
        }
        Ok(self)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        decode_one(&self.body, &self.context)
    }

    pub fn json_list<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        decode_list(&self.body, &self.context)
    }
}

/// Resolves `path` under the base URL, keeping any path prefix the base carries.
/// `https://host/gateway` + `/api/Story/All` gives `https://host/gateway/api/Story/All`.
pub fn endpoint(base_url: &Url, path: &str) -> Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Fails unless `response` carries exactly `expected` as its message.
pub fn expect_message<M: Message>(response: &M, expected: &str) -> Result<()> {
    match response.message() {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(HarnessError::UnexpectedMessage {
            expected: expected.to_string(),
            actual: actual.map(str::to_string),
        }),
    }
}

/// REST client bound to one base URL and one bearer credential.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url, credential: &Credential) -> Result<Self> {
        let mut auth_value = HeaderValue::from_str(&credential.bearer())
            .map_err(|_| HarnessError::Config("bearer token is not a valid header value".into()))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(ApiClient { http, base_url })
    }

    /// Runs the authenticator once through a throwaway client, then builds the
    /// authenticated one.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let authenticator = Authenticator::from_settings(settings)?;
        let credential = {
            let bootstrap = reqwest::Client::new();
            authenticator.authenticate(&bootstrap, &settings.base_url).await?
        };
        log::info!("Authenticated against {}", settings.base_url);
        ApiClient::new(settings.base_url.clone(), &credential)
    }

    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let context = format!("{} {}", method, path);
        let url = endpoint(&self.base_url, path)?;

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        log::debug!("-> {}", context);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("<- {} {}", context, status);

        Ok(ApiResponse { context, status, body })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute::<()>(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute::<()>(Method::DELETE, path, None).await
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put_json<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, Some(body)).await
    }
}
