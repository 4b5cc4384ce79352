//! HTTP client for the DBaaS job API
//!
//! One request per call. Status handling stops at mapping non-2xx answers
//! to [`ApiError::Status`]; deciding what a status means for a job is left
//! to the callers.

use super::client_config::ApiClientConfig;
use crate::shared::errors::{ApiError, AppError, AppResult};
use crate::shared::utils::LogContext;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Certificate, Client, Identity, Method};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

const PEM_MARKER: &str = "-----BEGIN";

pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> AppResult<Self> {
        let config = config.normalized()?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.insecure);

        if !config.cert.is_empty() && !config.key.is_empty() {
            builder = builder.identity(load_identity(&config.cert, &config.key)?);
        }

        if !config.ca.is_empty() {
            let ca = read_pem(&config.ca)?;
            let certificate = Certificate::from_pem(ca.as_bytes()).map_err(|e| {
                AppError::ConfigurationError(format!("Invalid CA certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder.build().map_err(|e| {
            AppError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> AppResult<Self> {
        Self::new(ApiClientConfig::from_env()?)
    }

    pub fn base_uri(&self) -> &str {
        &self.config.uri
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.uri, path)
    }

    /// Send one request and return the response body.
    ///
    /// Per-call `headers` override the client-wide ones.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: &HashMap<String, String>,
    ) -> Result<String, ApiError> {
        let url = self.url(path);
        let started = Instant::now();
        LogContext::api_call(method.as_str(), path, None, None);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.request_headers(headers)?);

        if self.uses_basic_auth() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        if let Some(body) = body {
            if self.config.debug {
                debug!("Request body for {} {}: {}", method, url, body);
            }
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        LogContext::api_call(
            method.as_str(),
            path,
            Some(status.as_u16()),
            Some(started.elapsed().as_millis() as u64),
        );
        if self.config.debug {
            debug!("Response from {} {}: {}", method, url, text);
        }

        if !status.is_success() {
            warn!("{} {} returned {}: {}", method, url, status.as_u16(), text);
            return Err(ApiError::status(status.as_u16(), text));
        }

        Ok(text)
    }

    fn uses_basic_auth(&self) -> bool {
        !self.config.username.is_empty() && !self.config.password.is_empty()
    }

    fn request_headers(&self, extra: &HashMap<String, String>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.config.token.is_empty() && !self.uses_basic_auth() {
            insert_header(&mut headers, "Authorization", &format!("Bearer {}", self.config.token))?;
        }

        for (name, value) in self.config.headers.iter().chain(extra.iter()) {
            insert_header(&mut headers, name, value)?;
        }

        Ok(headers)
    }
}

/// Build `/jobs/{type}/{name}` with an optional trailing segment,
/// percent-encoding each dynamic segment.
pub fn job_path(job_type: &str, name: &str, suffix: Option<&str>) -> String {
    let mut path = format!(
        "/jobs/{}/{}",
        urlencoding::encode(job_type),
        urlencoding::encode(name)
    );
    if let Some(suffix) = suffix {
        path.push('/');
        path.push_str(suffix);
    }
    path
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), ApiError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ApiError::Configuration(format!("Invalid header name '{}': {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::Configuration(format!("Invalid value for header '{}': {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}

fn read_pem(source: &str) -> AppResult<String> {
    if source.starts_with(PEM_MARKER) {
        return Ok(source.to_string());
    }
    std::fs::read_to_string(source).map_err(|e| {
        AppError::ConfigurationError(format!("Cannot read PEM file '{}': {}", source, e))
    })
}

fn load_identity(cert: &str, key: &str) -> AppResult<Identity> {
    let (cert, key) = if cert.starts_with(PEM_MARKER) && key.starts_with(PEM_MARKER) {
        (cert.to_string(), key.to_string())
    } else {
        (read_pem(cert)?, read_pem(key)?)
    };

    let bundle = format!("{}\n{}", cert.trim_end(), key);
    Identity::from_pem(bundle.as_bytes()).map_err(|e| {
        AppError::ConfigurationError(format!("Invalid client certificate or key: {}", e))
    })
}
