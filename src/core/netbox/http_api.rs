//! reqwest-backed implementation of [`NetBoxApi`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::api::{Endpoint, Filters, NetBoxApi};
use super::error::{NetBoxError, NetBoxResult};
use super::record::parse_page;
use crate::core::config::NetBoxConfig;

const BASE_DELAY_MS: u64 = 250;
const MAX_DELAY_MS: u64 = 30_000;
const MAX_PAGES: usize = 500;

/// NetBox REST client using token authentication.
pub struct HttpNetBoxApi {
    http: reqwest::Client,
    api_root: String,
    page_size: usize,
    max_retries: u32,
    base_delay_ms: u64,
}

impl HttpNetBoxApi {
    /// Build a client from configuration.
    pub fn new(config: &NetBoxConfig) -> NetBoxResult<Self> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| NetBoxError::Config("NETBOX_TOKEN is not set".to_string()))?;

        let mut auth = HeaderValue::from_str(&format!("Token {}", token.trim()))
            .map_err(|e| NetBoxError::Config(format!("token is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(concat!("netbox-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if !config.verify_ssl {
            warn!("TLS certificate verification disabled for {}", config.url);
        }

        Ok(Self {
            http,
            api_root: api_root(&config.url),
            page_size: config.page_size.max(1),
            max_retries: config.max_retries,
            base_delay_ms: BASE_DELAY_MS,
        })
    }

    fn collection_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}/", self.api_root, endpoint.path())
    }

    fn object_url(&self, endpoint: Endpoint, id: i64) -> String {
        format!("{}/{}/{}/", self.api_root, endpoint.path(), id)
    }

    /// GET with retries on transient failures.
    async fn get_json(&self, url: &str, query: &Filters) -> NetBoxResult<Value> {
        let mut attempt = 0u32;
        loop {
            let result = execute(self.http.get(url).query(query), "GET", url).await;
            match result {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = backoff_ms(self.base_delay_ms, attempt);
                    attempt += 1;
                    warn!(
                        "GET {} failed ({}), retry {}/{} in {}ms",
                        url, e, attempt, self.max_retries, delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                other => {
                    return other?
                        .ok_or_else(|| NetBoxError::invalid_response(format!("empty body from {url}")));
                }
            }
        }
    }
}

#[async_trait]
impl NetBoxApi for HttpNetBoxApi {
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    async fn list(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Vec<Value>> {
        let mut query = filters.clone();
        query.push(("limit".to_string(), self.page_size.to_string()));

        let mut page = parse_page(self.get_json(&self.collection_url(endpoint), &query).await?)?;
        let mut items = std::mem::take(&mut page.results);
        let mut pages = 1;

        while let Some(next) = page.next.take() {
            if pages >= MAX_PAGES {
                warn!("Stopping {} pagination after {} pages", endpoint, pages);
                break;
            }
            page = parse_page(self.get_json(&next, &Vec::new()).await?)?;
            items.append(&mut page.results);
            pages += 1;
        }

        debug!("Listed {} {} object(s) over {} page(s)", items.len(), endpoint.label(), pages);
        Ok(items)
    }

    async fn get(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<Value> {
        self.get_json(&self.object_url(endpoint, id), &Vec::new())
            .await
            .map_err(|e| not_found_as(e, endpoint, format!("#{id}")))
    }

    async fn create(&self, endpoint: Endpoint, body: &Value) -> NetBoxResult<Value> {
        let url = self.collection_url(endpoint);
        execute(self.http.post(&url).json(body), "POST", &url)
            .await?
            .ok_or_else(|| NetBoxError::invalid_response("create returned no body"))
    }

    async fn update(&self, endpoint: Endpoint, id: i64, body: &Value) -> NetBoxResult<Value> {
        let url = self.object_url(endpoint, id);
        execute(self.http.patch(&url).json(body), "PATCH", &url)
            .await
            .map_err(|e| not_found_as(e, endpoint, format!("#{id}")))?
            .ok_or_else(|| NetBoxError::invalid_response("update returned no body"))
    }

    async fn delete(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<()> {
        let url = self.object_url(endpoint, id);
        execute(self.http.delete(&url), "DELETE", &url)
            .await
            .map_err(|e| not_found_as(e, endpoint, format!("#{id}")))?;
        Ok(())
    }

    async fn status(&self) -> NetBoxResult<Value> {
        self.get_json(&format!("{}/status/", self.api_root), &Vec::new())
            .await
    }
}

/// Exponential backoff for retry `attempt`, capped at [`MAX_DELAY_MS`].
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(2u64.saturating_pow(attempt)).min(MAX_DELAY_MS)
}

fn api_root(url: &str) -> String {
    let base = url.trim().trim_end_matches('/');
    let base = base.strip_suffix("/api").unwrap_or(base);
    format!("{base}/api")
}

/// Send a request and classify the response.
///
/// Returns `Ok(None)` for empty success bodies (e.g. `204 No Content`).
async fn execute(request: RequestBuilder, method: &str, url: &str) -> NetBoxResult<Option<Value>> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        if bytes.is_empty() || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        return serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| NetBoxError::invalid_response(format!("{method} {url}: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    debug!("{} {} -> {}: {}", method, url, status, body);

    Err(match status {
        StatusCode::BAD_REQUEST => NetBoxError::Validation(body),
        StatusCode::NOT_FOUND => NetBoxError::not_found("NetBox resource", url),
        StatusCode::CONFLICT => NetBoxError::conflict(url, body),
        _ => NetBoxError::Upstream {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        },
    })
}

fn not_found_as(error: NetBoxError, endpoint: Endpoint, key: String) -> NetBoxError {
    match error {
        NetBoxError::NotFound { .. } => NetBoxError::not_found(endpoint.label(), key),
        other => other,
    }
}
