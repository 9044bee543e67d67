//! HTTP Client
//!
//! Blocking `reqwest` client shared by the Horizon, Soroban RPC and
//! directory clients, with:
//! - Connection pooling
//! - Built-in rate limiting per domain
//! - Responses read into memory so callers can branch on status

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::DATE;
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::log_debug;

/// Fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Date` header, if present
    pub date: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> WalletResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            WalletError::new(ErrorCode::JsonError, format!("Invalid response body: {}", e))
        })
    }

    /// Error for a non-2xx response
    pub fn status_error(&self, url: &str) -> WalletError {
        let code = match self.status {
            404 => ErrorCode::AccountNotFound,
            429 => ErrorCode::RateLimited,
            504 => ErrorCode::GatewayTimeout,
            _ => ErrorCode::NetworkError,
        };
        WalletError::new(code, format!("HTTP {} from {}", self.status, extract_domain(url)))
            .with_details(truncate(&self.body, 512))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// HTTP client with connection reuse and per-domain rate limiting
pub struct HttpClient {
    client: Client,
    rate_limiter: Mutex<super::RateLimiter>,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent(concat!("stellar-wallet-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WalletError::network_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rate_limiter: Mutex::new(super::RateLimiter::new(20, 1)),
        })
    }

    /// Make a GET request with rate limiting
    pub fn get(&self, url: &str) -> WalletResult<HttpResponse> {
        self.send(url, self.client.get(url))
    }

    /// GET and decode a 2xx JSON body
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> WalletResult<T> {
        let response = self.get(url)?;
        if !response.is_success() {
            return Err(response.status_error(url));
        }
        response.json()
    }

    /// Make a POST request with a JSON body
    pub fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> WalletResult<HttpResponse> {
        self.send(url, self.client.post(url).json(body))
    }

    /// Make a POST request with a form-encoded body
    pub fn post_form(&self, url: &str, form: &[(&str, &str)]) -> WalletResult<HttpResponse> {
        self.send(url, self.client.post(url).form(form))
    }

    fn send(&self, url: &str, request: RequestBuilder) -> WalletResult<HttpResponse> {
        self.check_rate_limit(url)?;
        log_debug!("http", "HTTP request", url = url);

        let response = request.send()?;
        let status = response.status().as_u16();
        let date = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;

        log_debug!("http", "HTTP response", url = url, status = status);
        Ok(HttpResponse { status, date, body })
    }

    /// Check rate limit for a domain
    fn check_rate_limit(&self, url: &str) -> WalletResult<()> {
        let domain = extract_domain(url);
        let mut limiter = self
            .rate_limiter
            .lock()
            .map_err(|_| WalletError::internal("Rate limiter lock poisoned"))?;

        if !limiter.check(&domain) {
            return Err(WalletError::rate_limited(format!(
                "Rate limit exceeded for {}",
                domain
            )));
        }
        Ok(())
    }
}

/// Extract `host[:port]` from a URL for rate limiting
pub fn extract_domain(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => url.to_string(),
        },
        Err(_) => url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or(url)
            .to_string(),
    }
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://horizon.stellar.org/accounts/GABC"),
            "horizon.stellar.org"
        );
        assert_eq!(extract_domain("http://localhost:8000/test"), "localhost:8000");
        assert_eq!(
            extract_domain("https://api.stellar.expert/explorer/directory?tag[]=memo-required"),
            "api.stellar.expert"
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://h.org/", "/fee_stats"), "https://h.org/fee_stats");
        assert_eq!(join_url("https://h.org", "accounts/G"), "https://h.org/accounts/G");
    }

    #[test]
    fn test_status_error_codes() {
        let response = HttpResponse {
            status: 404,
            date: None,
            body: "{}".to_string(),
        };
        assert_eq!(response.status_error("https://h.org").code, ErrorCode::AccountNotFound);

        let response = HttpResponse {
            status: 504,
            date: None,
            body: "x".repeat(1000),
        };
        let err = response.status_error("https://h.org");
        assert_eq!(err.code, ErrorCode::GatewayTimeout);
        assert!(err.details.unwrap().len() < 600);
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new(30).is_ok());
    }
}
