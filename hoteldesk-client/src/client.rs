//! REST API client
//!
//! Every request resolves against the configured base URL, carries the bearer
//! token when one is given, and is retried once when it fails at the
//! transport level. HTTP status errors are never retried.

use futures::FutureExt;
use hoteldesk_core::{retry_async_if, ApiConfig, ErrorContext, HotelDeskError, RetryConfig};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{ClientError, ClientResult};

/// HTTP client for the dashboard API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| HotelDeskError::Config {
            message: format!("Invalid API base URL '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_client")
                .with_operation("create_client")
                .with_suggestion("Set api.base_url or HOTELDESK_API_URL"),
        })?;

        let client = create_http_client(config)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("Created API client for {}", base_url);

        Ok(Self {
            client,
            base_url,
            retry: RetryConfig::with_retries(config.retry_attempts),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document
    pub async fn get_json<T>(&self, path: &str, token: Option<&str>) -> ClientResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(Method::GET, path, token, None).await
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Core(e.into()))?;
        self.execute(Method::POST, path, token, Some(body)).await
    }

    /// `GET /{collection}`
    pub async fn list<T>(&self, collection: &str, token: Option<&str>) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = urlencoding::encode(collection).into_owned();
        self.get_json(&path, token).await
    }

    /// `GET /{collection}/{id}`
    pub async fn get<T>(&self, collection: &str, id: &str, token: Option<&str>) -> ClientResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = format!(
            "{}/{}",
            urlencoding::encode(collection),
            urlencoding::encode(id)
        );
        self.get_json(&path, token).await
    }

    async fn execute<T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path);
        debug!(%method, %url, authenticated = token.is_some(), "Sending API request");

        let operation = {
            let client = self.client.clone();
            let url = url.clone();
            let token = token.map(str::to_string);
            move || {
                let mut request = client.request(method.clone(), &url);
                if let Some(token) = &token {
                    request = request.bearer_auth(token);
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }
                send::<T>(request).boxed()
            }
        };

        retry_async_if(operation, self.retry.clone(), &url, ClientError::is_transport).await
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> ClientResult<T> {
    let response = request.send().await.map_err(transport_error)?;
    let response = check_status(response).await?;

    let url = response.url().to_string();
    let bytes = response.bytes().await.map_err(transport_error)?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
        url,
        message: e.to_string(),
    })
}

fn transport_error(error: reqwest::Error) -> ClientError {
    ClientError::Transport {
        message: error.to_string(),
        source: error,
    }
}

/// Map non-success statuses onto the error taxonomy
async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    match status.as_u16() {
        401 => Err(ClientError::Unauthorized),
        404 => Err(ClientError::NotFound {
            resource: url.path().to_string(),
        }),
        code => {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Status {
                status: code,
                url: url.to_string(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body
                },
            })
        }
    }
}

/// Helper function to create HTTP client with common configuration
fn create_http_client(config: &ApiConfig) -> ClientResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            HotelDeskError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| HotelDeskError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = ApiClient::new(&config("http://localhost:3001/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/api");
        assert_eq!(client.endpoint("/auth/me"), "http://localhost:3001/api/auth/me");
        assert_eq!(client.endpoint("hotels"), "http://localhost:3001/api/hotels");
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        let err = ApiClient::new(&config("not a url")).unwrap_err();
        assert!(matches!(err, ClientError::Core(HotelDeskError::Config { .. })));
    }

    #[test]
    fn test_only_transport_errors_retry() {
        assert!(!ClientError::Unauthorized.is_transport());
        assert!(!ClientError::NotFound {
            resource: "/api/guests/G1".to_string()
        }
        .is_transport());
        assert!(ClientError::Unauthorized.is_unauthorized());
    }
}
