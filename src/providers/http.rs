//! Shared HTTP plumbing for the built-in integrations.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

use crate::{Result, WaypostError};

const USER_AGENT: &str = concat!("waypost/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for upstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WaypostError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Join `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| WaypostError::Configuration(format!("invalid base URL {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| WaypostError::Configuration(format!("base URL {base:?} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send `request` and decode a JSON body, mapping failures by status.
pub(crate) async fn send_json(request: RequestBuilder, provider: &str) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| WaypostError::Http(e.to_string()))?;
    let response = check_status(response, provider).await?;
    response
        .json()
        .await
        .map_err(|e| WaypostError::Http(format!("{provider}: malformed response body: {e}")))
}

async fn check_status(response: Response, provider: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);
    let url = response.url().path().to_string();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }

    match status.as_u16() {
        401 | 403 => Err(WaypostError::AuthenticationFailed(provider.to_string())),
        404 => Err(WaypostError::NotFound(url)),
        429 => Err(WaypostError::RateLimited {
            provider: provider.to_string(),
            retry_after,
        }),
        code => Err(WaypostError::Api {
            status: code,
            message: if body.is_empty() {
                format!("{provider}: {status}")
            } else {
                format!("{provider}: {body}")
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint("https://en.wikipedia.org", &["api", "rest_v1", "page", "summary", "Heat death"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Heat%20death"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let url = endpoint("http://127.0.0.1:9000/", &["v1", "forecast"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/forecast");
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        assert!(matches!(
            endpoint("not a url", &["x"]),
            Err(WaypostError::Configuration(_))
        ));
    }
}
