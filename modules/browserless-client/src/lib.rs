pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use tracing::debug;

/// Extra settle time after network idle, for players that attach their
/// embed markup from script after load.
const SETTLE_DELAY_MS: u64 = 2000;

/// Navigation timeout passed to the browser.
const GOTO_TIMEOUT_MS: u64 = 30_000;

/// Client for a Browserless deployment's /content endpoint: loads a
/// page in headless Chrome, waits for network idle plus a short settle
/// delay, and returns the fully script-rendered HTML. Used when static
/// parsing finds no video embeds on a page.
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(45))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch the rendered DOM for a URL.
    pub async fn rendered_content(&self, url: &str) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        debug!(url, "Browserless rendered-content request");

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": "networkidle2",
                "timeout": GOTO_TIMEOUT_MS,
            },
            "waitForTimeout": SETTLE_DELAY_MS,
        });

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Render {
                status: status.as_u16(),
                message,
            });
        }

        let html = resp.text().await?;
        // A blank document means the browser gave up on the page; the
        // caller should treat it like any other render failure.
        if html.trim().is_empty() {
            return Err(BrowserlessError::EmptyDocument(url.to_string()));
        }
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_its_own_failure_mode() {
        let err = BrowserlessError::EmptyDocument("https://example.com".to_string());
        assert!(err.to_string().contains("empty"));
        assert!(err.to_string().contains("https://example.com"));
    }
}

