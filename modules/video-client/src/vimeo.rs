use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VideoError};

const VIMEO_OEMBED_URL: &str = "https://vimeo.com/api/oembed.json";

pub fn is_vimeo_url(url: &str) -> bool {
    url.contains("vimeo.com")
}

/// Extract the numeric video id from a Vimeo URL.
pub fn extract_vimeo_id(url: &str) -> Option<String> {
    let re = Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("valid regex");
    re.captures(url).map(|caps| caps[1].to_string())
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    thumbnail_url: Option<String>,
}

/// Vimeo has no predictable thumbnail URL scheme, so thumbnails go
/// through one oEmbed metadata lookup per video.
pub struct VimeoClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for VimeoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VimeoClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: VIMEO_OEMBED_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Look up the thumbnail for a Vimeo video URL.
    pub async fn thumbnail(&self, video_url: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("url", video_url)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VideoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: OembedResponse = resp.json().await?;
        debug!(video_url, found = data.thumbnail_url.is_some(), "Vimeo oEmbed lookup");
        Ok(data.thumbnail_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_vimeo_ids() {
        assert_eq!(
            extract_vimeo_id("https://vimeo.com/12345678"),
            Some("12345678".to_string())
        );
        assert_eq!(
            extract_vimeo_id("https://player.vimeo.com/video/12345678"),
            Some("12345678".to_string())
        );
        assert_eq!(extract_vimeo_id("https://vimeo.com/about"), None);
    }
}
