use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, VideoError};
use crate::types::ChannelVideo;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Channel listing page size. The API caps playlistItems at 50; 20
/// recent uploads is enough for title matching.
const CHANNEL_PAGE_SIZE: u32 = 20;

/// Extract the channel identifier segment from a channel URL. Handles
/// /channel/ ids as well as /c/, /@handle and /user/ forms.
pub fn extract_channel_identifier(url: &str) -> Option<String> {
    let patterns = [
        r"youtube\.com/channel/([^/?]+)",
        r"youtube\.com/c/([^/?]+)",
        r"youtube\.com/@([^/?]+)",
        r"youtube\.com/user/([^/?]+)",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(caps) = re.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Extract a video id from a watch/share/embed URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    let patterns = [
        r"youtube\.com/watch\?v=([^&]+)",
        r"youtu\.be/([^?]+)",
        r"youtube\.com/embed/([^?]+)",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(caps) = re.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Predictable thumbnail URL for a video id. No API call needed.
pub fn thumbnail_for_id(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

// --- API response shapes ---

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ChannelSearchItem {
    id: ChannelSearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSearchId {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    resource_id: ResourceId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSearchItem {
    id: VideoSearchId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSearchId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    title: String,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best(&self) -> String {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

/// A search hit for a project's own video (trailer or full film).
#[derive(Debug, Clone)]
pub struct VideoSearchHit {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub url: String,
}

pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.to_string(),
            base_url: YOUTUBE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        query.extend_from_slice(params);

        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
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

        Ok(resp.json().await?)
    }

    /// Resolve a channel URL to a channel id. Handle/custom/user URLs
    /// go through a channel search first.
    async fn resolve_channel_id(&self, channel_url: &str) -> Result<String> {
        let identifier = extract_channel_identifier(channel_url)
            .ok_or_else(|| VideoError::UnrecognizedChannel(channel_url.to_string()))?;

        if channel_url.contains("/channel/") {
            return Ok(identifier);
        }

        let data: ListResponse<ChannelSearchItem> = self
            .get_json(
                "/search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", identifier.as_str()),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        data.items
            .into_iter()
            .next()
            .map(|item| item.id.channel_id)
            .ok_or_else(|| VideoError::UnrecognizedChannel(channel_url.to_string()))
    }

    /// Fetch a channel's most recent uploads, newest first.
    pub async fn channel_videos(&self, channel_url: &str) -> Result<Vec<ChannelVideo>> {
        let channel_id = self.resolve_channel_id(channel_url).await?;

        let channels: ListResponse<ChannelItem> = self
            .get_json(
                "/channels",
                &[("part", "contentDetails"), ("id", channel_id.as_str())],
            )
            .await?;

        let uploads = channels
            .items
            .into_iter()
            .next()
            .map(|c| c.content_details.related_playlists.uploads)
            .ok_or_else(|| VideoError::UnrecognizedChannel(channel_url.to_string()))?;

        let page_size = CHANNEL_PAGE_SIZE.to_string();
        let playlist: ListResponse<PlaylistItem> = self
            .get_json(
                "/playlistItems",
                &[
                    ("part", "snippet"),
                    ("playlistId", uploads.as_str()),
                    ("maxResults", page_size.as_str()),
                ],
            )
            .await?;

        let videos: Vec<ChannelVideo> = playlist
            .items
            .into_iter()
            .map(|item| {
                let snippet = item.snippet;
                let video_id = snippet.resource_id.video_id;
                let description: String = snippet.description.chars().take(200).collect();
                ChannelVideo {
                    url: format!("https://www.youtube.com/watch?v={video_id}"),
                    thumbnail: snippet
                        .thumbnails
                        .as_ref()
                        .map(Thumbnails::best)
                        .unwrap_or_default(),
                    id: video_id,
                    title: snippet.title,
                    description,
                    published_at: snippet.published_at,
                }
            })
            .collect();

        info!(channel_url, count = videos.len(), "Fetched YouTube channel videos");
        Ok(videos)
    }

    /// Search for a project's own video using a trailer/short-film
    /// query ladder. Returns the first hit whose title contains the
    /// project title or shares a word longer than 3 characters.
    pub async fn search_project_video(
        &self,
        project_title: &str,
        is_short_film: bool,
    ) -> Result<Option<VideoSearchHit>> {
        let queries: Vec<String> = if is_short_film {
            vec![
                format!("{project_title} short film full"),
                format!("{project_title} short film"),
            ]
        } else {
            vec![
                format!("{project_title} official trailer"),
                format!("{project_title} trailer"),
            ]
        };

        let project_lower = project_title.to_lowercase();
        for query in &queries {
            let data: ListResponse<VideoSearchItem> = self
                .get_json(
                    "/search",
                    &[
                        ("part", "snippet"),
                        ("type", "video"),
                        ("q", query.as_str()),
                        ("maxResults", "5"),
                    ],
                )
                .await?;

            for item in data.items {
                let title_lower = item.snippet.title.to_lowercase();
                let word_hit = project_lower
                    .split(' ')
                    .any(|w| w.len() > 3 && title_lower.contains(w));
                if title_lower.contains(&project_lower) || word_hit {
                    debug!(project_title, video = %item.snippet.title, "YouTube project video found");
                    return Ok(Some(VideoSearchHit {
                        url: format!(
                            "https://www.youtube.com/watch?v={}",
                            item.id.video_id
                        ),
                        thumbnail: item
                            .snippet
                            .thumbnails
                            .as_ref()
                            .map(Thumbnails::best)
                            .unwrap_or_default(),
                        video_id: item.id.video_id,
                        title: item.snippet.title,
                    }));
                }
            }
        }

        debug!(project_title, "No YouTube video found for project");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_channel_identifiers() {
        assert_eq!(
            extract_channel_identifier("https://www.youtube.com/channel/UCabc123"),
            Some("UCabc123".to_string())
        );
        assert_eq!(
            extract_channel_identifier("https://www.youtube.com/@somehandle"),
            Some("somehandle".to_string())
        );
        assert_eq!(
            extract_channel_identifier("https://www.youtube.com/user/legacyname"),
            Some("legacyname".to_string())
        );
        assert_eq!(extract_channel_identifier("https://example.com"), None);
    }

    #[test]
    fn extracts_video_ids() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=x"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn parses_playlist_items() {
        let json = r#"{
            "items": [{
                "snippet": {
                    "resourceId": {"videoId": "abc123"},
                    "title": "Reel 2024",
                    "description": "Latest work",
                    "publishedAt": "2024-01-01T00:00:00Z",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg"}}
                }
            }]
        }"#;
        let parsed: ListResponse<PlaylistItem> = serde_json::from_str(json).unwrap();
        let snippet = &parsed.items[0].snippet;
        assert_eq!(snippet.resource_id.video_id, "abc123");
        assert_eq!(
            snippet.thumbnails.as_ref().map(Thumbnails::best).unwrap(),
            "https://i.ytimg.com/vi/abc123/hqdefault.jpg"
        );
    }

    #[test]
    fn thumbnail_pattern_is_stable() {
        assert_eq!(
            thumbnail_for_id("abc"),
            "https://i.ytimg.com/vi/abc/hqdefault.jpg"
        );
    }
}
