//! Media reconciliation: replace guessed media items with real channel
//! uploads, deduplicate by URL, and back-fill project cover images from
//! video thumbnails.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use showreel_common::{classify_platform, MediaItem, Platform, Project, SocialLink};
use video_client::{extract_video_id, thumbnail_for_id, ChannelVideo};

use crate::matcher::titles_match;
use crate::traits::{ChannelVideoSource, ThumbnailLookup};

/// Title-overlap bar for matching a project against a channel upload.
const VIDEO_TITLE_THRESHOLD: f32 = 0.5;

pub struct Reconciler {
    channel_sources: Vec<Arc<dyn ChannelVideoSource>>,
    thumbnailer: Option<Arc<dyn ThumbnailLookup>>,
}

impl Reconciler {
    pub fn new(
        channel_sources: Vec<Arc<dyn ChannelVideoSource>>,
        thumbnailer: Option<Arc<dyn ThumbnailLookup>>,
    ) -> Self {
        Self {
            channel_sources,
            thumbnailer,
        }
    }

    /// Fetch recent uploads for every social link that has a registered
    /// channel source. Failures degrade to missing entries.
    pub async fn fetch_channel_videos(
        &self,
        social_links: &[SocialLink],
    ) -> HashMap<Platform, Vec<ChannelVideo>> {
        let lookups = social_links.iter().filter_map(|link| {
            let source = self
                .channel_sources
                .iter()
                .find(|s| s.platform() == link.platform)?;
            Some(async move {
                match source.channel_videos(&link.url).await {
                    Ok(videos) => {
                        info!(platform = %link.platform, count = videos.len(), "Fetched channel uploads");
                        Some((link.platform, videos))
                    }
                    Err(e) => {
                        warn!(platform = %link.platform, url = %link.url, error = %e, "Channel listing failed");
                        None
                    }
                }
            })
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Merge synthesized media with real channel uploads. Uploads for a
    /// platform replace synthesized items attributed to that platform,
    /// since the real listing supersedes the guess. Deduplicated by
    /// URL, first occurrence wins.
    pub fn merge_media(
        &self,
        synthesized: Vec<MediaItem>,
        channel_videos: &HashMap<Platform, Vec<ChannelVideo>>,
    ) -> Vec<MediaItem> {
        let mut merged: Vec<MediaItem> = Vec::new();

        for (platform, videos) in channel_videos {
            for video in videos {
                merged.push(MediaItem {
                    id: format!("{}-{}", platform, video.id),
                    url: video.url.clone(),
                    title: video.title.clone(),
                    description: Some(video.description.clone())
                        .filter(|d| !d.is_empty()),
                    platform: *platform,
                    thumbnail: Some(video.thumbnail.clone()).filter(|t| !t.is_empty()),
                });
            }
        }

        for item in synthesized {
            let platform = classify_platform(&item.url);
            if channel_videos.contains_key(&platform) {
                continue;
            }
            merged.push(item);
        }

        let mut seen = std::collections::HashSet::new();
        merged.retain(|m| seen.insert(m.url.clone()));
        merged
    }

    /// Back-fill cover images for coverless, unlocked projects:
    /// first from a channel upload whose title matches the project,
    /// then from the project's own source video URL.
    pub async fn fill_project_covers(
        &self,
        projects: Vec<Project>,
        channel_videos: &HashMap<Platform, Vec<ChannelVideo>>,
    ) -> Vec<Project> {
        join_all(
            projects
                .into_iter()
                .map(|p| self.fill_one_cover(p, channel_videos)),
        )
        .await
    }

    async fn fill_one_cover(
        &self,
        mut project: Project,
        channel_videos: &HashMap<Platform, Vec<ChannelVideo>>,
    ) -> Project {
        if project.cover_image_locked || project.cover_image.is_some() {
            return project;
        }

        for videos in channel_videos.values() {
            if let Some(video) = videos.iter().find(|v| {
                !v.thumbnail.is_empty()
                    && titles_match(&project.title, &v.title, VIDEO_TITLE_THRESHOLD)
            }) {
                info!(project = %project.title, video = %video.title, "Cover from channel upload");
                project.cover_image = Some(video.thumbnail.clone());
                project.has_video = true;
                if project.source_url.is_none() {
                    project.source_url = Some(video.url.clone());
                }
                return project;
            }
        }

        if let Some(source_url) = project.source_url.clone() {
            if let Some(thumb) = self.thumbnail_for_url(&source_url).await {
                project.cover_image = Some(thumb);
                project.has_video = true;
                return project;
            }
        }

        self.search_video_cover(project).await
    }

    /// Last resort: search the video platforms for the project's own
    /// trailer or full film.
    async fn search_video_cover(&self, mut project: Project) -> Project {
        let is_short_film = is_short_film(&project);
        for source in &self.channel_sources {
            match source.search_project_video(&project.title, is_short_film).await {
                Ok(Some(hit)) if !hit.thumbnail.is_empty() => {
                    info!(project = %project.title, video = %hit.title, "Cover from video search");
                    project.cover_image = Some(hit.thumbnail);
                    project.has_video = true;
                    if project.source_url.is_none() {
                        project.source_url = Some(hit.url);
                    }
                    return project;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(project = %project.title, error = %e, "Video search failed");
                }
            }
        }
        project
    }

    async fn thumbnail_for_url(&self, url: &str) -> Option<String> {
        if let Some(id) = extract_video_id(url) {
            return Some(thumbnail_for_id(&id));
        }
        if video_client::is_vimeo_url(url) {
            if let Some(thumbnailer) = &self.thumbnailer {
                match thumbnailer.thumbnail(url).await {
                    Ok(thumb) => return thumb,
                    Err(e) => {
                        warn!(url, error = %e, "Thumbnail lookup failed");
                    }
                }
            }
        }
        None
    }
}

/// Short-film searches use a different query ladder than trailers.
fn is_short_film(project: &Project) -> bool {
    let mut haystack = project.title.to_lowercase();
    if let Some(description) = &project.description {
        haystack.push(' ');
        haystack.push_str(&description.to_lowercase());
    }
    haystack.contains("short")
}
