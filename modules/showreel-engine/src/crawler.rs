use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

use showreel_common::{classify_platform, CrawledPage, Platform, SocialLink};

use crate::traits::{DomRenderer, PageFetcher};
use crate::video_refs;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ShowreelBot/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: usize = 5;

/// Caps keep downstream prompts and records bounded.
const MAX_IMAGES: usize = 20;
const MAX_TEXT_CHARS: usize = 10_000;

// --- HTTP fetcher ---

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .context("Page request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Page returned status {status}");
        }

        Ok(resp.text().await.context("Failed to read page body")?)
    }
}

// --- Crawler ---

/// Fetches a page and extracts its structured signals. Never fails:
/// transport and parse errors degrade to an empty CrawledPage so the
/// pipeline can proceed to synthesis with partial data.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Option<Arc<dyn DomRenderer>>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, renderer: Option<Arc<dyn DomRenderer>>) -> Self {
        Self { fetcher, renderer }
    }

    pub async fn crawl(&self, url: &str) -> CrawledPage {
        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "Crawl failed, returning degraded page");
                return CrawledPage::empty(url);
            }
        };

        let mut page = extract_page(url, &html);

        // Some pages attach their players only after client-side script
        // execution. When static parsing finds nothing and a renderer is
        // available, re-scan the rendered DOM. Strictly additive; a
        // renderer failure leaves the empty set.
        if page.video_urls.is_empty() {
            if let Some(renderer) = &self.renderer {
                info!(url, "No videos found statically, trying rendered DOM");
                match renderer.rendered_html(url).await {
                    Ok(rendered) => {
                        page.video_urls = video_refs::extract_rendered(&rendered);
                        info!(url, count = page.video_urls.len(), "Rendered-DOM video scan done");
                    }
                    Err(e) => {
                        warn!(url, error = %e, "Rendered-DOM extraction failed");
                    }
                }
            }
        }

        info!(
            url,
            images = page.images.len(),
            links = page.links.len(),
            social_links = page.social_links.len(),
            videos = page.video_urls.len(),
            "Crawl complete"
        );
        page
    }
}

/// Pure extraction from fetched HTML. Separated from transport so the
/// rules are testable without a network.
pub fn extract_page(url: &str, html: &str) -> CrawledPage {
    let metadata = extract_metadata(html);

    let title = extract_title(html)
        .or_else(|| metadata.get("og:title").cloned())
        .filter(|t| !t.is_empty());
    let description = metadata
        .get("description")
        .or_else(|| metadata.get("og:description"))
        .cloned()
        .filter(|d| !d.is_empty());

    let images = extract_images(html, url, metadata.get("og:image").map(String::as_str));
    let links = extract_links(html, url);
    let social_links = extract_social_links(&links);
    let video_urls = video_refs::extract_static(html, &links);
    let text_content = extract_text(html, url);

    CrawledPage {
        url: url.to_string(),
        title,
        description,
        images,
        links,
        social_links,
        text_content,
        metadata,
        video_urls,
    }
}

fn extract_title(html: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex");
    re.captures(html)
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

/// Collect og:*, twitter:* and named meta tags into one map.
fn extract_metadata(html: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    let meta_re = Regex::new(r"(?is)<meta[^>]*>").expect("valid regex");

    for tag in meta_re.find_iter(html) {
        let tag = tag.as_str();
        let content = match video_refs::tag_attr(tag, "content") {
            Some(c) if !c.is_empty() => c,
            _ => continue,
        };

        if let Some(property) = video_refs::tag_attr(tag, "property") {
            if property.starts_with("og:") {
                metadata.entry(property).or_insert(content);
                continue;
            }
        }
        if let Some(name) = video_refs::tag_attr(tag, "name") {
            metadata.entry(name).or_insert(content);
        }
    }

    metadata
}

fn resolve_url(raw: &str, base: &str) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    url::Url::parse(base).ok()?.join(raw).ok().map(|u| u.to_string())
}

/// All `<img src>` as absolute URLs, excluding data URIs and SVGs, with
/// the og:image (when present) given priority at the front. Deduplicated
/// and capped.
fn extract_images(html: &str, base_url: &str, og_image: Option<&str>) -> Vec<String> {
    let mut ordered = Vec::new();

    if let Some(og) = og_image {
        if let Some(resolved) = resolve_url(og, base_url) {
            ordered.push(resolved);
        }
    }

    let img_re = Regex::new(r"(?is)<img[^>]*>").expect("valid regex");
    for tag in img_re.find_iter(html) {
        let Some(src) = video_refs::tag_attr(tag.as_str(), "src") else {
            continue;
        };
        if src.starts_with("data:") {
            continue;
        }
        let Some(resolved) = resolve_url(&src, base_url) else {
            continue;
        };
        if resolved.contains(".svg") || resolved.starts_with("data:") {
            continue;
        }
        ordered.push(resolved);
    }

    let mut seen = std::collections::HashSet::new();
    ordered
        .into_iter()
        .filter(|u| seen.insert(u.clone()))
        .take(MAX_IMAGES)
        .collect()
}

/// Every `<a href>` except fragment-only and script-pseudo-protocol
/// links, resolved and deduplicated in document order.
fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let a_re = Regex::new(r"(?is)<a\s[^>]*>").expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for tag in a_re.find_iter(html) {
        let Some(href) = video_refs::tag_attr(tag.as_str(), "href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }
        let Some(resolved) = resolve_url(&href, base_url) else {
            continue;
        };
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}

/// First link per non-website platform, in link order.
pub fn extract_social_links(links: &[String]) -> Vec<SocialLink> {
    let mut seen = std::collections::HashSet::new();
    let mut social = Vec::new();

    for link in links {
        let platform = classify_platform(link);
        if platform != Platform::Website && seen.insert(platform) {
            social.push(SocialLink {
                platform,
                url: link.clone(),
            });
        }
    }

    social
}

/// Readability-extracted body text, whitespace-collapsed and capped.
fn extract_text(html: &str, url: &str) -> String {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    let text = transform_content_input(input, &config);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_TEXT_CHARS).collect()
}
