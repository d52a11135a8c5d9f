use serde::{Deserialize, Serialize};

/// One video from a platform's channel listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelVideo {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
}
