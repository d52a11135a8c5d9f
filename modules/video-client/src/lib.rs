pub mod error;
pub mod types;
pub mod vimeo;
pub mod youtube;

pub use error::{Result, VideoError};
pub use types::ChannelVideo;
pub use vimeo::{extract_vimeo_id, is_vimeo_url, VimeoClient};
pub use youtube::{extract_video_id, thumbnail_for_id, VideoSearchHit, YouTubeClient};
