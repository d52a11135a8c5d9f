pub mod config;
pub mod error;
pub mod platform;
pub mod types;
pub mod url;

pub use config::Config;
pub use error::ShowreelError;
pub use platform::classify_platform;
pub use types::*;
pub use url::{canonicalize, fingerprint, CanonicalUrl};
