pub mod error;
pub mod omdb;
pub mod tmdb;
pub mod types;

pub use error::{CatalogError, Result};
pub use omdb::OmdbClient;
pub use tmdb::{build_poster_url, TmdbClient};
pub use types::{CandidateMatch, MatchKind};
