pub mod crawler;
pub mod enrichment;
pub mod matcher;
pub mod media;
pub mod pipeline;
pub mod store;
pub mod synthesizer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod video_refs;

pub use pipeline::{EngineDeps, ProfileEngine};
pub use store::{MemoryStore, ProfileStore};
