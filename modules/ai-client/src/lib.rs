pub mod gemini;
pub mod perplexity;
pub mod util;

pub use gemini::Gemini;
pub use perplexity::Perplexity;
