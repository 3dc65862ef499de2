pub mod error;
pub mod freq;
pub mod loader;
pub mod sink;
pub mod srt;
pub mod tagger;
pub mod word;

pub use error::{Error, Result};
