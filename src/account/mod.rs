//! Account collaborators: remote API, shared cache, error messages.

pub mod cache;
pub mod client;
pub mod errors;

pub use cache::{AccountCache, CacheKey, InMemoryAccountCache};
pub use client::{AccountApi, HttpAccountClient};
pub use errors::{CatalogTranslator, ErrorTranslator};
