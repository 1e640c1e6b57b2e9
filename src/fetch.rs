//! Transport boundary for loaders.
//!
//! The router never performs I/O itself. Loaders receive whatever
//! [`Fetcher`] the host wires in; the HTTP client, its pooling, and its
//! credentials all live outside this crate.

use crate::error::LoadError;
use async_trait::async_trait;

/// A minimal response surface for loader fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: String,
}

/// Async transport handed through to loaders untouched.
#[async_trait]
pub trait Fetcher: Send + Sync {
	/// Fetches a URL, returning status and body.
	async fn fetch(&self, url: &str) -> Result<FetchResponse, LoadError>;
}

/// Default fetcher for contexts with no transport wired in. Every fetch
/// fails with a descriptive error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

#[async_trait]
impl Fetcher for NoFetch {
	async fn fetch(&self, url: &str) -> Result<FetchResponse, LoadError> {
		Err(LoadError::new(format!(
			"no fetcher configured for request to '{url}'"
		)))
	}
}
