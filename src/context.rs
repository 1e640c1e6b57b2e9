//! Per-request and per-navigation state.

use serde_json::{Map, Value};
use std::collections::HashMap;
use url::Url;

/// Extracted path parameters, name to decoded value.
pub type Params = HashMap<String, String>;

/// Mutable per-request (server) or per-navigation (client) state.
///
/// Guards receive a view of this context and may rewrite its URL;
/// loaders receive the URL and params plus the context accumulated by
/// earlier frames.
#[derive(Debug, Clone)]
pub struct PageContext {
	/// The request URL. Guard rewrites mutate this in place.
	pub url: Url,
	/// Parameters extracted from the matched route.
	pub params: Params,
	/// Request-scoped values supplied by the host (session, auth, ...).
	pub locals: Map<String, Value>,
	/// Context accumulated so far; seeds the stack builder's fold.
	pub context: Map<String, Value>,
}

impl PageContext {
	/// Creates a fresh context for a request URL.
	pub fn new(url: Url) -> Self {
		Self {
			url,
			params: Params::new(),
			locals: Map::new(),
			context: Map::new(),
		}
	}

	/// Adds a request-scoped local value.
	pub fn with_local(mut self, key: impl Into<String>, value: Value) -> Self {
		self.locals.insert(key.into(), value);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_new_context() {
		let url = Url::parse("http://localhost/blog/hello").unwrap();
		let ctx = PageContext::new(url);
		assert_eq!(ctx.url.path(), "/blog/hello");
		assert!(ctx.params.is_empty());
		assert!(ctx.locals.is_empty());
	}

	#[test]
	fn test_with_local() {
		let url = Url::parse("http://localhost/").unwrap();
		let ctx = PageContext::new(url).with_local("user", json!({"id": 1}));
		assert_eq!(ctx.locals["user"]["id"], 1);
	}
}
