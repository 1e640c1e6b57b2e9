//! Redirect responses.
//!
//! A redirect is not an error: it short-circuits resolution or stack
//! building and travels to the transport layer, which emits the status
//! and `Location` header. The HTML fallback body covers agents that
//! ignore redirects, such as static-export crawlers.

/// A redirect produced by a guard or a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
	location: String,
	status: u16,
}

impl RedirectResponse {
	/// Creates a redirect. The status defaults to 302.
	pub fn new(location: impl Into<String>, status: Option<u16>) -> Self {
		Self {
			location: location.into(),
			status: status.unwrap_or(302),
		}
	}

	/// Creates a permanent (301) redirect.
	pub fn permanent(location: impl Into<String>) -> Self {
		Self {
			location: location.into(),
			status: 301,
		}
	}

	/// Returns the redirect target.
	pub fn location(&self) -> &str {
		&self.location
	}

	/// Returns the HTTP status.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Returns whether this is a permanent redirect.
	pub fn is_permanent(&self) -> bool {
		self.status == 301
	}

	/// Renders a minimal HTML body with a meta refresh and a clickable
	/// link, for agents that do not follow the `Location` header.
	pub fn html_fallback(&self) -> String {
		let href = escape_attr(&self.location);
		format!(
			"<!doctype html><html><head><meta http-equiv=\"refresh\" content=\"0;url={href}\"></head><body><a href=\"{href}\">Redirecting to {href}</a></body></html>"
		)
	}
}

fn escape_attr(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_status() {
		let redirect = RedirectResponse::new("/login", None);
		assert_eq!(redirect.status(), 302);
		assert!(!redirect.is_permanent());
	}

	#[test]
	fn test_permanent() {
		let redirect = RedirectResponse::permanent("/new-home");
		assert_eq!(redirect.status(), 301);
		assert!(redirect.is_permanent());
	}

	#[test]
	fn test_html_fallback() {
		let redirect = RedirectResponse::new("/login?next=/admin", Some(302));
		let html = redirect.html_fallback();
		assert!(html.contains("meta http-equiv=\"refresh\""));
		assert!(html.contains("<a href=\"/login?next=/admin\">"));
	}

	#[test]
	fn test_html_fallback_escapes_location() {
		let redirect = RedirectResponse::new("/x?a=1&b=\"<script>\"", None);
		let html = redirect.html_fallback();
		assert!(!html.contains("<script>"));
		assert!(html.contains("&amp;b="));
	}
}
