//! Route pattern compilation.
//!
//! Compiles file-route pattern strings such as `/blog/[slug]/[...rest]`
//! into anchored regular expressions with ordered parameter names.
//!
//! # Pattern Syntax
//!
//! - `[name]` captures one path segment (excludes `/`)
//! - `[...name]` as the final segment captures the remaining path,
//!   including its leading slash, and also matches the empty remainder
//! - segments equal to `index`, starting with `_`, or fully parenthesized
//!   `(group)` are dropped: they are neither matched nor captured
//! - a segment may hold several placeholders separated by literal `.` or
//!   `-` (`[year]-[month]`); any other literal text beside a placeholder
//!   is a compile error
//!
//! Compilation failures are fatal: they happen while the route table is
//! built, before anything is served.

use crate::config::RouterConfig;
use crate::error::PatternError;
use std::collections::HashMap;

/// One kept segment of a compiled pattern, retained for specificity
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSegment {
	/// The raw segment text as written, brackets included.
	pub text: String,
	/// Number of placeholders in this segment.
	pub param_count: usize,
}

/// A compiled route pattern. Immutable after compilation.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled anchored regex.
	regex: regex::Regex,
	/// Parameter names in capture order, catch-all last.
	param_names: Vec<String>,
	/// Name of the catch-all parameter, if any.
	rest_param: Option<String>,
	/// Kept segments, catch-all excluded.
	segments: Vec<PatternSegment>,
	/// Count of `[` across the whole pattern string.
	placeholder_count: usize,
}

/// The parsed pieces of one segment: literal runs and placeholder names,
/// in order.
enum SegmentPart {
	Literal(String),
	Param(String),
}

impl RoutePattern {
	/// Compiles a pattern string with the default limits.
	pub fn compile(pattern: &str) -> Result<Self, PatternError> {
		Self::compile_with(pattern, &RouterConfig::default())
	}

	/// Compiles a pattern string under the given configuration limits.
	pub fn compile_with(pattern: &str, config: &RouterConfig) -> Result<Self, PatternError> {
		if !pattern.starts_with('/') {
			return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
		}
		if pattern.len() > config.max_pattern_length {
			return Err(PatternError::TooLong {
				len: pattern.len(),
				max: config.max_pattern_length,
			});
		}
		let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
		if raw_segments.len() > config.max_path_segments {
			return Err(PatternError::TooManySegments {
				count: raw_segments.len(),
				max: config.max_path_segments,
			});
		}

		let kept: Vec<&str> = raw_segments
			.iter()
			.copied()
			.filter(|s| !is_dropped_segment(s))
			.collect();

		let mut regex_str = String::from("^");
		let mut param_names: Vec<String> = Vec::new();
		let mut rest_param = None;
		let mut segments = Vec::new();

		for (index, segment) in kept.iter().enumerate() {
			if let Some(rest) = parse_rest_segment(segment) {
				if index + 1 != kept.len() {
					return Err(PatternError::CatchAllNotLast(segment.to_string()));
				}
				let name = rest?;
				if param_names.contains(&name) {
					return Err(PatternError::DuplicateParam(name));
				}
				param_names.push(name.clone());
				rest_param = Some(name);
				// Captures the remainder with its leading slash; also
				// matches the empty remainder.
				regex_str.push_str("((?:/.*)?)$");
				break;
			}

			let parts = parse_segment(segment)?;
			regex_str.push('/');
			for part in &parts {
				match part {
					SegmentPart::Literal(text) => regex_str.push_str(&regex::escape(text)),
					SegmentPart::Param(name) => {
						if param_names.contains(name) {
							return Err(PatternError::DuplicateParam(name.clone()));
						}
						param_names.push(name.clone());
						regex_str.push_str("([^/]+)");
					}
				}
			}
			segments.push(PatternSegment {
				text: segment.to_string(),
				param_count: parts
					.iter()
					.filter(|p| matches!(p, SegmentPart::Param(_)))
					.count(),
			});
		}

		if rest_param.is_none() {
			// Accept an optional trailing slash.
			regex_str.push_str("/?$");
		}

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(config.max_regex_size)
			.build()
			.map_err(|e| PatternError::Regex(e.to_string()))?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
			rest_param,
			segments,
			placeholder_count: pattern.matches('[').count(),
		})
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in capture order, catch-all last.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the catch-all parameter name, if any.
	pub fn rest_param(&self) -> Option<&str> {
		self.rest_param.as_deref()
	}

	/// Returns the kept segments, catch-all excluded.
	pub fn segments(&self) -> &[PatternSegment] {
		&self.segments
	}

	/// Returns the count of `[` across the whole pattern string.
	pub fn placeholder_count(&self) -> usize {
		self.placeholder_count
	}

	/// Returns whether the pattern ends in a catch-all.
	pub fn is_rest(&self) -> bool {
		self.rest_param.is_some()
	}

	/// Checks whether this pattern matches the given path.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches a path, returning raw captured values paired with their
	/// parameter names, in pattern order. No percent-decoding is applied.
	pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
		self.regex.captures(path).map(|caps| {
			self.param_names
				.iter()
				.enumerate()
				.map(|(i, name)| {
					let value = caps
						.get(i + 1)
						.map(|m| m.as_str().to_string())
						.unwrap_or_default();
					(name.clone(), value)
				})
				.collect()
		})
	}

	/// Generates a concrete path by substituting parameter values.
	///
	/// Dropped segments do not appear in the output. The catch-all value
	/// is appended verbatim and is expected to be empty or begin with
	/// `/`. Returns `None` if a parameter is missing.
	pub fn fill(&self, params: &HashMap<String, String>) -> Option<String> {
		let mut path = String::new();
		for segment in &self.segments {
			path.push('/');
			let parts = parse_segment(&segment.text).ok()?;
			for part in &parts {
				match part {
					SegmentPart::Literal(text) => path.push_str(text),
					SegmentPart::Param(name) => path.push_str(params.get(name)?),
				}
			}
		}
		if let Some(rest) = &self.rest_param {
			path.push_str(params.get(rest)?);
		}
		if path.is_empty() {
			path.push('/');
		}
		Some(path)
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// Returns whether a segment is dropped from matching: `index`,
/// `_`-prefixed, or a fully parenthesized `(group)`.
fn is_dropped_segment(segment: &str) -> bool {
	segment == "index"
		|| segment.starts_with('_')
		|| (segment.starts_with('(') && segment.ends_with(')'))
}

/// Recognizes a `[...name]` catch-all segment. Returns `None` when the
/// segment is not a catch-all, otherwise the validated name.
fn parse_rest_segment(segment: &str) -> Option<Result<String, PatternError>> {
	let inner = segment.strip_prefix("[...")?.strip_suffix(']')?;
	if inner.is_empty() {
		return Some(Err(PatternError::EmptyParam(segment.to_string())));
	}
	if inner.contains('[') || inner.contains(']') {
		return Some(Err(PatternError::NestedBracket(segment.to_string())));
	}
	Some(Ok(inner.to_string()))
}

/// Parses one segment into literal runs and placeholder names, then
/// validates the separator rule: literal text in a segment that carries
/// placeholders may only consist of `.` and `-`.
fn parse_segment(segment: &str) -> Result<Vec<SegmentPart>, PatternError> {
	let mut parts = Vec::new();
	let mut literal = String::new();
	let mut param: Option<String> = None;

	for c in segment.chars() {
		match c {
			'[' => {
				if param.is_some() {
					return Err(PatternError::NestedBracket(segment.to_string()));
				}
				if !literal.is_empty() {
					parts.push(SegmentPart::Literal(std::mem::take(&mut literal)));
				}
				param = Some(String::new());
			}
			']' => match param.take() {
				Some(name) if name.is_empty() => {
					return Err(PatternError::EmptyParam(segment.to_string()));
				}
				Some(name) => parts.push(SegmentPart::Param(name)),
				None => return Err(PatternError::UnmatchedBracket(segment.to_string())),
			},
			_ => match &mut param {
				Some(name) => name.push(c),
				None => literal.push(c),
			},
		}
	}
	if param.is_some() {
		return Err(PatternError::UnclosedBracket(segment.to_string()));
	}
	if !literal.is_empty() {
		parts.push(SegmentPart::Literal(literal));
	}

	let has_params = parts.iter().any(|p| matches!(p, SegmentPart::Param(_)));
	if has_params {
		for part in &parts {
			if let SegmentPart::Literal(text) = part {
				if !text.chars().all(|c| c == '.' || c == '-') {
					return Err(PatternError::InvalidSeparator {
						segment: segment.to_string(),
						literal: text.clone(),
					});
				}
			}
		}
	}

	Ok(parts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_static_pattern() {
		let pattern = RoutePattern::compile("/about").unwrap();
		assert!(pattern.is_match("/about"));
		assert!(pattern.is_match("/about/"));
		assert!(!pattern.is_match("/about/us"));
		assert!(pattern.param_names().is_empty());
	}

	#[test]
	fn test_root_pattern() {
		let pattern = RoutePattern::compile("/").unwrap();
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/x"));
	}

	#[test]
	fn test_single_param() {
		let pattern = RoutePattern::compile("/blog/[slug]").unwrap();
		assert_eq!(pattern.param_names(), &["slug"]);

		let captures = pattern.captures("/blog/hello-world").unwrap();
		assert_eq!(captures, vec![("slug".to_string(), "hello-world".to_string())]);
		assert!(!pattern.is_match("/blog"));
		assert!(!pattern.is_match("/blog/a/b"));
	}

	#[test]
	fn test_multi_param_segment() {
		let pattern = RoutePattern::compile("/archive/[year]-[month]").unwrap();
		assert_eq!(pattern.param_names(), &["year", "month"]);

		let captures = pattern.captures("/archive/2024-06").unwrap();
		assert_eq!(captures[0].1, "2024");
		assert_eq!(captures[1].1, "06");
	}

	#[test]
	fn test_dot_separated_params() {
		let pattern = RoutePattern::compile("/files/[name].[ext]").unwrap();
		let captures = pattern.captures("/files/report.pdf").unwrap();
		assert_eq!(captures[0].1, "report");
		assert_eq!(captures[1].1, "pdf");
	}

	#[test]
	fn test_catch_all() {
		let pattern = RoutePattern::compile("/docs/[...rest]").unwrap();
		assert!(pattern.is_rest());
		assert_eq!(pattern.rest_param(), Some("rest"));

		let captures = pattern.captures("/docs/a/b/c").unwrap();
		assert_eq!(captures[0].1, "/a/b/c");

		// Catch-all also matches the empty remainder.
		let captures = pattern.captures("/docs").unwrap();
		assert_eq!(captures[0].1, "");
	}

	#[test]
	fn test_catch_all_with_param() {
		let pattern = RoutePattern::compile("/blog/[slug]/[...rest]").unwrap();
		assert_eq!(pattern.param_names(), &["slug", "rest"]);

		let captures = pattern.captures("/blog/post/images/1.png").unwrap();
		assert_eq!(captures[0].1, "post");
		assert_eq!(captures[1].1, "/images/1.png");
	}

	#[rstest]
	#[case("/index", "/")]
	#[case("/blog/index", "/blog")]
	#[case("/(marketing)/pricing", "/pricing")]
	#[case("/_private/settings", "/settings")]
	fn test_dropped_segments(#[case] pattern: &str, #[case] path: &str) {
		let compiled = RoutePattern::compile(pattern).unwrap();
		assert!(compiled.is_match(path), "{pattern} should match {path}");
	}

	#[test]
	fn test_dropped_segments_not_captured() {
		let pattern = RoutePattern::compile("/(shop)/items/[id]/index").unwrap();
		assert_eq!(pattern.param_names(), &["id"]);
		let captures = pattern.captures("/items/42").unwrap();
		assert_eq!(captures[0].1, "42");
	}

	#[test]
	fn test_literal_escaping() {
		let pattern = RoutePattern::compile("/api/v1.0").unwrap();
		assert!(pattern.is_match("/api/v1.0"));
		assert!(!pattern.is_match("/api/v1X0"));
	}

	#[rstest]
	#[case("/blog/[slug", PatternError::UnclosedBracket("[slug".to_string()))]
	#[case("/blog/slug]", PatternError::UnmatchedBracket("slug]".to_string()))]
	#[case("/blog/[[slug]", PatternError::NestedBracket("[[slug]".to_string()))]
	#[case("/blog/[]", PatternError::EmptyParam("[]".to_string()))]
	fn test_malformed_brackets(#[case] pattern: &str, #[case] expected: PatternError) {
		assert_eq!(RoutePattern::compile(pattern).unwrap_err(), expected);
	}

	#[test]
	fn test_invalid_separator() {
		let err = RoutePattern::compile("/posts/v[major]").unwrap_err();
		assert!(matches!(err, PatternError::InvalidSeparator { .. }));

		let err = RoutePattern::compile("/posts/[a]_[b]").unwrap_err();
		assert!(matches!(err, PatternError::InvalidSeparator { .. }));
	}

	#[test]
	fn test_duplicate_param() {
		let err = RoutePattern::compile("/a/[x]/b/[x]").unwrap_err();
		assert_eq!(err, PatternError::DuplicateParam("x".to_string()));
	}

	#[test]
	fn test_catch_all_must_be_last() {
		let err = RoutePattern::compile("/docs/[...rest]/extra").unwrap_err();
		assert!(matches!(err, PatternError::CatchAllNotLast(_)));
	}

	#[test]
	fn test_missing_leading_slash() {
		let err = RoutePattern::compile("blog/[slug]").unwrap_err();
		assert!(matches!(err, PatternError::MissingLeadingSlash(_)));
	}

	#[test]
	fn test_pattern_length_limit() {
		let long = format!("/{}", "a".repeat(2000));
		let err = RoutePattern::compile(&long).unwrap_err();
		assert!(matches!(err, PatternError::TooLong { .. }));
	}

	#[test]
	fn test_segment_count_limit() {
		let deep = (0..40).map(|_| "seg").collect::<Vec<_>>().join("/");
		let err = RoutePattern::compile(&format!("/{deep}")).unwrap_err();
		assert!(matches!(err, PatternError::TooManySegments { .. }));
	}

	#[test]
	fn test_fill_round_trip() {
		let pattern = RoutePattern::compile("/blog/[slug]").unwrap();
		let mut params = HashMap::new();
		params.insert("slug".to_string(), "hello".to_string());

		let path = pattern.fill(&params).unwrap();
		assert_eq!(path, "/blog/hello");
		let captures = pattern.captures(&path).unwrap();
		assert_eq!(captures[0].1, "hello");
	}

	#[test]
	fn test_fill_skips_dropped_segments() {
		let pattern = RoutePattern::compile("/(group)/users/[id]/index").unwrap();
		let mut params = HashMap::new();
		params.insert("id".to_string(), "7".to_string());
		assert_eq!(pattern.fill(&params), Some("/users/7".to_string()));
	}

	#[test]
	fn test_fill_rest() {
		let pattern = RoutePattern::compile("/docs/[...rest]").unwrap();
		let mut params = HashMap::new();
		params.insert("rest".to_string(), "/a/b".to_string());
		assert_eq!(pattern.fill(&params), Some("/docs/a/b".to_string()));
	}

	#[test]
	fn test_fill_missing_param() {
		let pattern = RoutePattern::compile("/blog/[slug]").unwrap();
		assert_eq!(pattern.fill(&HashMap::new()), None);
	}

	#[test]
	fn test_placeholder_count() {
		let pattern = RoutePattern::compile("/a/[x]/[y]-[z]").unwrap();
		assert_eq!(pattern.placeholder_count(), 3);
	}

	#[test]
	fn test_display() {
		let pattern = RoutePattern::compile("/blog/[slug]").unwrap();
		assert_eq!(format!("{}", pattern), "/blog/[slug]");
	}
}
