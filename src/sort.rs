//! Route specificity ordering.
//!
//! Routes are sorted once, at table build time, so that the resolver's
//! top-to-bottom scan always finds the most specific match first: exact
//! static routes outrank parametric ones at the same depth, shallower
//! routes outrank deeper ones sharing a prefix, and catch-alls are
//! always the fallback.
//!
//! The ordering is stable and deterministic for identical inputs;
//! downstream code generation relies on that.

use crate::pattern::RoutePattern;
use std::cmp::Ordering;

/// Compares two compiled patterns by specificity, most specific first.
///
/// Applied lexicographically:
/// 1. non-rest routes before rest routes
/// 2. fewer total placeholders before more
/// 3. segment by segment: a shorter route before a longer one at the
///    point of difference; a purely static segment before one with any
///    placeholder; fewer placeholders per segment before more; literal
///    text comparison last
pub fn compare_specificity(a: &RoutePattern, b: &RoutePattern) -> Ordering {
	a.is_rest()
		.cmp(&b.is_rest())
		.then_with(|| a.placeholder_count().cmp(&b.placeholder_count()))
		.then_with(|| compare_segments(a, b))
}

/// Sorts a slice of items carrying patterns by specificity, stably.
pub fn sort_by_specificity<T, F>(items: &mut [T], pattern_of: F)
where
	F: Fn(&T) -> &RoutePattern,
{
	items.sort_by(|a, b| compare_specificity(pattern_of(a), pattern_of(b)));
}

fn compare_segments(a: &RoutePattern, b: &RoutePattern) -> Ordering {
	let left = a.segments();
	let right = b.segments();
	let len = left.len().max(right.len());

	for i in 0..len {
		let ordering = match (left.get(i), right.get(i)) {
			// The shorter route wins at the point of difference.
			(None, Some(_)) => Ordering::Less,
			(Some(_), None) => Ordering::Greater,
			(None, None) => Ordering::Equal,
			(Some(sa), Some(sb)) => {
				// A purely static segment beats any placeholder segment.
				let static_order = (sa.param_count > 0).cmp(&(sb.param_count > 0));
				static_order
					.then_with(|| sa.param_count.cmp(&sb.param_count))
					.then_with(|| sa.text.cmp(&sb.text))
			}
		};
		if ordering != Ordering::Equal {
			return ordering;
		}
	}
	Ordering::Equal
}

#[cfg(test)]
mod tests {
	use super::*;

	fn compile(pattern: &str) -> RoutePattern {
		RoutePattern::compile(pattern).unwrap()
	}

	fn sorted(patterns: &[&str]) -> Vec<String> {
		let mut compiled: Vec<RoutePattern> = patterns.iter().map(|p| compile(p)).collect();
		sort_by_specificity(&mut compiled, |p| p);
		compiled.iter().map(|p| p.pattern().to_string()).collect()
	}

	#[test]
	fn test_static_before_param() {
		assert_eq!(sorted(&["/foo/[bar]", "/foo/xyz"]), vec!["/foo/xyz", "/foo/[bar]"]);
	}

	#[test]
	fn test_param_before_catch_all() {
		assert_eq!(
			sorted(&["/foo/[bar]/[...qux]", "/foo/[bar]"]),
			vec!["/foo/[bar]", "/foo/[bar]/[...qux]"]
		);
	}

	#[test]
	fn test_shallower_before_deeper() {
		assert_eq!(
			sorted(&["/foo/bar/baz", "/foo/bar", "/foo"]),
			vec!["/foo", "/foo/bar", "/foo/bar/baz"]
		);
	}

	#[test]
	fn test_fewer_placeholders_first() {
		assert_eq!(
			sorted(&["/a/[x]/[y]", "/a/[x]/b"]),
			vec!["/a/[x]/b", "/a/[x]/[y]"]
		);
	}

	#[test]
	fn test_fewer_placeholders_per_segment_first() {
		// Same total count at the tie-break depth decides by density.
		assert_eq!(
			sorted(&["/a/[x]-[y]/s/s", "/a/[x]/[y]/s"]),
			vec!["/a/[x]/[y]/s", "/a/[x]-[y]/s/s"]
		);
	}

	#[test]
	fn test_literal_tie_break() {
		assert_eq!(sorted(&["/b", "/a", "/c"]), vec!["/a", "/b", "/c"]);
	}

	#[test]
	fn test_catch_all_is_always_last() {
		assert_eq!(
			sorted(&["/[...all]", "/", "/blog/[slug]", "/blog"]),
			vec!["/", "/blog", "/blog/[slug]", "/[...all]"]
		);
	}

	#[test]
	fn test_deterministic_for_identical_input() {
		let input = ["/x/[a]", "/x/static", "/[...rest]", "/x/[a]/[b]"];
		assert_eq!(sorted(&input), sorted(&input));
	}
}
