//! Property tests for pattern compilation.
//!
//! The round-trip property: substituting concrete values for a valid
//! pattern's placeholders yields a path its compiled regex matches, and
//! the captured values equal the substituted ones.

use grappelli::pattern::RoutePattern;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Seg {
	Literal(String),
	Param,
}

fn literal_segment() -> impl Strategy<Value = String> {
	"[a-z]{1,8}".prop_filter("dropped segment names break round-trips", |s| s != "index")
}

fn segment() -> impl Strategy<Value = Seg> {
	prop_oneof![
		literal_segment().prop_map(Seg::Literal),
		Just(Seg::Param),
	]
}

fn param_value() -> impl Strategy<Value = String> {
	// No '/' (single-segment capture) and no '%' (captures are raw,
	// decoding happens in the resolver).
	proptest::string::string_regex("[A-Za-z0-9_.~-]{1,10}").unwrap()
}

proptest! {
	#[test]
	fn round_trip(
		segs in prop::collection::vec(segment(), 1..5),
		values in prop::collection::vec(param_value(), 8),
		rest_parts in prop::option::of(prop::collection::vec("[a-z0-9]{1,6}", 0..3)),
	) {
		let mut pattern = String::new();
		let mut params: HashMap<String, String> = HashMap::new();
		let mut expected: Vec<(String, String)> = Vec::new();
		let mut value_iter = values.into_iter();

		for (i, seg) in segs.iter().enumerate() {
			pattern.push('/');
			match seg {
				Seg::Literal(text) => pattern.push_str(text),
				Seg::Param => {
					let name = format!("p{i}");
					let value = value_iter.next().unwrap();
					pattern.push_str(&format!("[{name}]"));
					params.insert(name.clone(), value.clone());
					expected.push((name, value));
				}
			}
		}
		if let Some(parts) = &rest_parts {
			pattern.push_str("/[...rest]");
			let value: String = parts.iter().map(|p| format!("/{p}")).collect();
			params.insert("rest".to_string(), value.clone());
			expected.push(("rest".to_string(), value));
		}

		let compiled = RoutePattern::compile(&pattern).unwrap();
		let path = compiled.fill(&params).unwrap();

		let captures = compiled.captures(&path);
		prop_assert!(captures.is_some(), "{pattern} must match its own fill {path}");
		prop_assert_eq!(captures.unwrap(), expected);
	}

	#[test]
	fn static_patterns_accept_trailing_slash(
		segs in prop::collection::vec(literal_segment(), 1..4),
	) {
		let pattern = format!("/{}", segs.join("/"));
		let compiled = RoutePattern::compile(&pattern).unwrap();

		prop_assert!(compiled.is_match(&pattern));
		let with_trailing_slash = format!("{}/", pattern);
		prop_assert!(compiled.is_match(&with_trailing_slash));
	}

	#[test]
	fn compile_never_panics(input in "/[a-z\\[\\]/._(-]{0,40}") {
		// Arbitrary bracket soup either compiles or fails cleanly.
		let _ = RoutePattern::compile(&input);
	}
}
