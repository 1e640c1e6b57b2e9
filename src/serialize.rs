//! Stable serialization for cache keys.
//!
//! Cache keys must not depend on object-key insertion order: a loader
//! returning `{a: 1, b: 2}` and one returning `{b: 2, a: 1}` describe
//! the same state and must fingerprint identically. Object keys are
//! written in lexicographic order at every depth.

use serde_json::Value;

/// Serializes a JSON value into its canonical string form.
pub fn stable_serialize(value: &Value) -> String {
	let mut out = String::new();
	write_value(&mut out, value);
	out
}

/// Computes the stored cache key for a frame: the canonical form of the
/// key value, or `None` for `null` (an empty key never matches, so the
/// frame always reloads).
pub fn cache_key_of(value: &Value) -> Option<String> {
	if value.is_null() {
		None
	} else {
		Some(stable_serialize(value))
	}
}

fn write_value(out: &mut String, value: &Value) {
	match value {
		Value::Object(map) => {
			let mut keys: Vec<&String> = map.keys().collect();
			keys.sort();
			out.push('{');
			for (i, key) in keys.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				// serde_json string encoding handles escaping.
				out.push_str(&Value::String((*key).clone()).to_string());
				out.push(':');
				write_value(out, &map[*key]);
			}
			out.push('}');
		}
		Value::Array(items) => {
			out.push('[');
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				write_value(out, item);
			}
			out.push(']');
		}
		other => out.push_str(&other.to_string()),
	}
}
