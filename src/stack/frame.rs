//! Frame results and snapshots.

use crate::error::LoadError;
use crate::module::ModuleRef;
use serde_json::{Map, Value};

/// The merged result of one frame's load step.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
	/// The loader produced data (or the frame had no loader).
	Success {
		/// Data attached to the frame's component as props.
		data: Value,
		/// Optional HTTP status override.
		status: Option<u16>,
		/// Context this frame contributes to inner frames.
		context: Map<String, Value>,
	},
	/// The loader failed, or returned an error value.
	Failure {
		/// Effective HTTP status, already clamped to an error class.
		status: u16,
		/// The failure detail.
		error: LoadError,
	},
	/// The loader asked for a redirect; the build aborted here.
	Redirect {
		/// The redirect status.
		status: u16,
		/// The redirect target.
		location: String,
	},
}

impl LoadResult {
	/// An empty success, used for frames without a loader.
	pub fn empty() -> Self {
		Self::Success {
			data: Value::Null,
			status: None,
			context: Map::new(),
		}
	}

	/// Returns whether this is a success result.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}

/// Per-frame snapshot retained across navigations.
///
/// The `rendered` vector of one build becomes the `previous` input of
/// the next; a frame is reused only when its module identity matches
/// and its stored cache key is non-empty and unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
	/// The module this frame was built from.
	pub module: ModuleRef,
	/// The stored cache key; `None` never matches, forcing a reload.
	pub cache_key: Option<String>,
	/// The frame's load result.
	pub result: LoadResult,
	/// Whether this frame can handle errors of inner frames.
	pub can_handle_errors: bool,
}
