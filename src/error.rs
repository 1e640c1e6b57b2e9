//! Error types for routing and stack resolution.
//!
//! Pattern errors are fatal: they surface while the route table is being
//! compiled, before any request is served. Everything that can go wrong
//! per-request is either a [`RouterError`] from the resolver or a
//! [`LoadError`] that the stack builder downgrades into a frame result.

use thiserror::Error;

/// Error raised while compiling a single route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
	/// Pattern does not begin with `/`.
	#[error("pattern must start with '/': '{0}'")]
	MissingLeadingSlash(String),

	/// A `[` was opened but never closed within a segment.
	#[error("unclosed '[' in segment '{0}'")]
	UnclosedBracket(String),

	/// A `]` appeared without a matching `[`.
	#[error("unmatched ']' in segment '{0}'")]
	UnmatchedBracket(String),

	/// A `[` appeared inside an already-open placeholder.
	#[error("nested '[' in segment '{0}'")]
	NestedBracket(String),

	/// A placeholder with no name, `[]`.
	#[error("empty parameter name in segment '{0}'")]
	EmptyParam(String),

	/// The same parameter name was used twice in one pattern.
	#[error("duplicate parameter name '{0}'")]
	DuplicateParam(String),

	/// Literal text around placeholders in a segment was not `.` or `-`.
	#[error("invalid separator '{literal}' around parameters in segment '{segment}'")]
	InvalidSeparator {
		/// The offending segment.
		segment: String,
		/// The literal run that is not a valid separator.
		literal: String,
	},

	/// A `[...name]` catch-all that is not the final segment.
	#[error("catch-all parameter must be the final segment: '{0}'")]
	CatchAllNotLast(String),

	/// Pattern exceeds the configured byte length limit.
	#[error("pattern length {len} exceeds maximum of {max} bytes")]
	TooLong {
		/// Actual pattern length in bytes.
		len: usize,
		/// Configured maximum.
		max: usize,
	},

	/// Pattern exceeds the configured segment count limit.
	#[error("pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Actual segment count.
		count: usize,
		/// Configured maximum.
		max: usize,
	},

	/// The generated regex failed to compile or exceeded the size limit.
	#[error("failed to compile pattern regex: {0}")]
	Regex(String),
}

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// A route pattern failed to compile. Fatal at table build time.
	#[error("invalid route pattern '{pattern}': {source}")]
	Pattern {
		/// The pattern string that failed.
		pattern: String,
		/// The underlying parse failure.
		#[source]
		source: PatternError,
	},

	/// Guards kept rewriting past the configured bound.
	#[error("guard rewrite limit of {limit} exceeded: {}", trail.join(" -> "))]
	GuardRewriteCycle {
		/// The configured rewrite bound.
		limit: usize,
		/// The sequence of paths visited, original first.
		trail: Vec<String>,
	},
}

/// Result alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// A loader failure: the error shape loaders return or the stack builder
/// synthesizes when a loader fails.
///
/// Carries an optional HTTP status suggested by the loader. The stack
/// builder clamps missing or non-error statuses to 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
	/// Human-readable failure description.
	pub message: String,
	/// Suggested HTTP status, if the loader provided one.
	pub status: Option<u16>,
}

impl LoadError {
	/// Creates a load error with no suggested status.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			status: None,
		}
	}

	/// Creates a load error with a suggested HTTP status.
	pub fn with_status(message: impl Into<String>, status: u16) -> Self {
		Self {
			message: message.into(),
			status: Some(status),
		}
	}
}
