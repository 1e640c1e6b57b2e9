//! Routes, guards, and the compiled route table.

use crate::config::RouterConfig;
use crate::context::Params;
use crate::error::{RouterError, RouterResult};
use crate::module::ModuleRef;
use crate::pattern::RoutePattern;
use crate::sort::sort_by_specificity;
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

/// What a guard decides about a matched candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// Proceed to the next guard (or accept the match).
	Allow,
	/// Abandon this candidate; the scan continues with later routes.
	Reject,
	/// Rewrite the request to another path and restart the scan.
	Rewrite(String),
	/// Abort resolution entirely and redirect the client.
	Redirect {
		/// The redirect target.
		location: String,
		/// Optional status; defaults to 302 downstream.
		status: Option<u16>,
	},
}

/// The view of request state a guard receives.
#[derive(Debug)]
pub struct GuardContext<'a> {
	/// The current request URL (after any earlier rewrites).
	pub url: &'a Url,
	/// Parameters captured by the candidate route.
	pub params: &'a Params,
	/// Request-scoped values supplied by the host.
	pub locals: &'a Map<String, Value>,
}

/// A guard evaluated before a route match is accepted.
pub type Guard = Arc<dyn Fn(&GuardContext<'_>) -> GuardOutcome + Send + Sync>;

/// A compiled route: pattern, module chain, and guard chain.
///
/// The module chain is ordered outer layout first, page last. Guards
/// run in declared order, so directory-level guards must be attached
/// before file-specific ones.
#[derive(Clone)]
pub struct Route {
	pattern: RoutePattern,
	module_chain: Vec<ModuleRef>,
	guards: Vec<Guard>,
}

impl Route {
	/// Compiles a route from its pattern string and module chain.
	pub fn new(pattern: &str, module_chain: Vec<ModuleRef>) -> RouterResult<Self> {
		Self::with_config(pattern, module_chain, &RouterConfig::default())
	}

	/// Compiles a route under explicit configuration limits.
	pub fn with_config(
		pattern: &str,
		module_chain: Vec<ModuleRef>,
		config: &RouterConfig,
	) -> RouterResult<Self> {
		let compiled =
			RoutePattern::compile_with(pattern, config).map_err(|source| {
				tracing::error!(pattern, error = %source, "route pattern failed to compile");
				RouterError::Pattern {
					pattern: pattern.to_string(),
					source,
				}
			})?;
		Ok(Self {
			pattern: compiled,
			module_chain,
			guards: Vec::new(),
		})
	}

	/// Appends a guard. Declaration order is evaluation order.
	pub fn with_guard<G>(mut self, guard: G) -> Self
	where
		G: Fn(&GuardContext<'_>) -> GuardOutcome + Send + Sync + 'static,
	{
		self.guards.push(Arc::new(guard));
		self
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the module chain, outer layout first, page last.
	pub fn module_chain(&self) -> &[ModuleRef] {
		&self.module_chain
	}

	/// Returns the guards in evaluation order.
	pub fn guards(&self) -> &[Guard] {
		&self.guards
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern.pattern())
			.field("module_chain", &self.module_chain)
			.field("guard_count", &self.guards.len())
			.finish()
	}
}

/// The compiled, specificity-sorted route table.
///
/// Read-only for the lifetime of a build: file changes regenerate the
/// whole table externally. Concurrent reads need no locking.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<Arc<Route>>,
}

impl RouteTable {
	/// Builds a table, sorting the routes by specificity.
	pub fn new(routes: Vec<Route>) -> Self {
		let mut routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
		sort_by_specificity(&mut routes, |r| r.pattern());
		Self { routes }
	}

	/// Returns the routes, most specific first.
	pub fn routes(&self) -> &[Arc<Route>] {
		&self.routes
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
