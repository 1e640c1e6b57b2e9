//! Route resolution: scan, guard chain, rewrite loop.
//!
//! Resolution scans the specificity-sorted table top to bottom. The
//! first regex match becomes a candidate; its guards may accept it,
//! reject it (the scan continues), rewrite the request (the scan
//! restarts against the new path), or redirect (resolution aborts).
//!
//! The rewrite loop is bounded: two guards rewriting into each other
//! would otherwise spin forever. Exceeding the bound fails with
//! [`RouterError::GuardRewriteCycle`] carrying the visited paths.

use crate::config::RouterConfig;
use crate::context::{PageContext, Params};
use crate::error::{RouterError, RouterResult};
use crate::response::RedirectResponse;
use crate::route::{GuardContext, GuardOutcome, Route, RouteTable};
use std::sync::Arc;

/// The outcome of one resolution pass.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// A route matched and its guards all passed.
	Found {
		/// The matched route.
		route: Arc<Route>,
		/// Decoded parameters.
		params: Params,
	},
	/// A guard aborted resolution with a redirect.
	Redirect(RedirectResponse),
	/// The table is exhausted. The caller synthesizes the 404 frame.
	NotFound,
}

/// Resolves pathnames against a compiled route table.
#[derive(Debug, Clone)]
pub struct RouteResolver {
	table: Arc<RouteTable>,
	config: RouterConfig,
}

impl RouteResolver {
	/// Creates a resolver with default configuration.
	pub fn new(table: Arc<RouteTable>) -> Self {
		Self::with_config(table, RouterConfig::default())
	}

	/// Creates a resolver with explicit configuration.
	pub fn with_config(table: Arc<RouteTable>, config: RouterConfig) -> Self {
		Self { table, config }
	}

	/// Returns the table this resolver scans.
	pub fn table(&self) -> &RouteTable {
		&self.table
	}

	/// Resolves a pathname.
	///
	/// With a context, guards run and may reject, rewrite (mutating
	/// `context.url`), or redirect; the accepted candidate's params are
	/// written back into the context. Without a context, guards are
	/// skipped entirely and this is pure pattern matching, as used for
	/// prefetch and "does this path exist" checks.
	pub fn resolve(
		&self,
		path: &str,
		mut context: Option<&mut PageContext>,
	) -> RouterResult<Resolution> {
		let mut pathname = path.to_string();
		let mut trail = vec![pathname.clone()];
		let mut rewrites = 0usize;

		'scan: loop {
			'candidates: for route in self.table.routes() {
				let Some(captures) = route.pattern().captures(&pathname) else {
					continue;
				};
				let params = decode_params(route, captures);
				tracing::debug!(
					pattern = route.pattern().pattern(),
					path = %pathname,
					"route candidate matched"
				);

				let Some(ctx) = context.as_deref_mut() else {
					return Ok(Resolution::Found {
						route: route.clone(),
						params,
					});
				};

				for guard in route.guards() {
					let outcome = guard(&GuardContext {
						url: &ctx.url,
						params: &params,
						locals: &ctx.locals,
					});
					match outcome {
						GuardOutcome::Allow => {}
						GuardOutcome::Reject => {
							tracing::debug!(
								pattern = route.pattern().pattern(),
								"guard rejected candidate"
							);
							continue 'candidates;
						}
						GuardOutcome::Rewrite(target) => {
							rewrites += 1;
							if rewrites > self.config.max_rewrites {
								tracing::warn!(
									limit = self.config.max_rewrites,
									trail = ?trail,
									"guard rewrite limit exceeded"
								);
								return Err(RouterError::GuardRewriteCycle {
									limit: self.config.max_rewrites,
									trail,
								});
							}
							apply_rewrite(ctx, &target);
							pathname = ctx.url.path().to_string();
							trail.push(pathname.clone());
							tracing::debug!(rewritten = %pathname, "guard rewrote request");
							continue 'scan;
						}
						GuardOutcome::Redirect { location, status } => {
							tracing::debug!(location = %location, "guard redirected request");
							return Ok(Resolution::Redirect(RedirectResponse::new(
								location, status,
							)));
						}
					}
				}

				ctx.params = params.clone();
				return Ok(Resolution::Found {
					route: route.clone(),
					params,
				});
			}
			return Ok(Resolution::NotFound);
		}
	}

	/// Pure pattern matching: the first route whose regex matches, with
	/// decoded params. Guards never run.
	pub fn matches(&self, path: &str) -> Option<(Arc<Route>, Params)> {
		match self.resolve(path, None) {
			Ok(Resolution::Found { route, params }) => Some((route, params)),
			_ => None,
		}
	}
}

/// Decodes captured values into params. Every named parameter is
/// percent-decoded except the raw catch-all remainder.
fn decode_params(route: &Route, captures: Vec<(String, String)>) -> Params {
	let rest = route.pattern().rest_param();
	captures
		.into_iter()
		.map(|(name, raw)| {
			let value = if rest == Some(name.as_str()) {
				raw
			} else {
				match urlencoding::decode(&raw) {
					Ok(decoded) => decoded.into_owned(),
					Err(_) => raw,
				}
			};
			(name, value)
		})
		.collect()
}

/// Applies a guard rewrite to the context URL. Absolute-path targets
/// replace the path (and query, if present); anything unparsable falls
/// back to a bare path replacement.
fn apply_rewrite(ctx: &mut PageContext, target: &str) {
	match ctx.url.join(target) {
		Ok(joined) => ctx.url = joined,
		Err(_) => ctx.url.set_path(target),
	}
}
