//! The stack build loop.

use crate::component::{ComponentRef, ContentNode};
use crate::config::RouterConfig;
use crate::context::Params;
use crate::error::LoadError;
use crate::fetch::{Fetcher, NoFetch};
use crate::module::{
	CacheKeyContext, LoadContext, LoadOutcome, ModuleCache, ModuleRef, ModuleSource, RouteModule,
};
use crate::response::RedirectResponse;
use crate::serialize::cache_key_of;
use crate::stack::frame::{FrameSnapshot, LoadResult};
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use url::Url;

/// The placeholder component synthesized when no frame survives an
/// error (no root layout exists, or the page itself failed with no
/// error-capable ancestor). A single shared handle keeps its identity
/// stable across builds.
static LAST_RESORT: Lazy<ComponentRef> = Lazy::new(|| ComponentRef::new("LastResort"));

/// Input for one stack build.
pub struct StackRequest {
	/// The request URL.
	pub url: Url,
	/// Parameters from the matched route.
	pub params: Params,
	/// The matched route pattern string, for loader/key contexts.
	pub matched: String,
	/// Context seeding the top of the fold (host-supplied).
	pub root_context: Map<String, Value>,
	/// The previous build's `rendered` snapshot, for reuse comparison.
	pub previous: Option<Arc<Vec<FrameSnapshot>>>,
	/// Transport boundary handed to loaders.
	pub fetcher: Arc<dyn Fetcher>,
	/// Frame indexes whose reuse is suppressed (invalidation).
	pub reload: Vec<usize>,
	/// Whether a route actually matched; false when the caller builds a
	/// fallback stack for an unmatched path.
	pub found: bool,
}

impl StackRequest {
	/// Creates a request with no previous stack and no transport.
	pub fn new(url: Url, params: Params) -> Self {
		Self {
			url,
			params,
			matched: String::new(),
			root_context: Map::new(),
			previous: None,
			fetcher: Arc::new(NoFetch),
			reload: Vec::new(),
			found: true,
		}
	}

	/// Sets the matched route pattern string.
	pub fn matched(mut self, pattern: impl Into<String>) -> Self {
		self.matched = pattern.into();
		self
	}

	/// Sets the root context.
	pub fn root_context(mut self, context: Map<String, Value>) -> Self {
		self.root_context = context;
		self
	}

	/// Supplies the previous build's snapshot for reuse.
	pub fn previous(mut self, previous: Arc<Vec<FrameSnapshot>>) -> Self {
		self.previous = Some(previous);
		self
	}

	/// Wires in a transport for loaders.
	pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
		self.fetcher = fetcher;
		self
	}

	/// Forces the given frame indexes to reload.
	pub fn reload(mut self, indexes: Vec<usize>) -> Self {
		self.reload = indexes;
		self
	}
}

impl std::fmt::Debug for StackRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StackRequest")
			.field("url", &self.url.as_str())
			.field("params", &self.params)
			.field("matched", &self.matched)
			.field("has_previous", &self.previous.is_some())
			.field("reload", &self.reload)
			.field("found", &self.found)
			.finish()
	}
}

/// The result of a stack build.
#[derive(Debug, Clone)]
pub enum StackOutcome {
	/// A rendered stack ready for the renderer.
	Rendered(RenderedStack),
	/// A loader aborted the build with a redirect.
	Redirect(RedirectResponse),
}

/// A built stack: status, content tree, and the per-frame snapshot to
/// re-supply as `previous` on the next build.
#[derive(Debug, Clone)]
pub struct RenderedStack {
	/// Effective HTTP status.
	pub status: u16,
	/// The assembled content tree, outermost node first.
	pub content: Option<ContentNode>,
	/// Surviving frame snapshots, outer to inner.
	pub rendered: Vec<FrameSnapshot>,
	/// Whether a route matched.
	pub found: bool,
}

impl RenderedStack {
	/// Synthesizes the 404 stack for an unmatched path.
	pub fn not_found(config: &RouterConfig) -> Self {
		Self {
			status: 404,
			content: Some(last_resort_node(404, None, config.debug)),
			rendered: Vec::new(),
			found: false,
		}
	}
}

/// Builds component stacks from module chains.
pub struct StackBuilder {
	source: Arc<dyn ModuleSource>,
	cache: Arc<ModuleCache>,
	config: RouterConfig,
}

impl StackBuilder {
	/// Creates a builder with its own module cache and default config.
	pub fn new(source: Arc<dyn ModuleSource>) -> Self {
		Self {
			source,
			cache: Arc::new(ModuleCache::new()),
			config: RouterConfig::default(),
		}
	}

	/// Uses a shared module cache (the one the navigator owns).
	pub fn with_cache(mut self, cache: Arc<ModuleCache>) -> Self {
		self.cache = cache;
		self
	}

	/// Overrides the configuration.
	pub fn with_config(mut self, config: RouterConfig) -> Self {
		self.config = config;
		self
	}

	/// Returns the module cache in use.
	pub fn module_cache(&self) -> &Arc<ModuleCache> {
		&self.cache
	}

	/// Builds the stack for a module chain, outer layout first.
	///
	/// Loaders run as a strict waterfall: frame `i + 1` cannot start
	/// before frame `i`'s context is merged. A frame failure stops all
	/// inner frames and truncates the stack to the nearest
	/// error-capable ancestor; a redirect aborts the whole build.
	pub async fn build(&self, chain: &[ModuleRef], req: &StackRequest) -> StackOutcome {
		let mut status: u16 = 200;
		let mut context = req.root_context.clone();
		let mut loaded: Vec<(Arc<RouteModule>, FrameSnapshot)> = Vec::new();
		let mut boundary: Option<usize> = None;
		let mut failure: Option<LoadError> = None;
		let mut failed = false;

		for (i, module_ref) in chain.iter().enumerate() {
			let is_page = i + 1 == chain.len();
			let module = match self.cache.get_or_load(self.source.as_ref(), module_ref).await {
				Ok(module) => module,
				Err(error) => {
					tracing::warn!(module = %module_ref, error = %error, "module load failed");
					status = clamp_error_status(error.status);
					failure = Some(error);
					failed = true;
					break;
				}
			};
			let can_handle = module.can_handle_errors().unwrap_or(!is_page);

			let key_value = match module.cache_key_fn() {
				Some(f) => f(&CacheKeyContext {
					url: &req.url,
					params: &req.params,
					matched: &req.matched,
					context: &context,
				}),
				// Pages fingerprint on everything their loader can see;
				// layouts opt in explicitly and reload otherwise.
				None if is_page => json!([
					Value::Object(context.clone()),
					serde_json::to_value(&req.params).unwrap_or(Value::Null),
					req.url.query().unwrap_or(""),
				]),
				None => Value::Null,
			};
			let key = cache_key_of(&key_value);

			let prev = req.previous.as_ref().and_then(|p| p.get(i));
			let reuse = !req.reload.contains(&i)
				&& key.is_some()
				&& prev.is_some_and(|p| p.module == *module_ref && p.cache_key == key);

			let result = if reuse {
				tracing::debug!(module = %module_ref, "reusing previous frame result");
				prev.map(|p| p.result.clone()).unwrap_or_else(LoadResult::empty)
			} else {
				self.run_loader(&module, req, &context).await
			};

			match &result {
				LoadResult::Redirect { status, location } => {
					tracing::debug!(
						module = %module_ref,
						location = %location,
						"loader redirected; aborting stack build"
					);
					return StackOutcome::Redirect(RedirectResponse::new(
						location.clone(),
						Some(*status),
					));
				}
				LoadResult::Failure { status: s, error } => {
					tracing::warn!(module = %module_ref, error = %error, "frame loader failed");
					status = *s;
					failure = Some(error.clone());
					failed = true;
				}
				LoadResult::Success {
					status: s,
					context: c,
					..
				} => {
					if let Some(s) = s {
						status = *s;
					}
					for (k, v) in c {
						context.insert(k.clone(), v.clone());
					}
				}
			}
			if failed {
				break;
			}

			loaded.push((
				module,
				FrameSnapshot {
					module: module_ref.clone(),
					cache_key: key,
					result,
					can_handle_errors: can_handle,
				},
			));
			if can_handle {
				boundary = Some(loaded.len() - 1);
			}
		}

		if failed {
			match boundary {
				Some(b) => loaded.truncate(b + 1),
				None => loaded.clear(),
			}
		}

		let rendered: Vec<FrameSnapshot> = loaded.iter().map(|(_, snap)| snap.clone()).collect();
		let content = assemble(&loaded, failed, status, failure.as_ref(), self.config.debug);

		StackOutcome::Rendered(RenderedStack {
			status,
			content,
			rendered,
			found: req.found,
		})
	}

	/// Runs the frame's loader, normalizing every failure mode into a
	/// [`LoadResult`]. Frames without a loader succeed with no data.
	async fn run_loader(
		&self,
		module: &RouteModule,
		req: &StackRequest,
		context: &Map<String, Value>,
	) -> LoadResult {
		let Some(loader) = module.loader() else {
			return LoadResult::empty();
		};
		let ctx = LoadContext {
			url: req.url.clone(),
			params: req.params.clone(),
			matched: req.matched.clone(),
			context: context.clone(),
			fetcher: req.fetcher.clone(),
		};
		match loader.load(ctx).await {
			Ok(LoadOutcome::Data {
				data,
				status,
				context,
			}) => LoadResult::Success {
				data,
				status,
				context: context.unwrap_or_default(),
			},
			Ok(LoadOutcome::Redirect { location, status }) => {
				LoadResult::Redirect { status, location }
			}
			Ok(LoadOutcome::Error(error)) | Err(error) => LoadResult::Failure {
				status: clamp_error_status(error.status),
				error,
			},
		}
	}
}

impl std::fmt::Debug for StackBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StackBuilder")
			.field("cache", &self.cache)
			.field("config", &self.config)
			.finish()
	}
}

/// A failure status must be an HTTP error class; anything else becomes
/// a 500.
fn clamp_error_status(status: Option<u16>) -> u16 {
	match status {
		Some(s) if s >= 400 => s,
		_ => 500,
	}
}

/// Folds surviving frames innermost to outermost, each wrapping its
/// child. The innermost frame of a failed build carries the error
/// props.
fn assemble(
	loaded: &[(Arc<RouteModule>, FrameSnapshot)],
	failed: bool,
	status: u16,
	failure: Option<&LoadError>,
	debug: bool,
) -> Option<ContentNode> {
	if loaded.is_empty() {
		return Some(last_resort_node(status, failure, debug));
	}

	let mut node: Option<ContentNode> = None;
	for (i, (module, snap)) in loaded.iter().enumerate().rev() {
		let mut frame_node = ContentNode::new(module.component().clone());
		if snap.can_handle_errors {
			frame_node = frame_node.boundary();
		}
		if let LoadResult::Success { data, .. } = &snap.result {
			if !data.is_null() {
				frame_node = frame_node.prop("data", data.clone());
			}
		}
		if failed && i + 1 == loaded.len() {
			frame_node = frame_node
				.prop("status", json!(status))
				.prop("error", error_props(status, failure, debug));
		}
		if let Some(child) = node.take() {
			frame_node = frame_node.wrap(child);
		}
		node = Some(frame_node);
	}
	node
}

/// The placeholder rendered when nothing survives.
fn last_resort_node(status: u16, failure: Option<&LoadError>, debug: bool) -> ContentNode {
	ContentNode::new(LAST_RESORT.clone())
		.boundary()
		.prop("status", json!(status))
		.prop("error", error_props(status, failure, debug))
}

fn error_props(status: u16, failure: Option<&LoadError>, debug: bool) -> Value {
	let message = match failure {
		Some(error) if debug => error.message.clone(),
		_ => generic_message(status).to_string(),
	};
	json!({ "message": message, "status": status })
}

fn generic_message(status: u16) -> &'static str {
	if status == 404 { "Not Found" } else { "Internal Error" }
}
