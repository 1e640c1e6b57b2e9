//! Route modules: the normalized unit behind each stack frame.
//!
//! A route file may export just a component or a bag of exports
//! (component, loader, cache-key function, options). Everything is
//! normalized once, at module-load time, into a single [`RouteModule`]
//! record so the rest of the pipeline handles one shape only.
//!
//! Module loading itself is a boundary: the client runtime loads chunks
//! dynamically, the server resolves them from the build output. Both
//! sit behind [`ModuleSource`], fronted by an explicit [`ModuleCache`]
//! that the runtime owns and invalidates on hot-reload.

use crate::component::ComponentRef;
use crate::context::Params;
use crate::error::LoadError;
use crate::fetch::Fetcher;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Identity of a route module, typically its route-relative file path
/// (`"routes/blog/[slug]/+page"`). Module identity comparison drives
/// frame reuse across navigations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
	id: String,
}

impl ModuleRef {
	/// Creates a module reference from its id.
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into() }
	}

	/// Returns the module id.
	pub fn id(&self) -> &str {
		&self.id
	}
}

impl std::fmt::Display for ModuleRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.id)
	}
}

/// Context handed to loaders. Owned so loader futures stay `'static`.
#[derive(Clone)]
pub struct LoadContext {
	/// The request URL.
	pub url: Url,
	/// Parameters extracted from the matched route.
	pub params: Params,
	/// The matched route pattern string.
	pub matched: String,
	/// Context accumulated by strictly earlier frames.
	pub context: Map<String, Value>,
	/// Transport boundary for loader I/O.
	pub fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for LoadContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoadContext")
			.field("url", &self.url.as_str())
			.field("params", &self.params)
			.field("matched", &self.matched)
			.finish()
	}
}

/// What a loader returns on the success path of its future.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
	/// Loaded data, an optional status override, and context to merge
	/// forward into inner frames.
	Data {
		/// The loaded payload, attached to the frame as `data` props.
		data: Value,
		/// Optional HTTP status override (e.g. 201, 404).
		status: Option<u16>,
		/// Context shallow-merged into subsequent frames.
		context: Option<Map<String, Value>>,
	},
	/// A failure the loader chose to report as a value.
	Error(LoadError),
	/// Abort the whole build and redirect.
	Redirect {
		/// The redirect target.
		location: String,
		/// The redirect status.
		status: u16,
	},
}

impl LoadOutcome {
	/// Plain data outcome with no status override or context.
	pub fn data(data: Value) -> Self {
		Self::Data {
			data,
			status: None,
			context: None,
		}
	}

	/// Data outcome that also merges context into inner frames.
	pub fn data_with_context(data: Value, context: Map<String, Value>) -> Self {
		Self::Data {
			data,
			status: None,
			context: Some(context),
		}
	}
}

/// A frame data loader. An `Err` return is equivalent to a thrown
/// error: the stack builder converts it into a 500-class failure
/// result.
#[async_trait]
pub trait Loader: Send + Sync {
	/// Runs the loader against the given context.
	async fn load(&self, ctx: LoadContext) -> Result<LoadOutcome, LoadError>;
}

/// Adapts an async closure into a [`Loader`].
pub struct FnLoader<F>(pub F);

#[async_trait]
impl<F, Fut> Loader for FnLoader<F>
where
	F: Fn(LoadContext) -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = Result<LoadOutcome, LoadError>> + Send + 'static,
{
	async fn load(&self, ctx: LoadContext) -> Result<LoadOutcome, LoadError> {
		(self.0)(ctx).await
	}
}

/// Context for cache-key computation. Borrowed: the key function is
/// synchronous and must derive the key only from what it is shown.
#[derive(Debug)]
pub struct CacheKeyContext<'a> {
	/// The request URL.
	pub url: &'a Url,
	/// Parameters extracted from the matched route.
	pub params: &'a Params,
	/// The matched route pattern string.
	pub matched: &'a str,
	/// Context accumulated by strictly earlier frames.
	pub context: &'a Map<String, Value>,
}

/// Computes a serializable cache-key value for a frame.
pub type CacheKeyFn = Arc<dyn Fn(&CacheKeyContext<'_>) -> Value + Send + Sync>;

/// The normalized record for one route module.
#[derive(Clone)]
pub struct RouteModule {
	component: ComponentRef,
	loader: Option<Arc<dyn Loader>>,
	cache_key_fn: Option<CacheKeyFn>,
	/// `None` means "decide by position": layouts are error-capable,
	/// pages are not.
	can_handle_errors: Option<bool>,
}

impl RouteModule {
	/// Normalizes the bare-component convention: a module that exports
	/// only a component.
	pub fn page(component: ComponentRef) -> Self {
		Self {
			component,
			loader: None,
			cache_key_fn: None,
			can_handle_errors: None,
		}
	}

	/// Attaches a loader.
	pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
		self.loader = Some(Arc::new(loader));
		self
	}

	/// Attaches an async closure as the loader.
	pub fn with_loader_fn<F, Fut>(self, f: F) -> Self
	where
		F: Fn(LoadContext) -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = Result<LoadOutcome, LoadError>> + Send + 'static,
	{
		self.with_loader(FnLoader(f))
	}

	/// Attaches a cache-key function.
	pub fn with_cache_key<F>(mut self, f: F) -> Self
	where
		F: Fn(&CacheKeyContext<'_>) -> Value + Send + Sync + 'static,
	{
		self.cache_key_fn = Some(Arc::new(f));
		self
	}

	/// Overrides the positional error-capability default.
	pub fn handles_errors(mut self, can_handle: bool) -> Self {
		self.can_handle_errors = Some(can_handle);
		self
	}

	/// Returns the module's component handle.
	pub fn component(&self) -> &ComponentRef {
		&self.component
	}

	/// Returns the module's loader, if any.
	pub fn loader(&self) -> Option<&Arc<dyn Loader>> {
		self.loader.as_ref()
	}

	/// Returns the module's cache-key function, if any.
	pub fn cache_key_fn(&self) -> Option<&CacheKeyFn> {
		self.cache_key_fn.as_ref()
	}

	/// Returns the explicit error-capability override, if any.
	pub fn can_handle_errors(&self) -> Option<bool> {
		self.can_handle_errors
	}
}

impl std::fmt::Debug for RouteModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteModule")
			.field("component", &self.component)
			.field("has_loader", &self.loader.is_some())
			.field("has_cache_key_fn", &self.cache_key_fn.is_some())
			.field("can_handle_errors", &self.can_handle_errors)
			.finish()
	}
}

/// Boundary for dynamic module loading.
#[async_trait]
pub trait ModuleSource: Send + Sync {
	/// Loads (or resolves) the module behind a reference.
	async fn load_module(&self, module: &ModuleRef) -> Result<Arc<RouteModule>, LoadError>;
}

/// Explicit module cache owned by the runtime.
///
/// Keyed by module id. Never a language global: hot-reload integration
/// calls [`ModuleCache::invalidate`] for the changed id, and the next
/// build reloads that module through its [`ModuleSource`].
#[derive(Default)]
pub struct ModuleCache {
	entries: RwLock<HashMap<String, Arc<RouteModule>>>,
}

impl ModuleCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached module for an id, if present.
	pub fn get(&self, id: &str) -> Option<Arc<RouteModule>> {
		self.entries.read().get(id).cloned()
	}

	/// Returns the cached module or loads it through the source.
	///
	/// The lock is not held across the await; on a racing double-load
	/// the last insert wins, which is harmless for identical sources.
	pub async fn get_or_load(
		&self,
		source: &dyn ModuleSource,
		module: &ModuleRef,
	) -> Result<Arc<RouteModule>, LoadError> {
		if let Some(cached) = self.get(module.id()) {
			return Ok(cached);
		}
		let loaded = source.load_module(module).await?;
		self.entries
			.write()
			.insert(module.id().to_string(), loaded.clone());
		Ok(loaded)
	}

	/// Drops the cached module for an id. Returns whether an entry was
	/// present.
	pub fn invalidate(&self, id: &str) -> bool {
		self.entries.write().remove(id).is_some()
	}

	/// Drops every cached module.
	pub fn clear(&self) {
		self.entries.write().clear();
	}

	/// Returns the number of cached modules.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns whether the cache is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl std::fmt::Debug for ModuleCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModuleCache")
			.field("len", &self.len())
			.finish()
	}
}

/// In-memory module source: the server-side table of already-resolved
/// modules, also convenient in tests. Entries can be replaced to model
/// hot-reload.
#[derive(Default)]
pub struct InMemoryModules {
	modules: RwLock<HashMap<String, Arc<RouteModule>>>,
}

impl InMemoryModules {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) a module under an id.
	pub fn insert(&self, id: impl Into<String>, module: RouteModule) {
		self.modules.write().insert(id.into(), Arc::new(module));
	}
}

#[async_trait]
impl ModuleSource for InMemoryModules {
	async fn load_module(&self, module: &ModuleRef) -> Result<Arc<RouteModule>, LoadError> {
		self.modules
			.read()
			.get(module.id())
			.cloned()
			.ok_or_else(|| LoadError::new(format!("unknown module '{}'", module.id())))
	}
}
