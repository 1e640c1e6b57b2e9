//! Grappelli Router - Nested File-Based Routing
//!
//! The routing core of the Grappelli framework: turns a URL into a
//! specificity-ordered route match, runs the route's guard chain, and
//! assembles the matched chain of nested layout/page frames, each with
//! its own cached, re-runnable data loader.
//!
//! ## Architecture
//!
//! - [`pattern`]: route pattern compilation (`/blog/[slug]/[...rest]`)
//! - [`sort`]: specificity ordering of compiled routes
//! - [`resolver`]: table scan plus the guard allow/reject/rewrite/redirect
//!   pipeline
//! - [`stack`]: the layout/page stack builder with per-frame cache keys,
//!   top-down context flow, and error/redirect propagation
//! - [`module`]: normalized route modules, the module cache, and the
//!   loader contract
//! - [`navigation`]: the client-side generation-token runtime
//!
//! Rendering is not here: the stack builder emits an opaque
//! [`component::ContentNode`] tree, and how components are drawn is the
//! renderer's business.
//!
//! ## Example
//!
//! ```ignore
//! use grappelli::prelude::*;
//! use std::sync::Arc;
//!
//! let table = Arc::new(RouteTable::new(vec![
//!     Route::new("/", vec![ModuleRef::new("routes/+page")])?,
//!     Route::new("/blog/[slug]", vec![
//!         ModuleRef::new("routes/+layout"),
//!         ModuleRef::new("routes/blog/[slug]/+page"),
//!     ])?,
//! ]));
//!
//! let resolver = RouteResolver::new(table);
//! let mut ctx = PageContext::new("http://localhost/blog/hello".parse()?);
//! match resolver.resolve("/blog/hello", Some(&mut ctx))? {
//!     Resolution::Found { route, params } => { /* build the stack */ }
//!     Resolution::Redirect(redirect) => { /* emit Location header */ }
//!     Resolution::NotFound => { /* synthesize the 404 stack */ }
//! }
//! ```

pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod module;
pub mod navigation;
pub mod pattern;
pub mod resolver;
pub mod response;
pub mod route;
pub mod serialize;
pub mod sort;
pub mod stack;

/// Commonly used types.
pub mod prelude {
	pub use crate::component::{ComponentRef, ContentNode};
	pub use crate::config::RouterConfig;
	pub use crate::context::{PageContext, Params};
	pub use crate::error::{LoadError, PatternError, RouterError, RouterResult};
	pub use crate::fetch::{FetchResponse, Fetcher, NoFetch};
	pub use crate::module::{
		CacheKeyContext, InMemoryModules, LoadContext, LoadOutcome, Loader, ModuleCache,
		ModuleRef, ModuleSource, RouteModule,
	};
	pub use crate::navigation::{NavigationToken, Navigator};
	pub use crate::pattern::RoutePattern;
	pub use crate::resolver::{Resolution, RouteResolver};
	pub use crate::response::RedirectResponse;
	pub use crate::route::{Guard, GuardContext, GuardOutcome, Route, RouteTable};
	pub use crate::stack::{
		FrameSnapshot, LoadResult, RenderedStack, StackBuilder, StackOutcome, StackRequest,
	};
}
