//! Client-side navigation runtime.
//!
//! Navigations may be superseded: a newer navigation must win over a
//! slower, older one still in flight. Each build records a generation
//! token when it starts; the result is committed only if its token is
//! still current, otherwise it is silently discarded. Stale work is
//! ignored, never cancelled.

use crate::module::ModuleCache;
use crate::stack::{FrameSnapshot, RenderedStack};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationToken(u64);

/// Owns what persists between navigations: the generation counter, the
/// retained `rendered` snapshot, and the module cache.
pub struct Navigator {
	generation: AtomicU64,
	previous: RwLock<Option<Arc<Vec<FrameSnapshot>>>>,
	cache: Arc<ModuleCache>,
}

impl Navigator {
	/// Creates a navigator with a fresh module cache.
	pub fn new() -> Self {
		Self::with_cache(Arc::new(ModuleCache::new()))
	}

	/// Creates a navigator around an existing module cache.
	pub fn with_cache(cache: Arc<ModuleCache>) -> Self {
		Self {
			generation: AtomicU64::new(0),
			previous: RwLock::new(None),
			cache,
		}
	}

	/// Starts a navigation, superseding any in-flight one.
	pub fn begin(&self) -> NavigationToken {
		NavigationToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
	}

	/// Returns the snapshot retained from the last committed build, to
	/// pass as the next build's `previous` input.
	pub fn previous_stack(&self) -> Option<Arc<Vec<FrameSnapshot>>> {
		self.previous.read().clone()
	}

	/// Commits a finished build if its token is still current. Returns
	/// whether the commit took effect; a stale result is discarded.
	pub fn commit(&self, token: NavigationToken, stack: &RenderedStack) -> bool {
		if token.0 != self.generation.load(Ordering::SeqCst) {
			tracing::debug!(token = token.0, "discarding superseded navigation result");
			return false;
		}
		*self.previous.write() = Some(Arc::new(stack.rendered.clone()));
		true
	}

	/// Returns the module cache shared with the stack builder.
	pub fn module_cache(&self) -> &Arc<ModuleCache> {
		&self.cache
	}

	/// Hot-reload hook: drops the cached module and prunes the retained
	/// snapshot from the first frame built from it, so nothing stale is
	/// reused on the next navigation.
	pub fn invalidate_module(&self, id: &str) {
		self.cache.invalidate(id);
		let mut previous = self.previous.write();
		if let Some(snapshot) = previous.as_ref() {
			if let Some(index) = snapshot.iter().position(|f| f.module.id() == id) {
				let pruned: Vec<FrameSnapshot> = snapshot[..index].to_vec();
				*previous = if pruned.is_empty() {
					None
				} else {
					Some(Arc::new(pruned))
				};
			}
		}
	}
}

impl Default for Navigator {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Navigator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Navigator")
			.field("generation", &self.generation.load(Ordering::SeqCst))
			.field("has_previous", &self.previous.read().is_some())
			.finish()
	}
}
