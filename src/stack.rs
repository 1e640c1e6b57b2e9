//! Nested layout/page stack resolution.
//!
//! A matched route carries an ordered module chain, outer layout first,
//! page last. The stack builder turns that chain into a tree of
//! components: it loads each module, decides per frame whether the
//! previous navigation's loader result can be reused, runs loaders in a
//! strict top-down waterfall, and folds the surviving frames into the
//! content tree handed to the renderer.

mod builder;
mod frame;

pub use builder::{RenderedStack, StackBuilder, StackOutcome, StackRequest};
pub use frame::{FrameSnapshot, LoadResult};
