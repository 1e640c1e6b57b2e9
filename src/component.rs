//! Opaque component handles and the assembled content tree.
//!
//! The resolver never knows how a component is drawn. A
//! [`ComponentRef`] is an identity-comparable handle with a debug name;
//! mounting, diffing, and hydration belong to the external renderer.

use serde_json::{Map, Value};
use std::sync::Arc;

struct ComponentInner {
	name: String,
}

/// An opaque, identity-comparable reference to a renderable component.
///
/// Equality is reference identity: two handles are equal only if they
/// were cloned from the same [`ComponentRef::new`] call. Hot-reload
/// replaces a module's component with a fresh handle, so identity
/// comparison naturally invalidates stale UI.
#[derive(Clone)]
pub struct ComponentRef {
	inner: Arc<ComponentInner>,
}

impl ComponentRef {
	/// Creates a new component handle with a debug name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			inner: Arc::new(ComponentInner { name: name.into() }),
		}
	}

	/// Returns the component's debug name.
	pub fn name(&self) -> &str {
		&self.inner.name
	}
}

impl PartialEq for ComponentRef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for ComponentRef {}

impl std::fmt::Debug for ComponentRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComponentRef")
			.field("name", &self.inner.name)
			.finish()
	}
}

/// One node of the assembled content tree handed to the renderer.
///
/// Frames are folded innermost to outermost, each wrapping its child.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
	/// The component to render at this level.
	pub component: ComponentRef,
	/// Props attached to the component (loader data, error detail).
	pub props: Map<String, Value>,
	/// The wrapped inner node, if any.
	pub child: Option<Box<ContentNode>>,
	/// Whether render-time exceptions at or below this node are caught
	/// here and normalized into the error shape.
	pub error_boundary: bool,
}

impl ContentNode {
	/// Creates a leaf node.
	pub fn new(component: ComponentRef) -> Self {
		Self {
			component,
			props: Map::new(),
			child: None,
			error_boundary: false,
		}
	}

	/// Sets a prop on this node.
	pub fn prop(mut self, key: impl Into<String>, value: Value) -> Self {
		self.props.insert(key.into(), value);
		self
	}

	/// Wraps a child node.
	pub fn wrap(mut self, child: ContentNode) -> Self {
		self.child = Some(Box::new(child));
		self
	}

	/// Marks this node as a render-time error boundary.
	pub fn boundary(mut self) -> Self {
		self.error_boundary = true;
		self
	}

	/// Returns the depth of the tree rooted at this node.
	pub fn depth(&self) -> usize {
		1 + self.child.as_ref().map(|c| c.depth()).unwrap_or(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_identity_equality() {
		let a = ComponentRef::new("Layout");
		let b = a.clone();
		let c = ComponentRef::new("Layout");

		assert_eq!(a, b);
		assert_ne!(a, c); // same name, different identity
	}

	#[test]
	fn test_content_node_tree() {
		let layout = ComponentRef::new("Layout");
		let page = ComponentRef::new("Page");

		let tree = ContentNode::new(layout)
			.boundary()
			.wrap(ContentNode::new(page).prop("data", serde_json::json!({"n": 1})));

		assert_eq!(tree.depth(), 2);
		assert!(tree.error_boundary);
		let child = tree.child.as_ref().unwrap();
		assert!(!child.error_boundary);
		assert_eq!(child.props["data"]["n"], 1);
	}
}
