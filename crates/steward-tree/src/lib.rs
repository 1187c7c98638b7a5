//! Configuration tree model for Steward.
//!
//! A [`ConfigNode`] tree is loaded from a JSON document ([`source`]), its
//! values are evaluated against host facts ([`resolve`]), and a subtree is
//! written out as indented `key: value` text for the managed server
//! ([`render`]).

mod node;
pub mod render;
pub mod resolve;
mod scalar;
pub mod source;

pub use node::{ConfigNode, NodeKind, VALUE_MARKER};
pub use render::{render, render_children, render_children_to_string};
pub use resolve::{Environment, ResolveReport, expand, resolve_tree, resolve_value};
pub use scalar::Scalar;
pub use source::TreeError;
