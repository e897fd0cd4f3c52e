//! Positional reconciliation of descriptor trees onto a live [`dom::Document`].
//!
//! Matching is by position only: a child is reused when the node already at
//! its index has the same kind, replaced when the kind differs, and created
//! when the index is past the end. Trailing nodes beyond the new length are
//! pruned from the tail. There are no keys and no move detection, so an
//! insertion in the middle of a list looks like every following position
//! changed.

mod config;
mod descriptor;
#[cfg(feature = "json")]
mod json;
mod render;

pub use crate::config::{RenderConfig, Traversal};
pub use crate::descriptor::{Descriptor, ElementDescriptor, ToText, coerce_number};
#[cfg(feature = "json")]
pub use crate::json::DescriptorError;
pub use crate::render::{Reconciler, render};
