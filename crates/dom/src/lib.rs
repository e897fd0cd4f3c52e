//! Live presentation tree primitives.
//!
//! [`Document`] is the primitive layer the reconciler drives. [`DomArena`] is
//! the bundled in-memory implementation; it journals every mutation it applies
//! so callers can observe (and replay) exactly what a render changed.

pub mod snapshot;

mod arena;
mod document;
mod error;
mod mutation;
mod types;

pub use crate::arena::DomArena;
pub use crate::document::Document;
pub use crate::error::DomError;
pub use crate::mutation::{Mutation, MutationCounts};
pub use crate::types::{Node, NodeKey, NodeType};
