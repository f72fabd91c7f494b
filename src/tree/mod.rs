//! The syntax tree data model (spec.md §3, §4.2): a mutable parsing-only
//! ribbon ([`arena`]), static token classification tables ([`kind`]), and
//! the immutable post-parse tree ([`node`]) that every later stage works
//! with.

pub mod arena;
pub mod kind;
pub mod node;

pub use arena::{NodeId, RibbonArena};
pub use kind::{Assoc, Role};
pub use node::Node;
