//! Plotline: a branching story engine for interactive fiction.
//!
//! A story is a graph of scenes joined by player choices. Choices carry
//! signed stat consequences and minimum stat requirements, can point at
//! another scene or at the reserved ending, and may legally dangle while a
//! story is mid-edit. The crate covers the authoring session that edits
//! the graph, the drag-reorder engine for choice lists, the deterministic
//! playthrough simulator, and the lint and random-walk layers that keep
//! authored stories honest before publication.

pub mod core;
pub mod schema;
pub mod store;
