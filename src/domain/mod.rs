//! Domain layer: entities and the structure registry
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entity;
pub mod error;
pub mod structure;
pub mod tree_display;

pub use entity::{count_children, CompositeNode, Entity, Flatten, Node};
pub use error::{DomainError, DomainResult};
pub use structure::Structure;
pub use tree_display::{TreeDisplay, DEFAULT_TREE_TITLE};
