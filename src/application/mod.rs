//! Application layer: building structures from definitions
//!
//! Depends on domain layer only.

pub mod definition;
pub mod error;

pub use definition::{load_structure, EntityDefinition, StructureDefinition};
pub use error::{ApplicationError, ApplicationResult};
