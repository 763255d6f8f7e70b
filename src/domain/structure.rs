//! Top-level registry of root entities.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::entity::{count_children, Entity, Flatten};
use crate::domain::error::{DomainError, DomainResult};

/// Ordered forest of root entities with lookups across every nested level.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    roots: Vec<Entity>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a root entity. The same instance may also be nested elsewhere.
    #[instrument(level = "debug", skip(self, entity))]
    pub fn add(&mut self, entity: impl Into<Entity>) {
        let entity = entity.into();
        debug!(code = %entity.code(), "adding root");
        self.roots.push(entity);
    }

    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    /// Number of root entities (not the nested total, see [`Structure::count`]).
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order traversal of every root, in root insertion order.
    pub fn flatten(&self) -> Flatten {
        Flatten::new(&self.roots)
    }

    /// First entity with the given code, or `None`.
    ///
    /// An absent code is rejected with [`DomainError::InvalidArgument`].
    #[instrument(level = "debug", skip(self))]
    pub fn find_by_code(&self, code: Option<&str>) -> DomainResult<Option<Entity>> {
        let code =
            code.ok_or_else(|| DomainError::InvalidArgument("code is absent".to_string()))?;
        Ok(self.find_by(|e| e.code() == code))
    }

    /// First entity with the given renderer, or `None`.
    ///
    /// An absent renderer is rejected with [`DomainError::InvalidArgument`].
    #[instrument(level = "debug", skip(self))]
    pub fn find_by_renderer(&self, renderer: Option<&str>) -> DomainResult<Option<Entity>> {
        let renderer = renderer
            .ok_or_else(|| DomainError::InvalidArgument("renderer is absent".to_string()))?;
        Ok(self.find_by(|e| e.renderer() == renderer))
    }

    /// First entity in flattened order matching `predicate`.
    pub fn find_by<P>(&self, mut predicate: P) -> Option<Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        let found = self.flatten().find(|e| predicate(e));
        debug!(found = found.is_some(), "lookup finished");
        found
    }

    /// Total number of entities across the forest, nested ones included.
    ///
    /// Entities reachable along several paths are counted once per path.
    #[instrument(level = "debug", skip(self))]
    pub fn count(&self) -> usize {
        self.roots.iter().map(count_children).sum()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Structure{{roots=[")?;
        for (i, root) in self.roots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", root)?;
        }
        write!(f, "]}}")
    }
}
