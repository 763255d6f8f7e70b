//! Declarative structure definitions read from TOML.
//!
//! ```toml
//! [[roots]]
//! code = "code1"
//! renderer = "renderer1"
//!
//! [[roots]]
//! code = "compositeNodeCode1"
//! renderer = "compositeNodeRenderer1"
//! children = [
//!     { ref = "code1" },
//!     { code = "code2", renderer = "renderer2" },
//! ]
//! ```
//!
//! An entry with `children` (even an empty list) becomes a composite node.
//! `ref` shares the entity first defined with that code.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{CompositeNode, Entity, Node, Structure};

/// Parsed structure definition file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StructureDefinition {
    #[serde(default)]
    pub roots: Vec<EntityDefinition>,
}

/// One entry of a definition: a node, a composite, or a reference.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntityDefinition {
    pub code: Option<String>,
    pub renderer: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub children: Option<Vec<EntityDefinition>>,
}

impl StructureDefinition {
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::definition(e.to_string()))
    }

    #[instrument(level = "debug")]
    pub fn from_file(path: &Path) -> ApplicationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApplicationError::io(format!("read {}", path.display()), e))?;
        Self::parse(&content).map_err(|e| match e {
            ApplicationError::Definition { message } => ApplicationError::Definition {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Builds the structure, resolving references in definition order.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self) -> ApplicationResult<Structure> {
        let mut builder = EntityBuilder::default();
        let mut structure = Structure::new();
        for (i, def) in self.roots.iter().enumerate() {
            let root = builder.build(def, &format!("roots[{}]", i))?;
            structure.add(root);
        }
        debug!(roots = structure.len(), total = structure.count(), "structure built");
        Ok(structure)
    }
}

/// Reads and builds a structure definition file.
pub fn load_structure(path: &Path) -> ApplicationResult<Structure> {
    StructureDefinition::from_file(path)?.build()
}

#[derive(Default)]
struct EntityBuilder {
    defined: HashMap<String, Entity>,
}

impl EntityBuilder {
    fn build(&mut self, def: &EntityDefinition, at: &str) -> ApplicationResult<Entity> {
        if let Some(reference) = &def.reference {
            if def.code.is_some() || def.renderer.is_some() || def.children.is_some() {
                return Err(ApplicationError::definition(format!(
                    "{}: 'ref' cannot be combined with 'code', 'renderer' or 'children'",
                    at
                )));
            }
            return self
                .defined
                .get(reference)
                .cloned()
                .ok_or_else(|| ApplicationError::UnknownReference(reference.clone()));
        }

        let code = def
            .code
            .as_deref()
            .ok_or_else(|| ApplicationError::definition(format!("{}: missing 'code'", at)))?;
        let renderer = def
            .renderer
            .as_deref()
            .ok_or_else(|| ApplicationError::definition(format!("{}: missing 'renderer'", at)))?;

        match &def.children {
            None => {
                let node: Entity = Node::new(code, renderer).into();
                self.register(&node);
                Ok(node)
            }
            Some(children) => {
                let composite = Rc::new(CompositeNode::new(code, renderer));
                // Registered before its children so a ref back to it is a cycle
                self.register(&Entity::from(&composite));
                for (i, child_def) in children.iter().enumerate() {
                    let child = self.build(child_def, &format!("{}.children[{}]", at, i))?;
                    composite.add(child)?;
                }
                Ok(composite.into())
            }
        }
    }

    fn register(&mut self, entity: &Entity) {
        self.defined
            .entry(entity.code().to_string())
            .or_insert_with(|| entity.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_ref_with_code_when_building_then_rejects_entry() {
        let def = StructureDefinition::parse(
            r#"
[[roots]]
code = "a"
renderer = "r"

[[roots]]
ref = "a"
code = "b"
"#,
        )
        .unwrap();

        let err = def.build().unwrap_err();
        assert!(err.to_string().contains("roots[1]"));
    }

    #[test]
    fn given_ref_to_ancestor_when_building_then_detects_cycle() {
        let def = StructureDefinition::parse(
            r#"
[[roots]]
code = "P"
renderer = "p"
children = [ { code = "Q", renderer = "q", children = [ { ref = "P" } ] } ]
"#,
        )
        .unwrap();

        let err = def.build().unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::CycleDetected { .. })
        ));
    }

    #[test]
    fn given_duplicate_codes_when_referencing_then_resolves_first_definition() {
        let def = StructureDefinition::parse(
            r#"
[[roots]]
code = "dup"
renderer = "first"

[[roots]]
code = "dup"
renderer = "second"

[[roots]]
ref = "dup"
"#,
        )
        .unwrap();

        let structure = def.build().unwrap();
        assert_eq!(structure.roots()[2].renderer(), "first");
        assert!(structure.roots()[2].ptr_eq(&structure.roots()[0]));
    }
}
