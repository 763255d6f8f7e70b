use termtree::Tree;
use tracing::instrument;

use crate::domain::entity::Entity;
use crate::domain::structure::Structure;

/// Label of the forest root when no other title is configured.
pub const DEFAULT_TREE_TITLE: &str = "structure";

/// Conversion into a printable `termtree` view.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(entity: &Entity) -> String {
    format!("{} [{}]", entity.code(), entity.renderer())
}

impl TreeDisplay for Entity {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // Recursively construct the children
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();

        Tree::new(label(self)).with_leaves(leaves)
    }
}

impl Structure {
    /// Tree view of the whole forest under a single `title` node.
    pub fn to_titled_tree(&self, title: &str) -> Tree<String> {
        let leaves: Vec<_> = self.roots().iter().map(|r| r.to_tree_string()).collect();
        Tree::new(title.to_string()).with_leaves(leaves)
    }
}

impl TreeDisplay for Structure {
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            Tree::new("Empty structure".to_string())
        } else {
            self.to_titled_tree(DEFAULT_TREE_TITLE)
        }
    }
}
