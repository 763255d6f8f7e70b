//! Domain entities: leaf nodes, composite nodes and the shared entity handle.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Leaf entity: a code and a renderer, no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    code: String,
    renderer: String,
}

impl Node {
    pub fn new(code: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            renderer: renderer.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{{code='{}', renderer='{}'}}", self.code, self.renderer)
    }
}

/// Container entity holding an ordered list of shared children.
///
/// Children are appended through [`CompositeNode::add`], which takes the
/// composite by `Rc` so it can keep growing after it has been shared with
/// other containers or with a [`Structure`](crate::domain::Structure).
#[derive(Debug)]
pub struct CompositeNode {
    code: String,
    renderer: String,
    children: RefCell<Vec<Entity>>,
}

impl CompositeNode {
    pub fn new(code: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            renderer: renderer.into(),
            children: RefCell::new(Vec::new()),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    /// Snapshot of the direct children in insertion order.
    pub fn children(&self) -> Vec<Entity> {
        self.children.borrow().clone()
    }

    /// Appends `child` to this composite.
    ///
    /// The same entity may be added any number of times, here or elsewhere.
    /// Fails with [`DomainError::CycleDetected`] if `child` is this composite
    /// or already contains it, in which case the children are left unchanged.
    #[instrument(level = "debug", skip(self, child), fields(parent = %self.code))]
    pub fn add(self: &Rc<Self>, child: impl Into<Entity>) -> DomainResult<()> {
        let child = child.into();
        if reaches(&child, self) {
            return Err(DomainError::CycleDetected {
                parent: self.code.clone(),
                child: child.code().to_string(),
            });
        }
        debug!(child = %child.code(), "adding child");
        self.children.borrow_mut().push(child);
        Ok(())
    }
}

impl fmt::Display for CompositeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeNode{{children=[")?;
        for (i, child) in self.children.borrow().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, "], code='{}', renderer='{}'}}", self.code, self.renderer)
    }
}

/// Shared handle to either kind of entity.
///
/// Cloning an `Entity` clones the handle, not the node: both clones refer to
/// the same instance. Use [`Entity::ptr_eq`] to compare identity.
#[derive(Debug, Clone)]
pub enum Entity {
    Node(Rc<Node>),
    Composite(Rc<CompositeNode>),
}

impl Entity {
    /// New leaf entity.
    pub fn node(code: impl Into<String>, renderer: impl Into<String>) -> Self {
        Node::new(code, renderer).into()
    }

    pub fn code(&self) -> &str {
        match self {
            Entity::Node(node) => node.code(),
            Entity::Composite(composite) => composite.code(),
        }
    }

    pub fn renderer(&self) -> &str {
        match self {
            Entity::Node(node) => node.renderer(),
            Entity::Composite(composite) => composite.renderer(),
        }
    }

    pub fn as_composite(&self) -> Option<&Rc<CompositeNode>> {
        match self {
            Entity::Node(_) => None,
            Entity::Composite(composite) => Some(composite),
        }
    }

    /// Direct children; empty for a leaf.
    pub fn children(&self) -> Vec<Entity> {
        match self {
            Entity::Node(_) => Vec::new(),
            Entity::Composite(composite) => composite.children(),
        }
    }

    /// See [`count_children`].
    pub fn count_children(&self) -> usize {
        count_children(self)
    }

    /// Pre-order traversal starting with this entity.
    pub fn flatten(&self) -> Flatten {
        Flatten::new(std::slice::from_ref(self))
    }

    /// True if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        match (self, other) {
            (Entity::Node(a), Entity::Node(b)) => Rc::ptr_eq(a, b),
            (Entity::Composite(a), Entity::Composite(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Node(node) => node.fmt(f),
            Entity::Composite(composite) => composite.fmt(f),
        }
    }
}

impl From<Node> for Entity {
    fn from(node: Node) -> Self {
        Entity::Node(Rc::new(node))
    }
}

impl From<Rc<Node>> for Entity {
    fn from(node: Rc<Node>) -> Self {
        Entity::Node(node)
    }
}

impl From<CompositeNode> for Entity {
    fn from(composite: CompositeNode) -> Self {
        Entity::Composite(Rc::new(composite))
    }
}

impl From<Rc<CompositeNode>> for Entity {
    fn from(composite: Rc<CompositeNode>) -> Self {
        Entity::Composite(composite)
    }
}

impl From<&Rc<CompositeNode>> for Entity {
    fn from(composite: &Rc<CompositeNode>) -> Self {
        Entity::Composite(Rc::clone(composite))
    }
}

/// True if `target` is `from` or one of its descendants.
///
/// Each shared composite is expanded once, so the walk is linear in the
/// number of distinct composites and child links, not in the number of paths.
#[instrument(level = "trace", skip(from, target), fields(from = %from.code()))]
fn reaches(from: &Entity, target: &Rc<CompositeNode>) -> bool {
    let mut visited: HashSet<*const CompositeNode> = HashSet::new();
    let mut stack = vec![from.clone()];
    while let Some(current) = stack.pop() {
        let Entity::Composite(composite) = current else {
            continue;
        };
        if Rc::ptr_eq(&composite, target) {
            return true;
        }
        if visited.insert(Rc::as_ptr(&composite)) {
            stack.extend(
                composite
                    .children
                    .borrow()
                    .iter()
                    .filter(|c| matches!(c, Entity::Composite(_)))
                    .cloned(),
            );
        }
    }
    false
}

/// Number of entities in the subtree rooted at `entity`, itself included.
///
/// A leaf counts 1, a composite counts 1 plus the count of each child.
/// Recomputed on every call.
#[instrument(level = "trace", skip(entity), fields(code = %entity.code()))]
pub fn count_children(entity: &Entity) -> usize {
    match entity {
        Entity::Node(_) => 1,
        Entity::Composite(composite) => {
            1 + composite
                .children
                .borrow()
                .iter()
                .map(count_children)
                .sum::<usize>()
        }
    }
}

/// Depth-first pre-order iterator over one or more subtrees.
///
/// Siblings are visited in insertion order. Holds its own stack, so every
/// call to `flatten` starts a fresh traversal.
pub struct Flatten {
    stack: Vec<Entity>,
}

impl Flatten {
    pub(crate) fn new(roots: &[Entity]) -> Self {
        Self {
            stack: roots.iter().rev().cloned().collect(),
        }
    }
}

impl Iterator for Flatten {
    type Item = Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Entity::Composite(composite) = &current {
            // Push children in reverse order for left-to-right traversal
            self.stack
                .extend(composite.children.borrow().iter().rev().cloned());
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(entity: &Entity) -> Vec<String> {
        entity.flatten().map(|e| e.code().to_string()).collect()
    }

    #[test]
    fn given_leaf_when_counting_then_returns_one() {
        let node = Entity::node("code1", "renderer1");
        assert_eq!(node.count_children(), 1);
        assert_eq!(codes(&node), vec!["code1"]);
    }

    #[test]
    fn given_empty_composite_when_counting_then_counts_itself() {
        let composite: Entity = CompositeNode::new("X", "Y").into();
        assert_eq!(composite.count_children(), 1);
        assert!(composite.children().is_empty());
    }

    #[test]
    fn given_composite_with_self_when_adding_then_rejects_cycle() {
        let composite = Rc::new(CompositeNode::new("X", "Y"));

        let result = composite.add(&composite);

        assert_eq!(
            result,
            Err(DomainError::CycleDetected {
                parent: "X".to_string(),
                child: "X".to_string(),
            })
        );
        assert!(composite.children().is_empty());
    }

    #[test]
    fn given_same_leaf_twice_when_adding_then_keeps_both() {
        let composite = Rc::new(CompositeNode::new("X", "Y"));
        let leaf = Entity::node("A", "a");

        composite.add(leaf.clone()).unwrap();
        composite.add(leaf.clone()).unwrap();

        let children = composite.children();
        assert_eq!(children.len(), 2);
        assert!(children[0].ptr_eq(&children[1]));
        assert_eq!(Entity::from(&composite).count_children(), 3);
    }

    #[test]
    fn given_entities_when_displayed_then_nests_children() {
        let composite = Rc::new(CompositeNode::new("X", "Y"));
        composite.add(Entity::node("A", "a")).unwrap();

        assert_eq!(
            Entity::from(&composite).to_string(),
            "CompositeNode{children=[Node{code='A', renderer='a'}], code='X', renderer='Y'}"
        );
    }

    #[test]
    fn given_distinct_instances_with_same_code_when_comparing_then_not_ptr_eq() {
        let a = Entity::node("A", "a");
        let b = Entity::node("A", "a");
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }
}
