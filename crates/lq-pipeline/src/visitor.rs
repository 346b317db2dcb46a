//! Tree traversal: read-only visits and rewriting passes.
//!
//! A rewriting pass implements [`TreeTransformer`] and is driven by [`rewrite_tree`]. Handlers
//! match on [`Item`] directly; nodes they do not care about fall through a default arm and are
//! kept as they are.
//!
//! In pre-order passes a handler sees a node before its children. The returned node replaces
//! the old one in its parent, and the driver then descends into the children of the *new*
//! node unless the handler marked it final. Post-order passes see children first and the final
//! flag has no effect.

use lq_query::{Item, NodeKind};

use crate::QueryContext;

/// The result of handling one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Replacement node; `None` removes the node from its parent.
    pub node: Option<Item>,
    /// Do not descend into the replacement's children.
    pub is_final: bool,
}

impl Rewrite {
    /// Keeps `node` and continues into its children.
    pub fn keep(node: Item) -> Self {
        Self {
            node: Some(node),
            is_final: false,
        }
    }

    /// Keeps `node` and leaves its subtree alone.
    pub fn finalize(node: Item) -> Self {
        Self {
            node: Some(node),
            is_final: true,
        }
    }

    /// Removes the node.
    pub fn remove() -> Self {
        Self {
            node: None,
            is_final: true,
        }
    }
}

/// When a pass sees a node relative to its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    /// Parents before children.
    #[default]
    PreOrder,
    /// Children before parents.
    PostOrder,
}

/// A rewriting pass over the query tree.
///
/// Transformers hold only read-only resources, so one instance can serve concurrent queries.
pub trait TreeTransformer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Handles one node. `parents` lists the kinds of the enclosing nodes, outermost first.
    fn transform(&self, node: Item, parents: &[NodeKind], context: &mut QueryContext) -> Rewrite;

    /// Traversal order of this pass.
    fn traversal(&self) -> Traversal {
        Traversal::PreOrder
    }

    /// Returns true if nodes of `kind` (and their subtrees) are skipped by this pass.
    fn ignores(&self, _kind: NodeKind) -> bool {
        false
    }
}

/// Wraps a transformer so that it leaves some node kinds untouched.
pub struct Ignoring<T> {
    /// The wrapped pass.
    inner: T,
    /// Node kinds to skip.
    kinds: Vec<NodeKind>,
}

impl<T: TreeTransformer> Ignoring<T> {
    /// Skips `kinds` (and everything below them) when running `inner`.
    pub fn new(inner: T, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            inner,
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl<T: TreeTransformer> TreeTransformer for Ignoring<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn transform(&self, node: Item, parents: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        self.inner.transform(node, parents, context)
    }

    fn traversal(&self) -> Traversal {
        self.inner.traversal()
    }

    fn ignores(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind) || self.inner.ignores(kind)
    }
}

/// Runs a pass over a whole tree. Returns `None` if the root was removed.
pub fn rewrite_tree(
    transformer: &dyn TreeTransformer,
    root: Item,
    context: &mut QueryContext,
) -> Option<Item> {
    let mut parents = Vec::new();
    match transformer.traversal() {
        Traversal::PreOrder => rewrite_pre_order(transformer, root, &mut parents, context),
        Traversal::PostOrder => rewrite_post_order(transformer, root, &mut parents, context),
    }
}

/// Handles `node`, then descends into the replacement unless it is final.
fn rewrite_pre_order(
    transformer: &dyn TreeTransformer,
    node: Item,
    parents: &mut Vec<NodeKind>,
    context: &mut QueryContext,
) -> Option<Item> {
    if transformer.ignores(node.kind()) {
        return Some(node);
    }
    let Rewrite { node, is_final } = transformer.transform(node, parents, context);
    let node = node?;
    if is_final {
        return Some(node);
    }

    parents.push(node.kind());
    let node = node.map_children(|child| rewrite_pre_order(transformer, child, parents, context));
    parents.pop();
    node
}

/// Rewrites the children of `node`, then handles the rebuilt node.
fn rewrite_post_order(
    transformer: &dyn TreeTransformer,
    node: Item,
    parents: &mut Vec<NodeKind>,
    context: &mut QueryContext,
) -> Option<Item> {
    if transformer.ignores(node.kind()) {
        return Some(node);
    }

    parents.push(node.kind());
    let node = node.map_children(|child| rewrite_post_order(transformer, child, parents, context));
    parents.pop();

    transformer.transform(node?, parents, context).node
}

/// A read-only pass over the query tree.
pub trait TreeVisitor {
    /// Called for every visited node, parents before children.
    fn visit(&mut self, node: &Item, parents: &[NodeKind]);

    /// Returns true if nodes of `kind` and their subtrees are skipped.
    fn prunes(&self, _kind: NodeKind) -> bool {
        false
    }
}

/// Visits `root` depth-first in pre-order.
pub fn walk<V: TreeVisitor + ?Sized>(visitor: &mut V, root: &Item) {
    let mut parents = Vec::new();
    walk_node(visitor, root, &mut parents);
}

/// Visits `node` and its unpruned descendants.
fn walk_node<V: TreeVisitor + ?Sized>(visitor: &mut V, node: &Item, parents: &mut Vec<NodeKind>) {
    if visitor.prunes(node.kind()) {
        return;
    }
    visitor.visit(node, parents);
    parents.push(node.kind());
    for child in node.children() {
        walk_node(visitor, child, parents);
    }
    parents.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: &str) -> Item {
        Item::word(value)
    }

    fn group(operands: Vec<Item>) -> Item {
        Item::Group(operands)
    }

    /// Pairs every word with a doubled copy.
    struct Doubler {
        /// Stop at the doubled node or keep descending.
        finalize: bool,
    }

    impl TreeTransformer for Doubler {
        fn name(&self) -> &'static str {
            "doubler"
        }

        fn transform(&self, node: Item, parents: &[NodeKind], _: &mut QueryContext) -> Rewrite {
            match node {
                Item::Word(value) if !parents.contains(&NodeKind::SynonymsGroup) => {
                    let doubled =
                        Item::SynonymsGroup(vec![word(&value), word(&format!("{value}{value}"))]);
                    if self.finalize {
                        Rewrite::finalize(doubled)
                    } else {
                        Rewrite::keep(doubled)
                    }
                }
                other => Rewrite::keep(other),
            }
        }
    }

    /// Removes words equal to "drop".
    struct Dropper;

    impl TreeTransformer for Dropper {
        fn name(&self) -> &'static str {
            "dropper"
        }

        fn transform(&self, node: Item, _: &[NodeKind], _: &mut QueryContext) -> Rewrite {
            match node {
                Item::Word(value) if value == "drop" => Rewrite::remove(),
                other => Rewrite::keep(other),
            }
        }
    }

    /// Unwraps required clauses and single-operand groups.
    struct Unwrapper;

    impl TreeTransformer for Unwrapper {
        fn name(&self) -> &'static str {
            "unwrapper"
        }

        fn transform(&self, node: Item, _: &[NodeKind], _: &mut QueryContext) -> Rewrite {
            match node {
                Item::Plus(inner) => Rewrite::keep(*inner),
                Item::Group(mut operands) if operands.len() == 1 => {
                    Rewrite::keep(operands.remove(0))
                }
                other => Rewrite::keep(other),
            }
        }

        fn traversal(&self) -> Traversal {
            Traversal::PostOrder
        }
    }

    #[test]
    fn test_pre_order_descends_into_replacement() {
        let mut context = QueryContext::default();
        let tree = group(vec![word("a"), word("b")]);
        let result = rewrite_tree(&Doubler { finalize: false }, tree, &mut context).unwrap();
        assert_eq!(
            result,
            group(vec![
                Item::SynonymsGroup(vec![word("a"), word("aa")]),
                Item::SynonymsGroup(vec![word("b"), word("bb")]),
            ])
        );
    }

    #[test]
    fn test_final_stops_descent() {
        let mut context = QueryContext::default();
        let result = rewrite_tree(&Doubler { finalize: true }, word("a"), &mut context).unwrap();
        assert_eq!(
            result,
            Item::SynonymsGroup(vec![word("a"), word("aa")])
        );
    }

    #[test]
    fn test_removal_propagates_to_required_parents() {
        let mut context = QueryContext::default();
        let tree = group(vec![
            word("keep"),
            Item::field("title", word("drop")),
            Item::plus(word("drop")),
        ]);
        let result = rewrite_tree(&Dropper, tree, &mut context).unwrap();
        assert_eq!(result, group(vec![word("keep")]));

        let tree = group(vec![word("drop"), word("drop")]);
        assert!(rewrite_tree(&Dropper, tree, &mut context).is_none());
    }

    #[test]
    fn test_ignored_kinds_are_untouched() {
        let mut context = QueryContext::default();
        let pass = Ignoring::new(Dropper, [NodeKind::SearchField]);
        let tree = group(vec![word("drop"), Item::field("title", word("drop"))]);
        let result = rewrite_tree(&pass, tree, &mut context).unwrap();
        assert_eq!(result, group(vec![Item::field("title", word("drop"))]));
    }

    #[test]
    fn test_post_order_sees_rebuilt_children() {
        let mut context = QueryContext::default();
        let tree = Item::plus(group(vec![Item::plus(word("a"))]));
        assert_eq!(
            rewrite_tree(&Unwrapper, tree, &mut context),
            Some(word("a"))
        );
    }

    /// Collects word values outside prohibited clauses.
    #[derive(Default)]
    struct Words {
        /// Collected values with their depth.
        seen: Vec<(String, usize)>,
    }

    impl TreeVisitor for Words {
        fn visit(&mut self, node: &Item, parents: &[NodeKind]) {
            if let Item::Word(value) = node {
                self.seen.push((value.clone(), parents.len()));
            }
        }

        fn prunes(&self, kind: NodeKind) -> bool {
            kind == NodeKind::Minus
        }
    }

    #[test]
    fn test_walk_prunes_subtrees() {
        let tree = group(vec![
            word("a"),
            Item::minus(word("b")),
            Item::field("title", word("c")),
        ]);
        let mut words = Words::default();
        walk(&mut words, &tree);
        assert_eq!(
            words.seen,
            vec![(String::from("a"), 1), (String::from("c"), 2)]
        );
    }
}
