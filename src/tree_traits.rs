/*
Renders a search tree as a termtree::Tree<String> for terminal display.
Children are labelled with the slot they occupy, so a lone right child is
distinguishable from a lone left child.
 */
use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{BinarySearchTree, NodeRef};

/// Deepest level that is drawn. Dropping a `termtree::Tree` recurses once per level and line
/// width grows with depth, so degenerate chains are cut off here.
pub const MAX_RENDER_DEPTH: usize = 256;

const OMITTED: &str = "...";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<K: Display> TreeNodeConvert for BinarySearchTree<K> {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => build_tree(root),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

enum Frame<'a, K> {
    Visit {
        node: NodeRef<'a, K>,
        label: String,
        depth: usize,
    },
    Assemble {
        label: String,
        children: usize,
    },
}

/// Post-order build on an explicit stack; subtrees below `MAX_RENDER_DEPTH` collapse to `...`.
fn build_tree<K: Display>(root: NodeRef<'_, K>) -> Tree<String> {
    let mut stack = vec![Frame::Visit {
        node: root,
        label: root.key().to_string(),
        depth: 1,
    }];
    let mut built: Vec<Tree<String>> = Vec::new();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit { node, label, depth } => {
                let children: Vec<_> = [
                    node.left().map(|n| (n, format!("L: {}", n.key()))),
                    node.right().map(|n| (n, format!("R: {}", n.key()))),
                ]
                .into_iter()
                .flatten()
                .collect();

                if children.is_empty() {
                    built.push(Tree::new(label));
                } else if depth >= MAX_RENDER_DEPTH {
                    built.push(Tree::new(label).with_leaves([OMITTED.to_string()]));
                } else {
                    stack.push(Frame::Assemble {
                        label,
                        children: children.len(),
                    });
                    // pushed in reverse so the left subtree is built first
                    for (node, label) in children.into_iter().rev() {
                        stack.push(Frame::Visit {
                            node,
                            label,
                            depth: depth + 1,
                        });
                    }
                }
            }
            Frame::Assemble { label, children } => {
                let leaves = built.split_off(built.len() - children);
                built.push(Tree::new(label).with_leaves(leaves));
            }
        }
    }
    built.pop().unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tree_string_labels_children() {
        let tree: BinarySearchTree<i32> = [5, 3, 8, 9].into_iter().collect();
        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "5");
        assert!(lines[1].ends_with("L: 3"));
        assert!(lines[2].ends_with("R: 8"));
        assert!(lines[3].ends_with("R: 9"));
    }

    #[test]
    fn test_to_tree_string_empty() {
        let tree: BinarySearchTree<i32> = BinarySearchTree::new();
        assert_eq!(tree.to_tree_string().to_string().trim(), "Empty tree");
    }

    #[test]
    fn test_to_tree_string_keeps_sibling_order_in_subtrees() {
        let tree: BinarySearchTree<i32> = [50, 25, 75, 10, 30, 60, 90].into_iter().collect();
        let rendered = tree.to_tree_string().to_string();
        let labels: Vec<&str> = rendered
            .lines()
            .map(|l| l.trim_start_matches(|c: char| !c.is_ascii_alphanumeric()))
            .collect();
        assert_eq!(
            labels,
            ["50", "L: 25", "L: 10", "R: 30", "R: 75", "L: 60", "R: 90"]
        );
    }

    #[test]
    fn test_to_tree_string_deep_chain_is_cut_off() {
        let tree: BinarySearchTree<u32> = (0..20_000).collect();
        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), MAX_RENDER_DEPTH + 1);
        assert_eq!(lines[0], "0");
        assert!(lines[MAX_RENDER_DEPTH - 1].ends_with(&format!("R: {}", MAX_RENDER_DEPTH - 1)));
        assert!(lines[MAX_RENDER_DEPTH].ends_with(OMITTED));
    }
}
