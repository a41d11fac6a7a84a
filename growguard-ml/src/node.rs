//! Isolation tree node implementation
//!
//! Trees are stored as flat node arrays. Children always sit at higher
//! indices than their parent, which keeps traversal loop-free and lets a
//! loaded artifact be checked with a single pass.

use serde::{Deserialize, Serialize};

use crate::Sample;

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Node type in the isolation tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeType {
    /// Internal node with split condition
    Internal {
        /// Feature index to split on
        feature: u8,
        /// Samples with `value < split_value` go left
        split_value: f64,
        /// Left child index
        left: u32,
        /// Right child index
        right: u32,
    },
    /// Leaf node (external)
    External {
        /// Number of training samples that reached this leaf
        size: u32,
    },
}

/// Tree node with its depth from the root
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Depth from root
    pub depth: u8,
}

impl Node {
    /// Create an internal node
    pub fn internal(feature: u8, split_value: f64, left: u32, right: u32, depth: u8) -> Self {
        Self {
            node_type: NodeType::Internal {
                feature,
                split_value,
                left,
                right,
            },
            depth,
        }
    }

    /// Create an external (leaf) node
    pub fn external(size: u32, depth: u8) -> Self {
        Self {
            node_type: NodeType::External { size },
            depth,
        }
    }

    /// Check if node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.node_type, NodeType::External { .. })
    }

    /// Path length credited to a sample ending at this leaf
    ///
    /// Depth plus the expected remaining depth of the samples that were not
    /// separated further. Internal nodes report their depth only.
    pub fn path_length(&self) -> f64 {
        match self.node_type {
            NodeType::External { size } => self.depth as f64 + average_path_length(size as usize),
            NodeType::Internal { .. } => self.depth as f64,
        }
    }

    /// Child to visit next, `None` at a leaf
    pub fn traverse(&self, sample: &Sample) -> Option<u32> {
        match self.node_type {
            NodeType::Internal {
                feature,
                split_value,
                left,
                right,
            } => {
                if sample[feature as usize] < split_value {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            NodeType::External { .. } => None,
        }
    }
}

/// Average path length of an unsuccessful binary search over `n` items, c(n)
///
/// `c(n) = 2 * H(n-1) - 2 * (n-1) / n` with `H(i) ~ ln(i) + gamma`.
/// By convention `c(2) = 1` and `c(n) = 0` for `n <= 1`.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 25.0, 1, 2, 3);
        assert!(!internal.is_leaf());
        assert_eq!(internal.depth, 3);

        let external = Node::external(10, 5);
        assert!(external.is_leaf());
        assert_eq!(external.depth, 5);
    }

    #[test]
    fn test_node_traverse() {
        let node = Node::internal(2, 6.5, 1, 2, 0);

        assert_eq!(node.traverse(&[23.0, 65.0, 6.0]), Some(1));
        assert_eq!(node.traverse(&[23.0, 65.0, 6.5]), Some(2));
        assert_eq!(Node::external(1, 1).traverse(&[0.0; 3]), None);
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // 2 * (ln 255 + gamma) - 2 * 255 / 256
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn leaf_path_includes_adjustment() {
        let leaf = Node::external(2, 4);
        assert_eq!(leaf.path_length(), 5.0);
        assert_eq!(Node::external(1, 4).path_length(), 4.0);
    }
}
