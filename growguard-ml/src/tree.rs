//! Isolation tree implementation
//!
//! Trees are built by recursively partitioning a sub-sample on a random
//! feature at a uniform random threshold, until a node holds one sample,
//! holds only identical samples, or reaches the depth limit.

use serde::{Deserialize, Serialize};

use crate::{Node, NodeType, Rng, Sample, FEATURE_COUNT};

/// Configuration for isolation tree
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Random seed for this tree
    pub seed: u64,
}

impl TreeConfig {
    /// Depth limit for a tree grown on `sample_size` samples: `ceil(log2(n))`
    pub fn depth_limit(sample_size: usize) -> usize {
        let n = sample_size.max(2);
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            seed: 42,
        }
    }
}

/// Isolation tree in array representation, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    /// Grow a tree on `samples`
    ///
    /// `samples` must be non-empty; the forest guarantees this.
    pub fn fit(samples: &[Sample], config: TreeConfig) -> Self {
        let mut builder = TreeBuilder {
            nodes: Vec::with_capacity(2 * samples.len()),
            rng: Rng::new(config.seed),
            max_depth: config.max_depth.min(u8::MAX as usize),
        };
        let mut work = samples.to_vec();
        builder.build(&mut work, 0);

        Self { nodes: builder.nodes }
    }

    /// Nodes in storage order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Path length of a sample: depth of its leaf plus the leaf adjustment
    pub fn path_length(&self, sample: &Sample) -> f64 {
        let mut index = 0usize;
        while let Some(node) = self.nodes.get(index) {
            match node.traverse(sample) {
                Some(next) => index = next as usize,
                None => return node.path_length(),
            }
        }
        0.0
    }

    /// Check structural consistency of a deserialized tree
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let NodeType::Internal {
                feature,
                split_value,
                left,
                right,
            } = node.node_type
            {
                if feature as usize >= FEATURE_COUNT {
                    return Err(format!("node {index}: feature {feature} out of range"));
                }
                if !split_value.is_finite() {
                    return Err(format!("node {index}: split value is not finite"));
                }
                for child in [left, right] {
                    let child = child as usize;
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!("node {index}: child index {child} out of order"));
                    }
                }
            }
        }

        Ok(())
    }
}

struct TreeBuilder {
    nodes: Vec<Node>,
    rng: Rng,
    max_depth: usize,
}

impl TreeBuilder {
    /// Build the subtree for `samples` and return its root index
    fn build(&mut self, samples: &mut [Sample], depth: u8) -> u32 {
        let index = self.nodes.len() as u32;
        // Placeholder, replaced once the children exist
        self.nodes.push(Node::external(samples.len() as u32, depth));

        if depth as usize >= self.max_depth || samples.len() <= 1 {
            return index;
        }

        let Some((feature, split_value)) = self.select_split(samples) else {
            // All samples identical
            return index;
        };

        let split = partition(samples, feature, split_value);
        if split == 0 || split == samples.len() {
            return index;
        }

        let (left_samples, right_samples) = samples.split_at_mut(split);
        let left = self.build(left_samples, depth + 1);
        let right = self.build(right_samples, depth + 1);

        self.nodes[index as usize] = Node::internal(feature as u8, split_value, left, right, depth);
        index
    }

    /// Pick a random non-constant feature and a uniform threshold in its range
    ///
    /// Features are visited in a random order so that constant ones are
    /// skipped without biasing the choice among the rest.
    fn select_split(&mut self, samples: &[Sample]) -> Option<(usize, f64)> {
        let mut order: [usize; FEATURE_COUNT] = core::array::from_fn(|i| i);
        for i in (1..FEATURE_COUNT).rev() {
            let j = self.rng.next_range(i + 1);
            order.swap(i, j);
        }

        for feature in order {
            let (min, max) = feature_range(samples, feature);
            if max > min {
                return Some((feature, self.rng.next_f64_range(min, max)));
            }
        }

        None
    }
}

fn feature_range(samples: &[Sample], feature: usize) -> (f64, f64) {
    samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
        (min.min(s[feature]), max.max(s[feature]))
    })
}

/// Move samples with `value < split_value` to the front; returns their count
fn partition(samples: &mut [Sample], feature: usize, split_value: f64) -> usize {
    let mut split = 0;
    for i in 0..samples.len() {
        if samples[i][feature] < split_value {
            samples.swap(i, split);
            split += 1;
        }
    }
    split
}
