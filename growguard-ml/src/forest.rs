//! Isolation Forest implementation
//!
//! Combines many isolation trees, each grown on a random sub-sample, and
//! calibrates a decision offset from the training data so that scores are
//! centred on the anomaly boundary.

use serde::{Deserialize, Serialize};

use crate::{
    percentile, raw_score, IsolationTree, MLError, MLResult, Rng, Sample, TreeConfig,
    DEFAULT_CONTAMINATION, DEFAULT_NUM_TREES, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED,
};

/// Configuration for Isolation Forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub num_trees: usize,
    /// Maximum sub-sample size for each tree
    pub sample_size: usize,
    /// Expected fraction of anomalies in the training data, in (0, 0.5]
    pub contamination: f64,
    /// Random seed
    pub seed: u64,
}

impl ForestConfig {
    /// Set the number of trees
    pub fn with_num_trees(mut self, num_trees: usize) -> Self {
        self.num_trees = num_trees;
        self
    }

    /// Set the maximum sub-sample size
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the contamination fraction
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values the forest cannot train with
    pub fn validate(&self) -> MLResult<()> {
        if self.num_trees == 0 {
            return Err(MLError::InvalidParameter("num_trees must be at least 1".into()));
        }
        if self.sample_size == 0 {
            return Err(MLError::InvalidParameter("sample_size must be at least 1".into()));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(MLError::InvalidParameter(format!(
                "contamination must be in (0, 0.5] as in scikit-learn's IsolationForest, got {}",
                self.contamination
            )));
        }
        Ok(())
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            sample_size: DEFAULT_SAMPLE_SIZE,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
        }
    }
}

/// Trained Isolation Forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Individual trees
    trees: Vec<IsolationTree>,
    /// Configuration used for training
    config: ForestConfig,
    /// Sub-sample size each tree was actually grown on
    sample_size: usize,
    /// Number of samples used for training
    num_samples: usize,
    /// Raw-score threshold; decision scores are raw scores minus this
    offset: f64,
}

impl IsolationForest {
    /// Train the forest on (already normalized) samples
    pub fn fit(samples: &[Sample], config: ForestConfig) -> MLResult<Self> {
        config.validate()?;
        if samples.is_empty() {
            return Err(MLError::EmptyCorpus);
        }

        let sample_size = config.sample_size.min(samples.len());
        let tree_config = TreeConfig {
            max_depth: TreeConfig::depth_limit(sample_size),
            seed: 0,
        };

        let mut rng = Rng::new(config.seed);
        let mut indices: Vec<usize> = (0..samples.len()).collect();
        let mut subset = Vec::with_capacity(sample_size);

        let mut trees = Vec::with_capacity(config.num_trees);
        for _ in 0..config.num_trees {
            let tree_seed = rng.next_u64();

            // Partial Fisher-Yates: first `sample_size` indices are a sample
            // without replacement
            for i in 0..sample_size {
                let j = i + rng.next_range(samples.len() - i);
                indices.swap(i, j);
            }
            subset.clear();
            subset.extend(indices[..sample_size].iter().map(|&i| samples[i]));

            trees.push(IsolationTree::fit(
                &subset,
                TreeConfig {
                    seed: tree_seed,
                    ..tree_config
                },
            ));
        }

        let mut forest = Self {
            trees,
            config,
            sample_size,
            num_samples: samples.len(),
            offset: 0.0,
        };

        let training_scores = forest.score_samples(samples);
        forest.offset = percentile(&training_scores, 100.0 * config.contamination)
            .ok_or(MLError::EmptyCorpus)?;

        log::debug!(
            "Fitted {} trees on {} samples (psi={}, offset={:.6})",
            forest.trees.len(),
            forest.num_samples,
            forest.sample_size,
            forest.offset
        );

        Ok(forest)
    }

    /// Mean path length of a sample across all trees
    pub fn mean_path_length(&self, sample: &Sample) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let total: f64 = self.trees.iter().map(|tree| tree.path_length(sample)).sum();
        total / self.trees.len() as f64
    }

    /// Raw score in `[-1, 0)`; lower is more anomalous
    pub fn raw_score(&self, sample: &Sample) -> f64 {
        raw_score(self.mean_path_length(sample), self.sample_size)
    }

    /// Raw scores for a batch
    pub fn score_samples(&self, samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| self.raw_score(s)).collect()
    }

    /// Decision score: negative means anomalous, 0 is the boundary
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        self.raw_score(sample) - self.offset
    }

    /// Verdict for a sample
    pub fn predict(&self, sample: &Sample) -> bool {
        self.decision_function(sample) < 0.0
    }

    /// Calibrated offset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Configuration the forest was trained with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Trees in the forest
    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    /// Check structural consistency of a deserialized forest
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        if self.sample_size == 0 {
            return Err("sub-sample size is zero".into());
        }
        if !self.offset.is_finite() {
            return Err("offset is not finite".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    /// Forest statistics
    pub fn stats(&self) -> ForestStats {
        let total_nodes: usize = self.trees.iter().map(|t| t.node_count()).sum();
        let max_depth = self.trees.iter().map(|t| t.depth()).max().unwrap_or(0);

        ForestStats {
            num_trees: self.trees.len(),
            total_nodes,
            max_depth,
            sample_size: self.sample_size,
            num_samples: self.num_samples,
            offset: self.offset,
        }
    }
}

/// Forest statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestStats {
    /// Number of trees
    pub num_trees: usize,
    /// Total nodes across all trees
    pub total_nodes: usize,
    /// Deepest leaf across all trees
    pub max_depth: u8,
    /// Sub-sample size per tree
    pub sample_size: usize,
    /// Training samples
    pub num_samples: usize,
    /// Calibrated offset
    pub offset: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(n: usize) -> Vec<Sample> {
        let mut rng = Rng::new(9);
        (0..n)
            .map(|_| {
                [
                    rng.next_f64_range(-1.0, 1.0),
                    rng.next_f64_range(-1.0, 1.0),
                    rng.next_f64_range(-1.0, 1.0),
                ]
            })
            .collect()
    }

    #[test]
    fn rejects_bad_config() {
        let samples = cluster(10);
        for config in [
            ForestConfig::default().with_num_trees(0),
            ForestConfig::default().with_sample_size(0),
            ForestConfig::default().with_contamination(0.0),
            ForestConfig::default().with_contamination(0.6),
            ForestConfig::default().with_contamination(f64::NAN),
        ] {
            assert!(matches!(
                IsolationForest::fit(&samples, config),
                Err(MLError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn contamination_error_names_the_range() {
        match ForestConfig::default().with_contamination(0.6).validate() {
            Err(MLError::InvalidParameter(message)) => {
                assert!(message.contains("(0, 0.5]"));
                assert!(message.contains("scikit-learn"));
                assert!(message.ends_with("got 0.6"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            IsolationForest::fit(&[], ForestConfig::default()),
            Err(MLError::EmptyCorpus)
        ));
    }

    #[test]
    fn sub_sample_is_capped_by_data() {
        let forest = IsolationForest::fit(&cluster(40), ForestConfig::default().with_num_trees(5)).unwrap();
        let stats = forest.stats();

        assert_eq!(stats.num_trees, 5);
        assert_eq!(stats.sample_size, 40);
        assert_eq!(stats.num_samples, 40);
        assert!(stats.max_depth as usize <= TreeConfig::depth_limit(40));
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn outlier_scores_below_boundary() {
        let samples = cluster(300);
        let forest = IsolationForest::fit(&samples, ForestConfig::default()).unwrap();

        let far = [8.0, 8.0, 8.0];
        let centre = [0.0, 0.0, 0.0];

        assert!(forest.predict(&far));
        assert!(!forest.predict(&centre));
        assert!(forest.decision_function(&far) < forest.decision_function(&centre));
        assert!((-1.0..0.0).contains(&forest.raw_score(&far)));
    }

    #[test]
    fn contamination_sets_training_anomaly_rate() {
        let samples = cluster(400);
        let forest = IsolationForest::fit(&samples, ForestConfig::default().with_contamination(0.1)).unwrap();

        let flagged = samples.iter().filter(|s| forest.predict(s)).count();
        assert!((36..=44).contains(&flagged), "flagged {flagged}");
    }

    #[test]
    fn training_is_deterministic() {
        let samples = cluster(120);
        let a = IsolationForest::fit(&samples, ForestConfig::default()).unwrap();
        let b = IsolationForest::fit(&samples, ForestConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = IsolationForest::fit(&samples, ForestConfig::default().with_seed(7)).unwrap();
        assert_ne!(a, c);
    }
}
