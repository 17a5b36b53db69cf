//! Gradient-Boosted Decision Trees
//!
//! Binary logistic boosting with exact greedy split finding. Each round fits
//! one regression tree to the first and second order gradients of the
//! weighted log loss. Trees grow level-wise: every feature column is sorted
//! once up front and a single pass per column per level scores the split
//! candidates of all open nodes at the same time.

use crate::InferenceError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum loss reduction for a split to be kept
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// Lower bound on per-row hessians
const MIN_HESSIAN: f64 = 1e-16;

/// Booster hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf
    pub learning_rate: f64,
    /// Maximum tree depth (root is depth 0)
    pub max_depth: usize,
    /// L2 regularisation on leaf weights
    pub lambda: f64,
    /// Minimum loss reduction required to split
    pub gamma: f64,
    /// Minimum hessian sum in each child
    pub min_child_weight: f64,
    /// Initial probability for every row
    pub base_score: f64,
    /// Fraction of rows sampled per round
    pub subsample: f64,
    /// Weight multiplier for positive rows
    pub scale_pos_weight: f64,
    /// Seed for row sampling
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.01,
            max_depth: 6,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            base_score: 0.5,
            subsample: 1.0,
            scale_pos_weight: 1.0,
            seed: 1,
        }
    }
}

impl BoosterParams {
    fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |msg: &str| Err(InferenceError::InvalidParameter(msg.to_string()));

        // NaN fails every range check
        let positive = |x: f64| x.is_finite() && x > 0.0;
        let non_negative = |x: f64| x >= 0.0;

        if !positive(self.learning_rate) {
            return invalid("learning_rate must be positive");
        }
        if !positive(self.base_score) || self.base_score >= 1.0 {
            return invalid("base_score must be in (0, 1)");
        }
        if !positive(self.subsample) || self.subsample > 1.0 {
            return invalid("subsample must be in (0, 1]");
        }
        if !positive(self.scale_pos_weight) {
            return invalid("scale_pos_weight must be positive and finite");
        }
        if !non_negative(self.lambda)
            || !non_negative(self.gamma)
            || !non_negative(self.min_child_weight)
        {
            return invalid("lambda, gamma and min_child_weight must be non-negative");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single regression tree; rows with `x[feature] < threshold` go left
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value reached by a row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] < threshold { left } else { right },
            }
        }
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Trained tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    base_margin: f64,
    num_features: usize,
    trees: Vec<Tree>,
}

impl Booster {
    /// Train an ensemble on `rows` (all the same width) and binary `labels`
    pub fn train<R: AsRef<[f64]>>(
        rows: &[R],
        labels: &[u8],
        params: &BoosterParams,
    ) -> Result<Self, InferenceError> {
        params.validate()?;

        if rows.is_empty() {
            return Err(InferenceError::InvalidInputShape {
                expected: "at least one row".to_string(),
                actual: "0 rows".to_string(),
            });
        }
        if rows.len() != labels.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} labels", rows.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        let num_features = rows[0].as_ref().len();
        if let Some(bad) = rows.iter().find(|r| r.as_ref().len() != num_features) {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} features per row", num_features),
                actual: format!("{} features", bad.as_ref().len()),
            });
        }

        let n = rows.len();
        let base_margin = logit(params.base_score);
        let weights: Vec<f64> = labels
            .iter()
            .map(|&y| if y == 1 { params.scale_pos_weight } else { 1.0 })
            .collect();

        let sorted: Vec<Vec<usize>> = (0..num_features)
            .map(|feature| {
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by(|&a, &b| {
                    rows[a].as_ref()[feature].total_cmp(&rows[b].as_ref()[feature])
                });
                order
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut margins = vec![base_margin; n];
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            for i in 0..n {
                let p = sigmoid(margins[i]);
                let y = f64::from(labels[i]);
                grad[i] = weights[i] * (p - y);
                hess[i] = (weights[i] * p * (1.0 - p)).max(MIN_HESSIAN);
            }

            let sampled: Vec<bool> = if params.subsample < 1.0 {
                (0..n).map(|_| rng.gen_bool(params.subsample)).collect()
            } else {
                vec![true; n]
            };

            let tree = TreeBuilder {
                rows,
                sorted: &sorted,
                grad: &grad,
                hess: &hess,
                params,
            }
            .build(&sampled);

            for (margin, row) in margins.iter_mut().zip(rows) {
                *margin += tree.predict(row.as_ref());
            }

            if round % 25 == 0 {
                debug!("Round {}: tree with {} leaves", round, tree.num_leaves());
            }
            trees.push(tree);
        }

        Ok(Self {
            base_margin,
            num_features,
            trees,
        })
    }

    /// Raw log-odds for a row
    pub fn predict_margin(&self, row: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    /// 1 when the positive-class probability exceeds 0.5
    pub fn predict_label(&self, row: &[f64]) -> u8 {
        u8::from(sigmoid(self.predict_margin(row)) > 0.5)
    }

    /// Row width the ensemble was trained on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Trained trees
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

#[derive(Debug, Clone, Copy, Default)]
struct GradStats {
    g: f64,
    h: f64,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: GradStats,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    acc: GradStats,
    last: Option<f64>,
}

struct TreeBuilder<'a, R> {
    rows: &'a [R],
    sorted: &'a [Vec<usize>],
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a BoosterParams,
}

impl<R: AsRef<[f64]>> TreeBuilder<'_, R> {
    fn build(&self, sampled: &[bool]) -> Tree {
        let n = self.rows.len();
        let mut root = GradStats::default();
        for i in (0..n).filter(|&i| sampled[i]) {
            root.g += self.grad[i];
            root.h += self.hess[i];
        }

        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stats = vec![root];
        // Open node each row currently sits in; None once settled or unsampled.
        let mut positions: Vec<Option<usize>> =
            sampled.iter().map(|&s| if s { Some(0) } else { None }).collect();
        let mut frontier = vec![0usize];

        for depth in 0..=self.params.max_depth {
            if frontier.is_empty() {
                break;
            }

            let best = if depth < self.params.max_depth {
                self.find_splits(&positions, &stats)
            } else {
                vec![None; stats.len()]
            };

            let mut next = Vec::new();
            for &node in &frontier {
                match best[node] {
                    Some(split) => {
                        let total = stats[node];
                        let right = GradStats {
                            g: total.g - split.left.g,
                            h: total.h - split.left.h,
                        };
                        let left_idx = nodes.len();
                        nodes.push(Node::Leaf { value: 0.0 });
                        nodes.push(Node::Leaf { value: 0.0 });
                        stats.push(split.left);
                        stats.push(right);
                        nodes[node] = Node::Split {
                            feature: split.feature,
                            threshold: split.threshold,
                            left: left_idx,
                            right: left_idx + 1,
                        };
                        next.push(left_idx);
                        next.push(left_idx + 1);
                    }
                    None => {
                        nodes[node] = Node::Leaf {
                            value: self.leaf_value(stats[node]),
                        };
                    }
                }
            }

            for (row, position) in positions.iter_mut().enumerate() {
                if let Some(node) = *position {
                    *position = match nodes[node] {
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => Some(if self.rows[row].as_ref()[feature] < threshold {
                            left
                        } else {
                            right
                        }),
                        Node::Leaf { .. } => None,
                    };
                }
            }
            frontier = next;
        }

        Tree { nodes }
    }

    fn find_splits(
        &self,
        positions: &[Option<usize>],
        stats: &[GradStats],
    ) -> Vec<Option<SplitCandidate>> {
        let mut best: Vec<Option<SplitCandidate>> = vec![None; stats.len()];
        let mut scans = vec![ScanState::default(); stats.len()];

        for (feature, order) in self.sorted.iter().enumerate() {
            scans.iter_mut().for_each(|s| *s = ScanState::default());

            for &row in order {
                let Some(node) = positions[row] else { continue };
                let x = self.rows[row].as_ref()[feature];
                let scan = &mut scans[node];

                if let Some(prev) = scan.last {
                    if x > prev {
                        if let Some(gain) = self.split_gain(stats[node], scan.acc) {
                            if best[node].map_or(true, |b| gain > b.gain) {
                                best[node] = Some(SplitCandidate {
                                    feature,
                                    threshold: prev + (x - prev) / 2.0,
                                    gain,
                                    left: scan.acc,
                                });
                            }
                        }
                    }
                }

                scan.acc.g += self.grad[row];
                scan.acc.h += self.hess[row];
                scan.last = Some(x);
            }
        }

        best
    }

    fn split_gain(&self, total: GradStats, left: GradStats) -> Option<f64> {
        let right = GradStats {
            g: total.g - left.g,
            h: total.h - left.h,
        };
        let mcw = self.params.min_child_weight;
        if left.h < mcw || right.h < mcw {
            return None;
        }

        let gain =
            0.5 * (self.score(left) + self.score(right) - self.score(total)) - self.params.gamma;
        (gain > MIN_SPLIT_GAIN).then_some(gain)
    }

    fn score(&self, s: GradStats) -> f64 {
        s.g * s.g / (s.h + self.params.lambda)
    }

    fn leaf_value(&self, s: GradStats) -> f64 {
        if s.h <= 0.0 {
            return 0.0;
        }
        -s.g / (s.h + self.params.lambda) * self.params.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let rows: Vec<Vec<f64>> = (0..40).map(|x| vec![x as f64, (x % 3) as f64]).collect();
        let labels = (0..40).map(|x| u8::from(x >= 20)).collect();
        (rows, labels)
    }

    #[test]
    fn test_learns_threshold() {
        let (rows, labels) = step_data();
        let booster = Booster::train(&rows, &labels, &BoosterParams::default()).unwrap();

        assert_eq!(booster.num_features(), 2);
        assert_eq!(booster.trees().len(), 100);
        assert_eq!(booster.predict_label(&[3.0, 0.0]), 0);
        assert_eq!(booster.predict_label(&[35.0, 1.0]), 1);
        assert!(booster.predict_margin(&[35.0, 1.0]) > booster.predict_margin(&[3.0, 1.0]));
    }

    #[test]
    fn test_split_threshold_is_midpoint() {
        let rows = vec![vec![0.0], vec![0.0], vec![1.0], vec![1.0]];
        let labels = vec![0, 0, 1, 1];
        let params = BoosterParams {
            n_estimators: 1,
            min_child_weight: 0.0,
            ..Default::default()
        };
        let booster = Booster::train(&rows, &labels, &params).unwrap();

        let tree = &booster.trees()[0];
        assert_eq!(tree.num_leaves(), 2);
        match tree.nodes[0] {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(feature, 0);
                assert_eq!(threshold, 0.5);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let (rows, labels) = step_data();
        let params = BoosterParams {
            max_depth: 2,
            n_estimators: 5,
            ..Default::default()
        };
        let booster = Booster::train(&rows, &labels, &params).unwrap();
        assert!(booster.trees().iter().all(|t| t.depth() <= 2));
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let rows = vec![vec![1.0]; 10];
        let labels: Vec<u8> = (0..10).map(|i| u8::from(i < 3)).collect();
        let booster = Booster::train(&rows, &labels, &BoosterParams::default()).unwrap();
        assert!(booster.trees().iter().all(|t| t.num_leaves() == 1));
    }

    #[test]
    fn test_positive_weight_shifts_decision() {
        // 3 positives vs 7 negatives on identical rows: unweighted the leaf
        // leans negative, weighted by the class ratio it leans positive.
        let rows = vec![vec![0.0]; 10];
        let labels: Vec<u8> = (0..10).map(|i| u8::from(i < 3)).collect();

        let plain = Booster::train(&rows, &labels, &BoosterParams::default()).unwrap();
        assert_eq!(plain.predict_label(&[0.0]), 0);

        let weighted = BoosterParams {
            scale_pos_weight: 7.0 / 3.0 + 0.5,
            ..Default::default()
        };
        let weighted = Booster::train(&rows, &labels, &weighted).unwrap();
        assert_eq!(weighted.predict_label(&[0.0]), 1);
    }

    #[test]
    fn test_seeded_subsample_is_deterministic() {
        let (rows, labels) = step_data();
        let params = BoosterParams {
            subsample: 0.5,
            n_estimators: 20,
            ..Default::default()
        };
        let a = Booster::train(&rows, &labels, &params).unwrap();
        let b = Booster::train(&rows, &labels, &params).unwrap();

        for row in &rows {
            assert_eq!(a.predict_margin(row), b.predict_margin(row));
        }
    }

    #[test]
    fn test_shape_errors() {
        let params = BoosterParams::default();
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            Booster::train(&empty, &[], &params),
            Err(InferenceError::InvalidInputShape { .. })
        ));

        let ragged = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(matches!(
            Booster::train(&ragged, &[0, 1], &params),
            Err(InferenceError::InvalidInputShape { .. })
        ));

        let rows = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            Booster::train(&rows, &[0], &params),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_params() {
        let (rows, labels) = step_data();
        let params = BoosterParams {
            subsample: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Booster::train(&rows, &labels, &params),
            Err(InferenceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_nan_params() {
        let (rows, labels) = step_data();
        let cases = [
            BoosterParams {
                learning_rate: f64::NAN,
                ..Default::default()
            },
            BoosterParams {
                base_score: f64::NAN,
                ..Default::default()
            },
            BoosterParams {
                subsample: f64::NAN,
                ..Default::default()
            },
            BoosterParams {
                scale_pos_weight: f64::NAN,
                ..Default::default()
            },
            BoosterParams {
                scale_pos_weight: f64::INFINITY,
                ..Default::default()
            },
            BoosterParams {
                lambda: f64::NAN,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(
                matches!(
                    Booster::train(&rows, &labels, &params),
                    Err(InferenceError::InvalidParameter(_))
                ),
                "{:?} should be rejected",
                params
            );
        }
    }
}
