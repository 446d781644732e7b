use serde::{Deserialize, Serialize};

/// Minimum SSE decrease for a split to be kept.
const MIN_IMPROVEMENT: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
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

/// CART regression tree with a squared-error criterion, stored as a node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Normalized impurity decrease per feature.
    importances: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<Node>,
    decrease: Vec<f64>,
}

impl DecisionTree {
    /// Fits on the rows listed in `samples`. Indices may repeat (bootstrap draws).
    pub fn fit(x: &[Vec<f64>], y: &[f64], samples: &[usize], params: &TreeParams) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut builder = Builder {
            x,
            y,
            params,
            nodes: Vec::new(),
            decrease: vec![0.0; n_features],
        };

        let mut indices = samples.to_vec();
        if indices.is_empty() {
            builder.nodes.push(Node::Leaf { value: 0.0 });
        } else {
            builder.grow(&mut indices, 0);
        }

        Self {
            nodes: builder.nodes,
            importances: normalize(builder.decrease),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Builder<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let (sum, sum_sq) = sums(self.y, indices);
        let n = indices.len() as f64;
        let mean = sum / n;
        let sse = (sum_sq - sum * sum / n).max(0.0);

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || indices.len() < self.params.min_samples_split || sse <= MIN_IMPROVEMENT {
            return node_id;
        }

        let Some(split) = self.best_split(indices, sse) else {
            return node_id;
        };

        let (feature, threshold) = (split.feature, split.threshold);
        let x = self.x;
        let mid = partition(indices, |i| x[i][feature] <= threshold);
        if mid == 0 || mid == indices.len() {
            return node_id;
        }

        self.decrease[feature] += split.improvement;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.grow(left_indices, depth + 1);
        let right = self.grow(right_indices, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&self, indices: &[usize], parent_sse: f64) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        if n < 2 * min_leaf {
            return None;
        }

        let (total_sum, total_sq) = sums(self.y, indices);
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..self.decrease.len() {
            sorted.sort_by(|a, b| self.x[*a][feature].total_cmp(&self.x[*b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 1..n {
                let prev = sorted[pos - 1];
                left_sum += self.y[prev];
                left_sq += self.y[prev] * self.y[prev];

                if pos < min_leaf || n - pos < min_leaf {
                    continue;
                }
                let lo = self.x[prev][feature];
                let hi = self.x[sorted[pos]][feature];
                if hi <= lo {
                    continue;
                }

                let left_n = pos as f64;
                let right_n = (n - pos) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = (left_sq - left_sum * left_sum / left_n).max(0.0);
                let right_sse = (right_sq - right_sum * right_sum / right_n).max(0.0);
                let improvement = parent_sse - left_sse - right_sse;

                let better = best
                    .as_ref()
                    .map_or(true, |current| improvement > current.improvement);
                if improvement > MIN_IMPROVEMENT && better {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        improvement,
                    });
                }
            }
        }

        best
    }
}

fn sums(y: &[f64], indices: &[usize]) -> (f64, f64) {
    indices.iter().fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]))
}

/// Moves every index satisfying `pred` to the front and returns how many did.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..indices.len() {
        if pred(indices[i]) {
            indices.swap(mid, i);
            mid += 1;
        }
    }
    mid
}

/// Scales to sum 1. An all-zero vector stays zero.
pub(crate) fn normalize(mut values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 && total.is_finite() {
        for v in &mut values {
            *v /= total;
        }
    }
    values
}
