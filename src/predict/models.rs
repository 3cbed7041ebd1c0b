//! Regression model families
//!
//! Four small estimators over plain `Vec<f64>` rows: ridge regression by
//! normal equations, k-nearest-neighbours on z-scored features, a
//! depth-limited regression tree, and gradient boosting over shallow trees.
//! Every `fit` returns `None` on degenerate input (empty matrix, mismatched
//! lengths, singular system) instead of panicking.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-column z-scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &[Vec<f64>]) -> Self {
        let Some(first) = x.first() else {
            return Self {
                means: Vec::new(),
                stds: Vec::new(),
            };
        };
        let d = first.len();
        let n = x.len() as f64;
        let mut means = vec![0.0; d];
        for row in x {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }
        let mut stds = vec![0.0; d];
        for row in x {
            for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                let delta = value - mean;
                *std += delta * delta;
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
        }
        Self { means, stds }
    }

    /// Columns with zero variance transform to 0.0
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| {
                if *std == 0.0 {
                    0.0
                } else {
                    (value - mean) / std
                }
            })
            .collect()
    }
}

/// Ridge regression fit by normal equations
///
/// The L2 penalty sits on the feature weights only, never on the intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub lambda: f64,
}

impl RidgeRegression {
    pub fn fit(x: &[Vec<f64>], y: &[f64], lambda: f64) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        let d = x[0].len();
        let dim = d + 1; // last index is the intercept

        let mut a = vec![vec![0.0; dim]; dim];
        let mut b = vec![0.0; dim];
        for (row, &target) in x.iter().zip(y) {
            if row.len() != d {
                return None;
            }
            for i in 0..d {
                for j in 0..d {
                    a[i][j] += row[i] * row[j];
                }
                a[i][d] += row[i];
                a[d][i] += row[i];
                b[i] += row[i] * target;
            }
            a[d][d] += 1.0;
            b[d] += target;
        }
        for i in 0..d {
            a[i][i] += lambda;
        }

        let solution = solve_linear_system(a, b)?;
        let intercept = solution[d];
        let weights = solution[..d].to_vec();
        Some(Self {
            weights,
            intercept,
            lambda,
        })
    }

    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

/// Gauss-Jordan elimination with partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-10 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let divisor = a[col][col];
        for value in &mut a[col][col..] {
            *value /= divisor;
        }
        b[col] /= divisor;

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                let pivot_value = a[col][j];
                a[row][j] -= factor * pivot_value;
            }
            b[row] -= factor * b[col];
        }
    }
    Some(b)
}

/// k-nearest-neighbours regression on z-scored features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    pub k: usize,
    pub scaler: StandardScaler,
    pub train_x: Vec<Vec<f64>>,
    pub train_y: Vec<f64>,
}

impl KNeighborsRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], k: usize) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() || k == 0 {
            return None;
        }
        let scaler = StandardScaler::fit(x);
        let train_x = x.iter().map(|row| scaler.transform_row(row)).collect();
        Some(Self {
            k,
            scaler,
            train_x,
            train_y: y.to_vec(),
        })
    }

    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let query = self.scaler.transform_row(row);
        let mut nearest: SmallVec<[(f64, f64); 16]> = SmallVec::new();
        for (train_row, &target) in self.train_x.iter().zip(&self.train_y) {
            let distance: f64 = train_row
                .iter()
                .zip(&query)
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            let position = nearest
                .iter()
                .position(|(d, _)| distance < *d)
                .unwrap_or(nearest.len());
            if position < self.k {
                nearest.insert(position, (distance, target));
                nearest.truncate(self.k);
            }
        }
        if nearest.is_empty() {
            return 0.0;
        }
        nearest.iter().map(|(_, t)| t).sum::<f64>() / nearest.len() as f64
    }
}

/// A node of the regression tree arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
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

/// Depth-limited CART regression tree with variance-minimizing splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    pub nodes: Vec<TreeNode>,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl DecisionTreeRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], max_depth: usize, min_samples_split: usize) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        let mut tree = Self {
            nodes: Vec::new(),
            max_depth,
            min_samples_split,
        };
        let indices: Vec<usize> = (0..x.len()).collect();
        tree.build_node(x, y, indices, 0);
        Some(tree)
    }

    fn build_node(&mut self, x: &[Vec<f64>], y: &[f64], indices: Vec<usize>, depth: usize) -> usize {
        let value = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value });

        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return id;
        }
        let Some((feature, threshold)) = best_split(x, y, &indices) else {
            return id;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][feature] <= threshold);
        let left = self.build_node(x, y, left_indices, depth + 1);
        let right = self.build_node(x, y, right_indices, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Pick the (feature, threshold) pair minimizing the summed squared error of
/// the two sides; `None` when no split improves on the node itself
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let sum_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = sum_sq - sum * sum / n;

    let n_features = x[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..n_features {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (position, &idx) in order.iter().enumerate().take(order.len() - 1) {
            left_sum += y[idx];
            left_sq += y[idx] * y[idx];

            let here = x[idx][feature];
            let next = x[order[position + 1]][feature];
            if here == next {
                continue;
            }

            let n_left = (position + 1) as f64;
            let n_right = n - n_left;
            let right_sum = sum - left_sum;
            let right_sq = sum_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left)
                + (right_sq - right_sum * right_sum / n_right);
            if best.is_none_or(|(_, _, best_sse)| sse < best_sse) {
                best = Some((feature, (here + next) / 2.0, sse));
            }
        }
    }

    best.and_then(|(feature, threshold, sse)| {
        if sse < parent_sse - 1e-12 {
            Some((feature, threshold))
        } else {
            None
        }
    })
}

/// Gradient boosting: shrinkage-weighted shallow trees over residuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub base: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTreeRegressor>,
}

impl GradientBoostingRegressor {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_estimators: usize,
        learning_rate: f64,
        max_depth: usize,
    ) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() || n_estimators == 0 {
            return None;
        }
        let base = y.iter().sum::<f64>() / y.len() as f64;
        let mut residuals: Vec<f64> = y.iter().map(|target| target - base).collect();
        let mut trees = Vec::with_capacity(n_estimators);

        for _ in 0..n_estimators {
            let tree = DecisionTreeRegressor::fit(x, &residuals, max_depth, 10)?;
            for (residual, row) in residuals.iter_mut().zip(x) {
                *residual -= learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        Some(Self {
            base,
            learning_rate,
            trees,
        })
    }

    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.base
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_a_small_system() {
        // 2x + y = 5, x + 3y = 10
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let solution = solve_linear_system(a, b).unwrap();
        assert!((solution[0] - 1.0).abs() < 1e-9);
        assert!((solution[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn singular_systems_are_rejected() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![1.0, 2.0];
        assert!(solve_linear_system(a, b).is_none());
    }

    #[test]
    fn scaler_zeroes_constant_columns() {
        let x = vec![vec![5.0, 1.0], vec![5.0, 3.0]];
        let scaler = StandardScaler::fit(&x);
        let row = scaler.transform_row(&[5.0, 2.0]);
        assert_eq!(row[0], 0.0);
    }
}

/// A trained model of any family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    Ridge(RidgeRegression),
    KNeighbors(KNeighborsRegressor),
    DecisionTree(DecisionTreeRegressor),
    GradientBoosting(GradientBoostingRegressor),
}

impl TrainedModel {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ridge(_) => "Ridge",
            Self::KNeighbors(_) => "KNeighbors",
            Self::DecisionTree(_) => "DecisionTree",
            Self::GradientBoosting(_) => "GradientBoosting",
        }
    }

    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            Self::Ridge(model) => model.predict_row(row),
            Self::KNeighbors(model) => model.predict_row(row),
            Self::DecisionTree(model) => model.predict_row(row),
            Self::GradientBoosting(model) => model.predict_row(row),
        }
    }
}
