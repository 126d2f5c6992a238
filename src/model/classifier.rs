//! Inference kernels for the classifier families an artifact may carry
//!
//! Every kernel maps a dense feature slice onto one probability per class.
//! Kernels never mutate their parameters, so a loaded classifier can be
//! shared freely across requests.

use serde::{Deserialize, Serialize};

/// Common interface of all classifier families
pub trait Classifier {
    /// Short identifier of the classifier family
    fn kind(&self) -> &'static str;

    /// Class probabilities for one feature vector, in class-index order
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    /// Check internal shapes against the artifact's feature and class counts
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String>;
}

/// Serialized classifier parameters, tagged by family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Multinomial logistic regression: one coefficient row per class
    LogisticRegression {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },

    /// Bernoulli naive Bayes over binary features
    BernoulliNaiveBayes {
        class_log_prior: Vec<f64>,
        /// P(feature present | class), one row per class
        feature_prob: Vec<Vec<f64>>,
        #[serde(default = "default_binarize")]
        binarize: f64,
    },

    /// Single CART decision tree
    DecisionTree(DecisionTree),

    /// Bagged ensemble of decision trees; probabilities are averaged
    RandomForest { trees: Vec<DecisionTree> },
}

fn default_binarize() -> f64 {
    0.5
}

/// Flattened decision tree; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// A decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go left when `features[feature] <= threshold`, right otherwise
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class sample weights reaching this leaf
    Leaf { value: Vec<f64> },
}

impl DecisionTree {
    fn leaf_for(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if x <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn proba(&self, features: &[f64]) -> Vec<f64> {
        let value = self.leaf_for(features);
        let total: f64 = value.iter().sum();
        value.iter().map(|v| v / total).collect()
    }

    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but only {} features exist",
                            i, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", i));
                    }
                    // Children strictly after their parent rules out cycles.
                    for child in [left, right] {
                        if *child <= i || *child >= len {
                            return Err(format!("node {} has invalid child index {}", i, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} class weights, expected {}",
                            i,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite weight", i));
                    }
                    let total: f64 = value.iter().sum();
                    if !total.is_finite() {
                        return Err(format!("leaf {} weights overflow when summed", i));
                    }
                    if total <= 0.0 {
                        return Err(format!("leaf {} carries no weight", i));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Numerically stable softmax
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn check_matrix(name: &str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Result<(), String> {
    if rows.len() != n_rows {
        return Err(format!("{} has {} rows, expected {}", name, rows.len(), n_rows));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(format!(
                "{} row {} has {} columns, expected {}",
                name,
                i,
                row.len(),
                n_cols
            ));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(format!("{} row {} contains non-finite values", name, i));
        }
    }
    Ok(())
}

impl Classifier for ClassifierSpec {
    fn kind(&self) -> &'static str {
        match self {
            ClassifierSpec::LogisticRegression { .. } => "logistic_regression",
            ClassifierSpec::BernoulliNaiveBayes { .. } => "bernoulli_naive_bayes",
            ClassifierSpec::DecisionTree(_) => "decision_tree",
            ClassifierSpec::RandomForest { .. } => "random_forest",
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        match self {
            ClassifierSpec::LogisticRegression {
                coefficients,
                intercepts,
            } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, b)| b + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>())
                    .collect();
                softmax(&scores)
            }
            ClassifierSpec::BernoulliNaiveBayes {
                class_log_prior,
                feature_prob,
                binarize,
            } => {
                let joint: Vec<f64> = class_log_prior
                    .iter()
                    .zip(feature_prob)
                    .map(|(prior, probs)| {
                        prior
                            + probs
                                .iter()
                                .zip(features)
                                .map(|(p, x)| if *x > *binarize { p.ln() } else { (1.0 - p).ln() })
                                .sum::<f64>()
                    })
                    .collect();
                softmax(&joint)
            }
            ClassifierSpec::DecisionTree(tree) => tree.proba(features),
            ClassifierSpec::RandomForest { trees } => {
                let mut acc: Vec<f64> = Vec::new();
                for tree in trees {
                    let p = tree.proba(features);
                    if acc.is_empty() {
                        acc = vec![0.0; p.len()];
                    }
                    for (a, v) in acc.iter_mut().zip(p) {
                        *a += v;
                    }
                }
                let n = trees.len() as f64;
                acc.into_iter().map(|a| a / n).collect()
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if n_classes == 0 {
            return Err("artifact declares no classes".to_string());
        }
        match self {
            ClassifierSpec::LogisticRegression {
                coefficients,
                intercepts,
            } => {
                check_matrix("coefficients", coefficients, n_classes, n_features)?;
                if intercepts.len() != n_classes {
                    return Err(format!(
                        "intercepts has {} entries, expected {}",
                        intercepts.len(),
                        n_classes
                    ));
                }
                Ok(())
            }
            ClassifierSpec::BernoulliNaiveBayes {
                class_log_prior,
                feature_prob,
                ..
            } => {
                if class_log_prior.len() != n_classes {
                    return Err(format!(
                        "class_log_prior has {} entries, expected {}",
                        class_log_prior.len(),
                        n_classes
                    ));
                }
                check_matrix("feature_prob", feature_prob, n_classes, n_features)?;
                if feature_prob.iter().flatten().any(|p| *p <= 0.0 || *p >= 1.0) {
                    return Err("feature_prob values must lie strictly between 0 and 1".to_string());
                }
                Ok(())
            }
            ClassifierSpec::DecisionTree(tree) => tree.check(n_features, n_classes),
            ClassifierSpec::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(n_features, n_classes)
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                }
                Ok(())
            }
        }
    }
}
