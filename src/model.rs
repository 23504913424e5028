use std::fmt;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FeatureRecord};

/// Class labels as the classifier was trained: 0 = batting side loses, 1 = batting side wins.
pub const CLASSES: [i64; 2] = [0, 1];
pub const WIN_CLASS: i64 = 1;
/// Column of the win class in a probability row.
pub const WIN_CLASS_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelVerdict {
    /// Probability mass on the win class, in [0, 1].
    WinProbability(f64),
    /// Hard class label from a model without probability output.
    Label(i64),
}

/// A loaded classifier. Implementations either emit a win probability or a hard label.
pub trait WinModel: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn predict(&self, record: &FeatureRecord) -> Result<ModelVerdict>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LinearArtifact),
    DecisionTree(DecisionTreeArtifact),
    LinearSvc(LinearArtifact),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_means: Vec<f64>,
    #[serde(default)]
    pub feature_stds: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub classes: Vec<i64>,
    #[serde(default)]
    pub trained_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub nodes: Vec<TreeNode>,
    #[serde(default)]
    pub trained_at: Option<String>,
}

/// Split nodes send `x[feature] <= threshold` to `left`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

impl ModelArtifact {
    pub fn trained_at(&self) -> Option<&str> {
        match self {
            ModelArtifact::LogisticRegression(a) | ModelArtifact::LinearSvc(a) => {
                a.trained_at.as_deref()
            }
            ModelArtifact::DecisionTree(a) => a.trained_at.as_deref(),
        }
    }

    pub fn into_model(self) -> Result<Box<dyn WinModel>, String> {
        match self {
            ModelArtifact::LogisticRegression(a) => {
                Ok(Box::new(LogisticModel::from_artifact(a)?))
            }
            ModelArtifact::DecisionTree(a) => Ok(Box::new(DecisionTreeModel::from_artifact(a)?)),
            ModelArtifact::LinearSvc(a) => Ok(Box::new(LinearSvcModel::from_artifact(a)?)),
        }
    }
}

#[derive(Debug, Clone)]
struct LinearTerms {
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LinearTerms {
    fn from_artifact(a: &LinearArtifact) -> Result<Self, String> {
        check_schema(&a.feature_names, &a.classes)?;
        let coefficients = fixed_len("coefficients", &a.coefficients)?;
        let means = if a.feature_means.is_empty() {
            [0.0; FEATURE_COUNT]
        } else {
            fixed_len("feature_means", &a.feature_means)?
        };
        let stds = if a.feature_stds.is_empty() {
            [1.0; FEATURE_COUNT]
        } else {
            fixed_len("feature_stds", &a.feature_stds)?
        };
        if let Some(idx) = stds.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(format!("feature_stds[{idx}] must be finite and positive"));
        }
        if !a.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        Ok(Self {
            means,
            stds,
            coefficients,
            intercept: a.intercept,
        })
    }

    fn decision(&self, record: &FeatureRecord) -> f64 {
        let row = record.as_row();
        let mut sum = self.intercept;
        for (idx, x) in row.iter().enumerate() {
            sum += self.coefficients[idx] * (x - self.means[idx]) / self.stds[idx];
        }
        sum
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    terms: LinearTerms,
}

impl LogisticModel {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, String> {
        Ok(Self {
            terms: LinearTerms::from_artifact(&artifact)?,
        })
    }

    pub fn predict_proba(&self, record: &FeatureRecord) -> [f64; 2] {
        let p_win = sigmoid(self.terms.decision(record));
        [1.0 - p_win, p_win]
    }
}

impl WinModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict(&self, record: &FeatureRecord) -> Result<ModelVerdict> {
        let proba = self.predict_proba(record);
        Ok(ModelVerdict::WinProbability(proba[WIN_CLASS_INDEX]))
    }
}

#[derive(Debug, Clone)]
pub struct LinearSvcModel {
    terms: LinearTerms,
}

impl LinearSvcModel {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, String> {
        Ok(Self {
            terms: LinearTerms::from_artifact(&artifact)?,
        })
    }
}

impl WinModel for LinearSvcModel {
    fn kind(&self) -> &'static str {
        "linear_svc"
    }

    fn predict(&self, record: &FeatureRecord) -> Result<ModelVerdict> {
        let score = self.terms.decision(record);
        if !score.is_finite() {
            return Err(anyhow!("decision function is not finite"));
        }
        let label = if score > 0.0 { CLASSES[1] } else { CLASSES[0] };
        Ok(ModelVerdict::Label(label))
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTreeModel {
    nodes: Vec<TreeNode>,
}

impl DecisionTreeModel {
    pub fn from_artifact(artifact: DecisionTreeArtifact) -> Result<Self, String> {
        check_schema(&artifact.feature_names, &artifact.classes)?;
        if artifact.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let n = artifact.nodes.len();
        for (idx, node) in artifact.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {idx}: feature {feature} out of range"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx}: threshold is not finite"));
                    }
                    // Children must come after their parent, which also rules out cycles.
                    for child in [*left, *right] {
                        if child <= idx || child >= n {
                            return Err(format!("node {idx}: child {child} out of range"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0)
                        || !total.is_finite()
                        || total <= 0.0
                    {
                        return Err(format!(
                            "node {idx}: leaf counts must be non-negative with a finite positive sum"
                        ));
                    }
                }
            }
        }
        Ok(Self {
            nodes: artifact.nodes,
        })
    }

    pub fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2]> {
        let row = record.as_row();
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total = value[0] + value[1];
                    return Ok([value[0] / total, value[1] / total]);
                }
                None => return Err(anyhow!("tree walk reached missing node {idx}")),
            }
        }
    }
}

impl WinModel for DecisionTreeModel {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn predict(&self, record: &FeatureRecord) -> Result<ModelVerdict> {
        let proba = self.predict_proba(record)?;
        Ok(ModelVerdict::WinProbability(proba[WIN_CLASS_INDEX]))
    }
}

fn check_schema(feature_names: &[String], classes: &[i64]) -> Result<(), String> {
    let names_match = feature_names.len() == FEATURE_COUNT
        && feature_names
            .iter()
            .zip(FEATURE_NAMES)
            .all(|(got, want)| got == want);
    if !names_match {
        return Err(format!(
            "feature_names {:?} do not match expected {:?}",
            feature_names, FEATURE_NAMES
        ));
    }
    if classes != CLASSES {
        return Err(format!("classes {classes:?} must be {CLASSES:?}"));
    }
    Ok(())
}

fn fixed_len(field: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], String> {
    let arr: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        format!(
            "{field} has {} values, expected {FEATURE_COUNT}",
            values.len()
        )
    })?;
    if arr.iter().any(|v| !v.is_finite()) {
        return Err(format!("{field} contains a non-finite value"));
    }
    Ok(arr)
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
