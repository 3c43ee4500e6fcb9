use serde::Deserialize;

use crate::error::{ForecastError, Result};
use crate::inference::Regressor;
use crate::utils::constants::MODEL_SOURCE;

/// Objectives whose raw margin is already the prediction
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:pseudohubererror",
    "reg:absoluteerror",
];

#[derive(Debug, Deserialize)]
struct XgbDocument {
    learner: XgbLearner,
}

#[derive(Debug, Deserialize)]
struct XgbLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: XgbBooster,
    learner_model_param: XgbModelParam,
    objective: Option<XgbObjective>,
}

#[derive(Debug, Deserialize)]
struct XgbBooster {
    name: String,
    model: Option<XgbGbtreeModel>,
}

#[derive(Debug, Deserialize)]
struct XgbGbtreeModel {
    trees: Vec<XgbTree>,
}

#[derive(Debug, Deserialize)]
struct XgbModelParam {
    base_score: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct XgbObjective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct XgbTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
}

/// `default_left` is written as 0/1 by older XGBoost releases and as
/// booleans by newer ones
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    left: i32,
    right: i32,
    split_index: usize,
    // Split threshold for internal nodes, leaf value for leaves
    value: f64,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_xgb(tree: XgbTree, tree_index: usize, num_features: usize) -> Result<Self> {
        let len = tree.left_children.len();
        if len == 0
            || tree.right_children.len() != len
            || tree.split_indices.len() != len
            || tree.split_conditions.len() != len
            || tree.default_left.len() != len
        {
            return Err(ForecastError::load(
                MODEL_SOURCE,
                format!("tree {} has inconsistent node arrays", tree_index),
            ));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let (left, right) = (tree.left_children[i], tree.right_children[i]);
            let split_index = tree.split_indices[i] as usize;
            if left >= 0 {
                // children must follow their parent: no cycles
                let valid_child = |child: i32| child as usize > i && (child as usize) < len;
                if !valid_child(left) || !valid_child(right) || split_index >= num_features {
                    return Err(ForecastError::load(
                        MODEL_SOURCE,
                        format!("tree {} node {} has an invalid split", tree_index, i),
                    ));
                }
            }
            nodes.push(Node {
                left,
                right,
                split_index,
                value: tree.split_conditions[i],
                default_left: tree.default_left[i].is_set(),
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut index = 0usize;
        loop {
            let node = &self.nodes[index];
            if node.left < 0 {
                return node.value;
            }
            let value = features[node.split_index];
            let go_left = if value.is_nan() {
                node.default_left
            } else {
                // XGBoost evaluates splits in single precision
                (value as f32) < (node.value as f32)
            };
            let next = if go_left { node.left } else { node.right };
            index = next as usize;
        }
    }
}

/// Gradient-boosted regression trees loaded from an XGBoost JSON model
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    num_features: usize,
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: XgbDocument = serde_json::from_str(json).map_err(|e| {
            ForecastError::load(MODEL_SOURCE, format!("not an XGBoost JSON model: {}", e))
        })?;
        Self::from_document(document)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let document: XgbDocument = serde_json::from_value(value).map_err(|e| {
            ForecastError::load(MODEL_SOURCE, format!("not an XGBoost JSON model: {}", e))
        })?;
        Self::from_document(document)
    }

    fn from_document(document: XgbDocument) -> Result<Self> {
        let learner = document.learner;

        if let Some(objective) = &learner.objective {
            if !IDENTITY_OBJECTIVES.contains(&objective.name.as_str()) {
                return Err(ForecastError::load(
                    MODEL_SOURCE,
                    format!("unsupported objective '{}'", objective.name),
                ));
            }
        }

        let model = match (learner.gradient_booster.name.as_str(), learner.gradient_booster.model) {
            ("gbtree", Some(model)) => model,
            (name, _) => {
                return Err(ForecastError::load(
                    MODEL_SOURCE,
                    format!("unsupported booster '{}', expected gbtree", name),
                ))
            }
        };

        let num_features = learner
            .learner_model_param
            .num_feature
            .trim()
            .parse::<usize>()
            .map_err(|_| {
                ForecastError::load(
                    MODEL_SOURCE,
                    format!(
                        "invalid num_feature '{}'",
                        learner.learner_model_param.num_feature
                    ),
                )
            })?;
        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;

        if !learner.feature_names.is_empty() && learner.feature_names.len() != num_features {
            return Err(ForecastError::load(
                MODEL_SOURCE,
                format!(
                    "model names {} features but declares num_feature = {}",
                    learner.feature_names.len(),
                    num_features
                ),
            ));
        }

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| Tree::from_xgb(tree, index, num_features))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            feature_names: learner.feature_names,
            num_features,
            base_score,
            trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}

impl Regressor for TreeEnsemble {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.feature_names.is_empty() {
            None
        } else {
            Some(&self.feature_names)
        }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.leaf_value(features))
    }
}

/// `base_score` is a string such as "2.6E1", or "[2.6E1]" since XGBoost 2.1
fn parse_base_score(raw: &str) -> Result<f64> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ForecastError::load(MODEL_SOURCE, format!("invalid base_score '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TREE_MODEL: &str = r#"{
        "learner": {
            "feature_names": ["t2m", "rh"],
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "trees": [
                        {
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [0, 0, 0],
                            "split_conditions": [25.0, -1.5, 2.0],
                            "default_left": [1, 0, 0]
                        },
                        {
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [1, 0, 0],
                            "split_conditions": [80.0, 0.25, -0.25],
                            "default_left": [false, false, false]
                        }
                    ]
                }
            },
            "learner_model_param": {"base_score": "[2.6E1]", "num_feature": "2"},
            "objective": {"name": "reg:squarederror"}
        },
        "version": [2, 1, 0]
    }"#;

    #[test]
    fn test_tree_ensemble_prediction() {
        let model = TreeEnsemble::from_json_str(TWO_TREE_MODEL).unwrap();

        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.num_features(), 2);
        assert_eq!(model.base_score(), 26.0);

        // left in tree 0, left in tree 1
        assert_eq!(model.predict(&[20.0, 70.0]), 26.0 - 1.5 + 0.25);
        // right in tree 0, right in tree 1
        assert_eq!(model.predict(&[30.0, 90.0]), 26.0 + 2.0 - 0.25);
        // split threshold goes right
        assert_eq!(model.predict(&[25.0, 80.0]), 26.0 + 2.0 - 0.25);
        // NaN follows default_left
        assert_eq!(model.predict(&[f64::NAN, f64::NAN]), 26.0 - 1.5 - 0.25);
    }

    #[test]
    fn test_parse_base_score_variants() {
        assert_eq!(parse_base_score("5E-1").unwrap(), 0.5);
        assert_eq!(parse_base_score("[2.6E1]").unwrap(), 26.0);
        assert!(parse_base_score("[]").is_err());
    }

    #[test]
    fn test_unsupported_objective_is_rejected() {
        let json = TWO_TREE_MODEL.replace("reg:squarederror", "binary:logistic");
        let result = TreeEnsemble::from_json_str(&json);
        assert!(matches!(result, Err(ForecastError::Load { .. })));
    }

    #[test]
    fn test_out_of_range_split_index_is_rejected() {
        let json = TWO_TREE_MODEL.replace("\"split_indices\": [1, 0, 0]", "\"split_indices\": [7, 0, 0]");
        let result = TreeEnsemble::from_json_str(&json);
        assert!(matches!(result, Err(ForecastError::Load { .. })));
    }
}
