pub mod artifact;
pub mod engine;
pub mod linear;
pub mod regressor;
pub mod tree_ensemble;

pub use artifact::ModelArtifact;
pub use engine::{FeatureProjection, InferenceEngine, InferenceOutcome};
pub use linear::LinearModel;
pub use regressor::Regressor;
pub use tree_ensemble::TreeEnsemble;
