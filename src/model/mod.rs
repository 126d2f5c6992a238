//! Model artifact handling
//!
//! - Artifact format and serializer metadata
//! - Classifier inference kernels
//! - Loading with version and shape validation

pub mod artifact;
pub mod classifier;
pub mod loader;

pub use artifact::{ModelArtifact, SerializerInfo, SERIALIZER_VERSION, SUPPORTED_FORMAT_VERSION};
pub use classifier::{Classifier, ClassifierSpec, DecisionTree, TreeNode};
pub use loader::{LoadedModel, ModelLoader, VersionPolicy, VersionSkew};
