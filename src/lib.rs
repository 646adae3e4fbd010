mod label_map;

// Modules
pub mod branch;
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod forest;
pub mod histogram;
pub mod impact;
pub mod outcome;
pub mod sampler;
pub mod splitter;
pub mod tree;
pub mod utils;
pub mod variance;

// Individual classes, and functions
pub use config::{ForestConfig, ForestIO, TreeMode};
pub use data::{Column, ColumnKind, Dataset, Value};
pub use errors::SplitwiseError;
pub use forest::{build_forest, ForestBuilder, ForestResult, TreeForest};
pub use label_map::LabelMap;
pub use outcome::Outcome;
pub use sampler::Selections;
pub use tree::{construct_tree, LeafReason, PathStep, TreeBuilder, TreeNode};
