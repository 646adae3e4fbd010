//! Tree
//!
//! Recursive construction of one explanatory tree for one outcome.
use crate::branch::{build_branches, Branch};
use crate::constants::VARIANCE_DECIMALS;
use crate::data::{Dataset, Value};
use crate::errors::SplitwiseError;
use crate::label_map::LabelMap;
use crate::outcome::Outcome;
use crate::splitter::select_best_column;
use crate::utils::round_to;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Why construction stopped at a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafReason {
    /// Every explanatory column has already been used on this path.
    NoExplanatoryColumnsLeft,
    /// The selector returned no column.
    NoValidColumnFound,
    /// The subset reaching this point is smaller than the population threshold.
    InsufficientPopulation { threshold: usize, actual: usize },
}

impl Display for LeafReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LeafReason::NoExplanatoryColumnsLeft => write!(f, "No explanatory columns left"),
            LeafReason::NoValidColumnFound => write!(f, "No valid explanatory column found"),
            LeafReason::InsufficientPopulation { threshold, actual } => {
                write!(f, "Branch stopped, insufficient population ({} < {})", actual, threshold)
            }
        }
    }
}

/// One step of the path leading to a node. The step naming the node's own
/// variable has no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PathStep {
    pub fn split(variable: impl Into<String>, value: Value) -> Self {
        PathStep {
            variable: variable.into(),
            value: Some(value),
        }
    }

    pub fn variable(variable: impl Into<String>) -> Self {
        PathStep {
            variable: variable.into(),
            value: None,
        }
    }
}

/// A node of an explanatory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        reason: LeafReason,
    },
    Node {
        /// Column the node splits on.
        variable: String,
        /// Variance score of `variable`, rounded to four decimals.
        variance: f64,
        branches: LabelMap<Branch>,
        path: Vec<PathStep>,
    },
}

impl TreeNode {
    pub fn leaf(reason: LeafReason) -> Self {
        TreeNode::Leaf { reason }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Number of split levels below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Node { branches, .. } => {
                1 + branches
                    .values()
                    .filter_map(|b| b.subtree.as_deref())
                    .map(TreeNode::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Number of split nodes.
    pub fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Node { branches, .. } => {
                1 + branches
                    .values()
                    .filter_map(|b| b.subtree.as_deref())
                    .map(TreeNode::n_nodes)
                    .sum::<usize>()
            }
        }
    }

    /// Number of terminal points. A branch without a subtree counts as one.
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Node { branches, .. } => branches
                .values()
                .map(|b| b.subtree.as_deref().map_or(1, TreeNode::n_leaves))
                .sum(),
        }
    }

    fn write_outline(&self, out: &mut String, level: usize) {
        let indent = "    ".repeat(level);
        match self {
            TreeNode::Leaf { reason } => {
                out.push_str(&format!("{}[leaf] {}\n", indent, reason));
            }
            TreeNode::Node {
                variable,
                variance,
                branches,
                ..
            } => {
                out.push_str(&format!("{}{} (std dev: {})\n", indent, variable, variance));
                for (label, b) in branches.iter() {
                    out.push_str(&format!(
                        "{}  {}: {}/{} ({}%)\n",
                        indent, label, b.count, b.total, b.percentage
                    ));
                    if let Some(subtree) = b.subtree.as_deref() {
                        subtree.write_outline(out, level + 1);
                    }
                }
            }
        }
    }
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = String::new();
        self.write_outline(&mut r, 0);
        write!(f, "{}", r)
    }
}

/// Builds trees with a fixed stopping configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeBuilder {
    min_population_threshold: Option<usize>,
    max_depth: usize,
}

impl TreeBuilder {
    /// * `min_population_threshold` - Subsets smaller than this stop with an
    ///   explicit leaf. `Some(0)` means no limit.
    /// * `max_depth` - Recursion limit. Each level consumes a column, so
    ///   exceeding it means the column bookkeeping is broken.
    pub fn new(min_population_threshold: Option<usize>, max_depth: usize) -> Self {
        TreeBuilder {
            min_population_threshold: min_population_threshold.filter(|&t| t > 0),
            max_depth,
        }
    }

    /// A builder whose depth limit is derived from the explanatory columns.
    pub fn for_columns<S: AsRef<str>>(columns: &[S], min_population_threshold: Option<usize>) -> Self {
        TreeBuilder::new(min_population_threshold, columns.len() + 1)
    }

    pub fn min_population_threshold(&self) -> Option<usize> {
        self.min_population_threshold
    }

    /// Construct the tree explaining `outcome` in `data`.
    ///
    /// * `available` - Explanatory columns still usable, in priority order.
    /// * `path` - Steps that led to `data`, empty for a root.
    pub fn construct<S: AsRef<str>>(
        &self,
        data: &Dataset,
        outcome: &Outcome,
        available: &[S],
        path: &[PathStep],
    ) -> Result<TreeNode, SplitwiseError> {
        let available: Vec<String> = available.iter().map(|c| c.as_ref().to_string()).collect();
        self.construct_at(data, outcome, &available, path.to_vec(), 0)
    }

    fn construct_at(
        &self,
        data: &Dataset,
        outcome: &Outcome,
        available: &[String],
        path: Vec<PathStep>,
        depth: usize,
    ) -> Result<TreeNode, SplitwiseError> {
        if depth > self.max_depth {
            return Err(SplitwiseError::MaxDepthExceeded(self.max_depth));
        }
        if available.is_empty() {
            return Ok(TreeNode::leaf(LeafReason::NoExplanatoryColumnsLeft));
        }
        let Some(best) = select_best_column(data, available, outcome) else {
            return Ok(TreeNode::leaf(LeafReason::NoValidColumnFound));
        };

        let branches = build_branches(data, &best.column, outcome)?;
        let remaining: Vec<String> = available.iter().filter(|c| **c != best.column).cloned().collect();

        let mut built = LabelMap::with_capacity(branches.len());
        for (label, mut branch) in branches {
            if branch.total > 0 {
                let subset = data.filter_eq(&best.column, &branch.value)?;
                branch.subtree = self.grow_branch(&subset, outcome, &remaining, &path, &best.column, &branch, depth)?;
            }
            built.insert(label, branch);
        }

        let mut node_path = path;
        node_path.push(PathStep::variable(best.column.as_str()));
        Ok(TreeNode::Node {
            variable: best.column,
            variance: round_to(best.score, VARIANCE_DECIMALS),
            branches: built,
            path: node_path,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn grow_branch(
        &self,
        subset: &Dataset,
        outcome: &Outcome,
        remaining: &[String],
        path: &[PathStep],
        variable: &str,
        branch: &Branch,
        depth: usize,
    ) -> Result<Option<Box<TreeNode>>, SplitwiseError> {
        if subset.is_empty() || remaining.is_empty() {
            return Ok(None);
        }
        if let Some(threshold) = self.min_population_threshold {
            if subset.row_count() < threshold {
                debug!(
                    "Stopping branch {}={} with {} rows, below threshold {}",
                    variable,
                    branch.value,
                    subset.row_count(),
                    threshold
                );
                return Ok(Some(Box::new(TreeNode::leaf(LeafReason::InsufficientPopulation {
                    threshold,
                    actual: subset.row_count(),
                }))));
            }
        }
        let mut child_path = path.to_vec();
        child_path.push(PathStep::split(variable, branch.value.clone()));
        let child = self.construct_at(subset, outcome, remaining, child_path, depth + 1)?;
        Ok(Some(Box::new(child)))
    }
}

/// Construct a single tree, see [`TreeBuilder::construct`].
pub fn construct_tree<S: AsRef<str>>(
    data: &Dataset,
    outcome: &Outcome,
    available: &[S],
    path: &[PathStep],
    min_population_threshold: Option<usize>,
) -> Result<TreeNode, SplitwiseError> {
    TreeBuilder::for_columns(available, min_population_threshold).construct(data, outcome, available, path)
}
