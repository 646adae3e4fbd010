//! Forest
//!
//! Drives tree construction over every requested outcome, after restricting
//! the data to the selected sample.
use crate::config::{ForestConfig, ForestIO, TreeMode};
use crate::constants::{COMBINED_LABEL_SEPARATOR, COMBINED_TARGET_COLUMN, COMBINED_TREE_LABEL};
use crate::data::{Column, Dataset, Value};
use crate::errors::SplitwiseError;
use crate::impact::{analyze_filtering_impact, FilteringReport};
use crate::label_map::LabelMap;
use crate::outcome::Outcome;
use crate::sampler::{value_set, Sampler, SelectionSampler, Selections};
use crate::tree::{TreeBuilder, TreeNode};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Outcome group label, then outcome value label, to tree.
pub type TreeForest = LabelMap<LabelMap<TreeNode>>;

/// Everything produced by one forest-building call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestResult {
    pub forest: TreeForest,
    pub filtered_sample_size: usize,
    pub original_sample_size: usize,
    pub filtering_report: FilteringReport,
    pub explanatory_columns: Vec<String>,
    pub outcome_columns: Vec<String>,
    pub mode: TreeMode,
}

impl ForestIO for ForestResult {}

impl Display for ForestResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Sample: {} of {} rows ({}% removed)",
            self.filtered_sample_size, self.original_sample_size, self.filtering_report.reduction_percentage
        )?;
        for warning in &self.filtering_report.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        for (group, trees) in self.forest.iter() {
            writeln!(f, "Outcome: {}", group)?;
            for (label, tree) in trees.iter() {
                writeln!(f, "  Value: {}", label)?;
                for line in tree.to_string().lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
        }
        Ok(())
    }
}

/// Builds forests with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    pub config: ForestConfig,
}

impl ForestBuilder {
    pub fn new(config: ForestConfig) -> Self {
        ForestBuilder { config }
    }

    /// Build the forest explaining `outcome_columns` with `explanatory_columns`.
    ///
    /// * `selections` - Selected values per column. Selections on columns that
    ///   are neither explanatory nor outcome restrict the sample; selections on
    ///   outcome columns choose the outcome values to explain.
    pub fn build<E, O>(
        &self,
        data: &Dataset,
        explanatory_columns: &[E],
        outcome_columns: &[O],
        selections: &Selections,
    ) -> Result<ForestResult, SplitwiseError>
    where
        E: AsRef<str>,
        O: AsRef<str>,
    {
        let explanatory: Vec<String> = explanatory_columns.iter().map(|c| c.as_ref().to_string()).collect();
        let outcomes: Vec<String> = outcome_columns.iter().map(|c| c.as_ref().to_string()).collect();
        if outcomes.is_empty() {
            return Err(SplitwiseError::InvalidParameter(
                "outcome_columns".to_string(),
                "at least one column".to_string(),
                "none".to_string(),
            ));
        }
        for column in explanatory.iter().chain(outcomes.iter()) {
            if !data.has_column(column) {
                return Err(SplitwiseError::InvalidColumn(column.clone()));
            }
        }

        let remaining: Vec<&str> = data
            .column_names()
            .into_iter()
            .filter(|c| !explanatory.iter().chain(outcomes.iter()).any(|e| e.as_str() == *c))
            .collect();
        let filtered = SelectionSampler::new(selections, &remaining).sample(data)?;
        let filtering_report = analyze_filtering_impact(data, &filtered, &explanatory)?;
        for warning in &filtering_report.warnings {
            warn!("{}", warning);
        }

        info!(
            "Building {} forest for {} outcome column(s) on {} of {} rows.",
            self.config.mode,
            outcomes.len(),
            filtered.row_count(),
            data.row_count()
        );

        let builder = TreeBuilder::for_columns(&explanatory, self.config.min_population_threshold);
        let forest = match self.config.mode {
            TreeMode::Independent => {
                let pool = self.thread_pool()?;
                independent_forest(&filtered, &explanatory, &outcomes, selections, &builder, &pool)?
            }
            TreeMode::Combined => combined_forest(&filtered, &explanatory, &outcomes, selections, &builder)?,
        };

        Ok(ForestResult {
            forest,
            filtered_sample_size: filtered.row_count(),
            original_sample_size: data.row_count(),
            filtering_report,
            explanatory_columns: explanatory,
            outcome_columns: outcomes,
            mode: self.config.mode,
        })
    }

    fn thread_pool(&self) -> Result<ThreadPool, SplitwiseError> {
        let num_threads = match self.config.num_threads {
            Some(num_threads) => num_threads,
            None => std::thread::available_parallelism().map_or(1, |n| n.get()),
        };
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| {
                SplitwiseError::InvalidParameter("num_threads".to_string(), "a usable thread count".to_string(), e.to_string())
            })
    }
}

/// One tree per outcome value. Trees of one outcome column are built in
/// parallel and collected in value order.
fn independent_forest(
    data: &Dataset,
    explanatory: &[String],
    outcomes: &[String],
    selections: &Selections,
    builder: &TreeBuilder,
    pool: &ThreadPool,
) -> Result<TreeForest, SplitwiseError> {
    let mut forest = LabelMap::with_capacity(outcomes.len());
    for target_column in outcomes {
        let target_values: Vec<Value> = match selections.get(target_column) {
            Some(values) if !values.is_empty() => values.iter().cloned().map(Value::normalized).collect(),
            _ => data.unique_values(target_column)?,
        };
        let trees: Vec<Result<(String, TreeNode), SplitwiseError>> = pool.install(|| {
            target_values
                .par_iter()
                .map(|value| {
                    let outcome = Outcome::new(target_column.as_str(), value.clone());
                    debug!("Building tree for {} = {}", outcome.column, outcome.value);
                    builder
                        .construct(data, &outcome, explanatory, &[])
                        .map(|tree| (value.label(), tree))
                })
                .collect()
        });
        let trees = trees.into_iter().collect::<Result<LabelMap<TreeNode>, _>>()?;
        forest.insert(target_column.as_str(), trees);
    }
    Ok(forest)
}

/// A single tree for the synthetic outcome "any selected outcome holds".
fn combined_forest(
    data: &Dataset,
    explanatory: &[String],
    outcomes: &[String],
    selections: &Selections,
    builder: &TreeBuilder,
) -> Result<TreeForest, SplitwiseError> {
    let target = combined_target(data, outcomes, selections)?;
    let combined = data.with_column(target)?;
    let outcome = Outcome::new(COMBINED_TARGET_COLUMN, true);
    debug!("Building combined tree for {}", outcomes.join(COMBINED_LABEL_SEPARATOR));
    let tree = builder.construct(&combined, &outcome, explanatory, &[])?;

    let mut trees = LabelMap::with_capacity(1);
    trees.insert(COMBINED_TREE_LABEL, tree);
    let mut forest = LabelMap::with_capacity(1);
    forest.insert(outcomes.join(COMBINED_LABEL_SEPARATOR), trees);
    Ok(forest)
}

/// Build the boolean `_combined_target` column over the rows of `data`.
///
/// A row is flagged when, for any outcome column, its value is one of that
/// column's selected values, or is present at all when the column has no
/// selection. Rows outside the view are left missing.
pub fn combined_target<S: AsRef<str>>(
    data: &Dataset,
    outcomes: &[S],
    selections: &Selections,
) -> Result<Column, SplitwiseError> {
    let mut tests = Vec::with_capacity(outcomes.len());
    for column in outcomes {
        let column = column.as_ref();
        let selected = selections.get(column).filter(|v| !v.is_empty()).map(|v| value_set(v));
        tests.push((data.column(column)?, selected));
    }

    let mut flags: Vec<Option<Value>> = vec![None; data.source_rows()];
    for &i in data.index.iter() {
        let hit = tests.iter().any(|(col, selected)| match (col.get(i), selected) {
            (Some(v), Some(set)) => set.contains(v),
            (Some(_), None) => true,
            (None, _) => false,
        });
        flags[i] = Some(Value::Bool(hit));
    }
    Ok(Column::new(COMBINED_TARGET_COLUMN, flags))
}

/// Build a forest, see [`ForestBuilder::build`].
///
/// A non-positive `min_population_threshold` means no limit.
pub fn build_forest<E, O>(
    data: &Dataset,
    explanatory_columns: &[E],
    outcome_columns: &[O],
    selections: &Selections,
    min_population_threshold: Option<i64>,
    mode: TreeMode,
) -> Result<ForestResult, SplitwiseError>
where
    E: AsRef<str>,
    O: AsRef<str>,
{
    ForestBuilder::new(ForestConfig::new(mode, min_population_threshold)).build(
        data,
        explanatory_columns,
        outcome_columns,
        selections,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LeafReason;
    use tempfile::tempdir;

    fn weather_data() -> Dataset {
        let mut weather = vec!["rain"; 8];
        weather.extend(["clear"; 2]);
        let mut injury = vec![true; 8];
        injury.extend([false; 2]);
        Dataset::new(vec![
            Column::from_values("weather", weather),
            Column::from_values("injury", injury),
        ])
        .unwrap()
    }

    // 12 accidents with a `region` column used only for sample selection.
    fn accident_data() -> Dataset {
        Dataset::new(vec![
            Column::from_values(
                "light",
                ["dark", "dark", "dark", "dark", "dark", "dark", "lit", "lit", "lit", "lit", "lit", "lit"],
            ),
            Column::from_values(
                "road",
                ["wet", "wet", "wet", "dry", "dry", "dry", "wet", "dry", "wet", "dry", "wet", "dry"],
            ),
            Column::from_values(
                "severity",
                ["high", "high", "high", "high", "low", "low", "low", "mid", "low", "low", "mid", "high"],
            ),
            Column::from_options(
                "vehicle",
                [Some("car"), None, Some("bike"), Some("car"), None, None, Some("car"), None, None, None, Some("bike"), None],
            ),
            Column::from_values("region", ["n", "n", "s", "s", "n", "n", "s", "n", "s", "n", "s", "n"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_weather_forest() {
        let result = build_forest(
            &weather_data(),
            &["weather"],
            &["injury"],
            &Selections::new(),
            None,
            TreeMode::Independent,
        )
        .unwrap();
        assert_eq!(result.original_sample_size, 10);
        assert_eq!(result.filtered_sample_size, 10);
        let trees = result.forest.get("injury").unwrap();
        assert_eq!(trees.keys().collect::<Vec<_>>(), vec!["True", "False"]);
        let TreeNode::Node { variable, variance, .. } = trees.get("True").unwrap() else {
            panic!("expected a node");
        };
        assert_eq!(variable, "weather");
        assert_eq!(*variance, 50.0);
    }

    #[test]
    fn test_selected_target_values() {
        let selections: Selections = vec![("injury", vec![Value::from("true")])].into_iter().collect();
        let result = build_forest(
            &weather_data(),
            &["weather"],
            &["injury"],
            &selections,
            None,
            TreeMode::Independent,
        )
        .unwrap();
        let trees = result.forest.get("injury").unwrap();
        assert_eq!(trees.len(), 1);
        assert!(trees.contains_key("True"));
    }

    #[test]
    fn test_invalid_columns() {
        let data = weather_data();
        let err = build_forest(&data, &["weather", "speed"], &["injury"], &Selections::new(), None, TreeMode::Independent)
            .unwrap_err();
        assert_eq!(err, SplitwiseError::InvalidColumn("speed".to_string()));
        let err = build_forest(&data, &["weather"], &["fatal"], &Selections::new(), None, TreeMode::Combined).unwrap_err();
        assert_eq!(err, SplitwiseError::InvalidColumn("fatal".to_string()));
        let none: [&str; 0] = [];
        let err = build_forest(&data, &["weather"], &none, &Selections::new(), None, TreeMode::Independent).unwrap_err();
        assert!(matches!(err, SplitwiseError::InvalidParameter(..)));
    }

    #[test]
    fn test_sample_selection_and_report() {
        let selections: Selections = vec![("region", vec![Value::from("n")])].into_iter().collect();
        let result = build_forest(
            &accident_data(),
            &["light", "road"],
            &["severity"],
            &selections,
            None,
            TreeMode::Independent,
        )
        .unwrap();
        assert_eq!(result.original_sample_size, 12);
        assert_eq!(result.filtered_sample_size, 7);
        assert_eq!(result.filtering_report.reduction_percentage, 41.7);
        // light and road keep both values but fall under the low cardinality limit.
        assert_eq!(result.filtering_report.warnings.len(), 2);
        let trees = result.forest.get("severity").unwrap();
        assert_eq!(trees.keys().collect::<Vec<_>>(), vec!["high", "low", "mid"]);
    }

    #[test]
    fn test_threshold_law() {
        let result = build_forest(
            &accident_data(),
            &["light", "road"],
            &["severity"],
            &Selections::new(),
            Some(7),
            TreeMode::Independent,
        )
        .unwrap();
        for tree in result.forest.get("severity").unwrap().values() {
            let TreeNode::Node { branches, .. } = tree else {
                panic!("expected a node");
            };
            for b in branches.values() {
                match b.subtree.as_deref() {
                    Some(TreeNode::Leaf {
                        reason: LeafReason::InsufficientPopulation { threshold, actual },
                    }) => {
                        assert_eq!(*threshold, 7);
                        assert_eq!(*actual, b.total);
                        assert!(*actual < 7);
                    }
                    other => panic!("unexpected subtree {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_non_positive_threshold_means_no_limit() {
        let data = accident_data();
        let limited = build_forest(&data, &["light", "road"], &["severity"], &Selections::new(), Some(-5), TreeMode::Independent)
            .unwrap();
        let unlimited =
            build_forest(&data, &["light", "road"], &["severity"], &Selections::new(), None, TreeMode::Independent)
                .unwrap();
        assert_eq!(limited, unlimited);
    }

    #[test]
    fn test_combined_target_is_or() {
        let data = Dataset::new(vec![
            Column::from_values("A", ["x", "y", "x", "y", "y"]),
            Column::from_values("B", ["q", "p", "p", "q", "q"]),
        ])
        .unwrap();
        let selections: Selections = vec![("A", vec![Value::from("x")]), ("B", vec![Value::from("p")])]
            .into_iter()
            .collect();
        let target = combined_target(&data, &["A", "B"], &selections).unwrap();
        let flags: Vec<Option<&Value>> = (0..5).map(|i| target.get(i)).collect();
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(flags, vec![Some(&t), Some(&t), Some(&t), Some(&f), Some(&f)]);
    }

    #[test]
    fn test_combined_target_without_selection_uses_presence() {
        let data = accident_data();
        let target = combined_target(&data, &["vehicle"], &Selections::new()).unwrap();
        assert_eq!(target.get(0), Some(&Value::Bool(true)));
        assert_eq!(target.get(1), Some(&Value::Bool(false)));

        let view = data.filter_eq("region", &Value::from("s")).unwrap();
        let target = combined_target(&view, &["vehicle"], &Selections::new()).unwrap();
        // Rows outside the view stay missing.
        assert_eq!(target.get(0), None);
        assert_eq!(target.get(2), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_combined_forest() {
        let selections: Selections = vec![
            ("severity", vec![Value::from("high")]),
            ("vehicle", vec![Value::from("bike")]),
        ]
        .into_iter()
        .collect();
        let result = build_forest(
            &accident_data(),
            &["light", "road"],
            &["severity", "vehicle"],
            &selections,
            None,
            TreeMode::Combined,
        )
        .unwrap();
        assert_eq!(result.forest.len(), 1);
        let trees = result.forest.get("severity + vehicle").unwrap();
        assert_eq!(trees.keys().collect::<Vec<_>>(), vec!["Combined"]);
        let TreeNode::Node { variable, branches, .. } = trees.get("Combined").unwrap() else {
            panic!("expected a node");
        };
        // high severity or bike: rows 0, 1, 2, 3, 10, 11
        assert_eq!(variable, "light");
        let dark = branches.get("dark").unwrap();
        assert_eq!((dark.count, dark.total), (4, 6));
        let lit = branches.get("lit").unwrap();
        assert_eq!((lit.count, lit.total), (2, 6));
    }

    #[test]
    fn test_idempotent_and_thread_independent() {
        let data = accident_data();
        let build = |threads: usize| {
            ForestBuilder::new(ForestConfig::new(TreeMode::Independent, Some(2)).with_num_threads(threads))
                .build(&data, &["road", "light"], &["severity", "vehicle"], &Selections::new())
                .unwrap()
        };
        let first = build(1).json_dump().unwrap();
        let second = build(1).json_dump().unwrap();
        let parallel = build(4).json_dump().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, parallel);
    }

    #[test]
    fn test_exhaustion_without_explanatory_columns() {
        let none: [&str; 0] = [];
        let result =
            build_forest(&weather_data(), &none, &["injury"], &Selections::new(), None, TreeMode::Independent).unwrap();
        for tree in result.forest.get("injury").unwrap().values() {
            assert_eq!(tree, &TreeNode::leaf(LeafReason::NoExplanatoryColumnsLeft));
        }
    }

    #[test]
    fn test_result_io_and_display() {
        let result = build_forest(
            &weather_data(),
            &["weather"],
            &["injury"],
            &Selections::new(),
            None,
            TreeMode::Independent,
        )
        .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("forest.json");
        result.save(&path).unwrap();
        let loaded = ForestResult::load(&path).unwrap();
        assert_eq!(loaded, result);

        let text = result.to_string();
        assert!(text.starts_with("Sample: 10 of 10 rows (0% removed)\n"));
        assert!(text.contains("Outcome: injury\n  Value: True\n    weather (std dev: 50)\n"));
        assert!(text.contains("      rain: 8/8 (100%)\n"));
    }
}
