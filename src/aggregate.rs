// Chart data aggregation: group rows by a key column and reduce a value column

use crate::chart::{ChartKind, Reduction};
use crate::data::Dataset;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Ordered (label, value) pairs ready for a chart
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    points: Vec<(String, f64)>,
}

impl ChartSeries {
    pub fn new(points: Vec<(String, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(String, f64)] {
        &self.points
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reduce `dataset` into a series: rows are grouped by the display string of
/// the key cell (first-encounter order) and the value cells of each group are
/// summed (pie) or averaged (bar, line). Unparsable values count as 0.
pub fn aggregate(
    dataset: &Dataset,
    kind: ChartKind,
    key_column: &str,
    value_column: &str,
) -> Result<ChartSeries> {
    let key_idx = find_col_index(dataset, key_column)?;
    let value_idx = find_col_index(dataset, value_column)?;

    // Per-group running sum and row count, in first-encounter order
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();

    for row in dataset.rows() {
        let key = row[key_idx].to_string();
        let value = row[value_idx].coerce_number();

        let idx = *group_index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, 0.0, 0));
            groups.len() - 1
        });
        let group = &mut groups[idx];
        group.1 += value;
        group.2 += 1;
    }

    let reduction = kind.reduction();
    let points = groups
        .into_iter()
        .map(|(label, sum, count)| {
            let value = match reduction {
                Reduction::Sum => sum,
                Reduction::Mean => sum / count as f64,
            };
            (label, value)
        })
        .collect();

    Ok(ChartSeries { points })
}

fn find_col_index(dataset: &Dataset, name: &str) -> Result<usize> {
    dataset
        .column_index(name)
        .ok_or_else(|| anyhow!("Column '{}' not found", name))
}
