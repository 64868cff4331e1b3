//! Dataset profiling: bundles, per-column summaries, attribute indexes

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use serde::Serialize;

use crate::config::ProfileSettings;
use crate::error::Result;
use crate::models::{InsightTable, SubspaceTable};
use crate::sentence::round2;
use crate::stats;
use crate::table::{ColumnType, Table, Value};

/// Everything a client needs to draw a dataset
#[derive(Debug, Clone, Serialize)]
pub struct DataBundle {
    pub record: Table,
    pub insight: Table,
    pub edge: Table,
    pub feature: Vec<String>,
    /// Distinct insight kinds, first-seen order
    pub insight_name: Vec<String>,
    /// Distinct insight categories, first-seen order
    pub insight_type: Vec<String>,
    pub subspace: Table,
}

impl DataBundle {
    pub fn new(record: &Table, insight: &InsightTable, edge: &Table, subspace: &SubspaceTable) -> Self {
        Self {
            record: record.clone(),
            insight: insight.table().clone(),
            edge: edge.clone(),
            feature: subspace.features().to_vec(),
            insight_name: insight.kind_names(),
            insight_type: insight.categories(),
            subspace: subspace.table().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Measure,
    Attribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Float,
    Categorical,
}

impl From<ColumnType> for ValueType {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int => ValueType::Int,
            ColumnType::Float => ValueType::Float,
            ColumnType::Str => ValueType::Categorical,
        }
    }
}

/// Shape of one column's values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDistribution {
    /// Kernel density curve; empty when the column has no spread
    Density {
        /// Position of this curve among the density curves of one call
        index: usize,
        x: Vec<f64>,
        y: Vec<f64>,
        x_min: Option<f64>,
        x_max: Option<f64>,
        y_min: Option<f64>,
        y_max: Option<f64>,
    },
    Categorical {
        values: Vec<Value>,
        counts: Vec<usize>,
        /// Largest count rounded up to a multiple of ten
        upper_bound: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub role: ColumnRole,
    pub value_type: ValueType,
    pub distribution: ColumnDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInfo {
    pub data_name: String,
    pub data_description: String,
    pub row_cnt: usize,
    pub col_cnt: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Distinct values with their counts, most frequent first (ties first-seen)
pub fn value_counts<'a>(cells: impl IntoIterator<Item = &'a Value>) -> Vec<(Value, usize)> {
    let mut counts: Vec<(Value, usize)> = Vec::new();
    let mut position: BTreeMap<&Value, usize> = BTreeMap::new();
    for cell in cells {
        match position.get(cell) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(cell, counts.len());
                counts.push((cell.clone(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Round up to the next multiple of ten (multiples stay put)
pub fn upper_bound(count: usize) -> usize {
    count.div_ceil(10) * 10
}

fn density(index: usize, cells: &[&Value], settings: &ProfileSettings) -> ColumnDistribution {
    let values: Vec<f64> = cells.iter().filter_map(|v| v.as_f64()).collect();
    match stats::gaussian_kde(&values, settings.kde_grid_size, settings.kde_cut) {
        Some((x, y)) => {
            let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
            let max = |v: &[f64]| v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            ColumnDistribution::Density {
                index,
                x_min: Some(round2(min(&x))),
                x_max: Some(round2(max(&x))),
                y_min: Some(min(&y)),
                y_max: Some(max(&y)),
                x,
                y,
            }
        }
        None => {
            tracing::warn!(index, "Column has no spread, density curve left empty");
            ColumnDistribution::Density {
                index,
                x: vec![],
                y: vec![],
                x_min: None,
                x_max: None,
                y_min: None,
                y_max: None,
            }
        }
    }
}

/// Profile every record column except `cid`
pub fn data_info(
    name: &str,
    description: &str,
    record: &Table,
    insight: &InsightTable,
    settings: &ProfileSettings,
) -> Result<DataInfo> {
    let record = if record.has_column("cid") {
        record.drop_column("cid")?
    } else {
        record.clone()
    };
    let measures = insight.measure_columns();

    let mut columns = Vec::with_capacity(record.columns().len());
    let mut curves = 0;
    for (column, ty) in record.columns().iter().zip(record.column_types()) {
        let cells = record.column(column)?;
        let distribution = if ty.is_numeric() {
            curves += 1;
            density(curves - 1, &cells, settings)
        } else {
            let (values, counts): (Vec<Value>, Vec<usize>) =
                value_counts(cells.iter().copied()).into_iter().unzip();
            let bound = upper_bound(counts.first().copied().unwrap_or(0));
            ColumnDistribution::Categorical {
                values,
                counts,
                upper_bound: bound,
            }
        };
        columns.push(ColumnProfile {
            name: column.clone(),
            role: if measures.contains(column) {
                ColumnRole::Measure
            } else {
                ColumnRole::Attribute
            },
            value_type: (*ty).into(),
            distribution,
        });
    }

    Ok(DataInfo {
        data_name: name.to_string(),
        data_description: description.to_string(),
        row_cnt: record.len(),
        col_cnt: record.columns().len(),
        columns,
    })
}

/// Feature → (distinct value → first-seen position)
pub fn attribute_map(
    record: &Table,
    features: &[String],
) -> Result<BTreeMap<String, BTreeMap<String, usize>>> {
    let mut map = BTreeMap::new();
    for feature in features {
        let mut positions: BTreeMap<String, usize> = BTreeMap::new();
        for cell in record.column(feature)? {
            let next = positions.len();
            positions.entry(cell.to_string()).or_insert(next);
        }
        map.insert(feature.clone(), positions);
    }
    Ok(map)
}

/// One value's pie slice, in radians
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub value: Value,
    pub count: usize,
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSlices {
    pub feature: String,
    pub slices: Vec<Slice>,
}

/// Share of each feature value as consecutive angles around a full turn
pub fn feature_attribution(record: &Table, features: &[String]) -> Result<Vec<FeatureSlices>> {
    features
        .iter()
        .map(|feature| -> Result<FeatureSlices> {
            let counts = value_counts(record.column(feature)?);
            let total: usize = counts.iter().map(|(_, c)| c).sum();
            let mut start = 0.0;
            let slices = counts
                .into_iter()
                .map(|(value, count)| {
                    let end = start + count as f64 / total as f64 * TAU;
                    let slice = Slice {
                        value,
                        count,
                        start_angle: start,
                        end_angle: end,
                    };
                    start = end;
                    slice
                })
                .collect();
            Ok(FeatureSlices {
                feature: feature.clone(),
                slices,
            })
        })
        .collect()
}
