//! Series insights: trend slope and subspace-vs-counterpart correlation

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::resolver::filter_by_constraints;
use crate::sentence::{format_f64, scoped, when_clause};
use crate::stats;
use crate::table::{GroupSum, Value};

use super::describe::describe_correlated;
use super::engine::{InsightContext, Rendered};
use super::types::InsightDetail;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

/// Proleptic Gregorian ordinal (0001-01-01 is day 1)
pub fn date_ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// X coordinates for a series of breakdown keys
///
/// Date-like keys (a `date`/`Date` column, or text that all parses as dates)
/// map to their ordinal; numeric keys are used as they are.
pub fn series_x(breakdown: &str, keys: &[Value]) -> Result<Vec<f64>> {
    let named_date = breakdown == "date" || breakdown == "Date";
    let dates: Option<Vec<NaiveDate>> = keys
        .iter()
        .map(|k| k.as_str().and_then(parse_date))
        .collect();

    match dates {
        Some(dates) if !dates.is_empty() => Ok(dates.into_iter().map(date_ordinal).collect()),
        _ if named_date && keys.iter().any(|k| !k.is_numeric()) => Err(Error::InvalidData(
            format!("'{}' holds values that are not dates", breakdown),
        )),
        _ => keys
            .iter()
            .map(|k| {
                k.as_f64().ok_or_else(|| {
                    Error::InvalidData(format!(
                        "Trend over '{}' needs numeric or date values, got '{}'",
                        breakdown, k
                    ))
                })
            })
            .collect(),
    }
}

pub(super) fn trend(ctx: &InsightContext<'_>, phrases: &[String]) -> Result<Rendered> {
    let measure = ctx.measure();
    let breakdown = ctx.breakdown();
    let groups = ctx.subset.group_sum(breakdown, &[measure])?;

    let keys: Vec<Value> = groups.iter().map(|g| g.key.clone()).collect();
    let x = series_x(breakdown, &keys)?;
    let y: Vec<f64> = groups.iter().map(|g| g.sum_f64(0)).collect();
    let slope = stats::linear_regression(&x, &y)?.slope;

    let sentence = format!(
        "The trend of the total {} over {}s{} is {}.",
        measure,
        breakdown,
        when_clause(phrases),
        if slope >= 0.0 { "increasing" } else { "decreasing" }
    );

    Ok(Rendered {
        detail: InsightDetail::Trend {
            breakdown: breakdown.to_string(),
            measure: measure.to_string(),
            breakdown_value: keys,
            measure_value: groups.into_iter().map(|g| g.sums[0].clone()).collect(),
            slope,
        },
        sentence,
    })
}

/// Pair two grouped series on their shared keys, keys ascending
fn align(a: Vec<GroupSum>, b: Vec<GroupSum>) -> Vec<(Value, Value, Value)> {
    let other: BTreeMap<Value, Value> = b
        .into_iter()
        .filter_map(|g| g.sums.into_iter().next().map(|s| (g.key, s)))
        .collect();
    a.into_iter()
        .filter_map(|g| {
            let own = g.sums.into_iter().next()?;
            let theirs = other.get(&g.key)?.clone();
            Some((g.key, own, theirs))
        })
        .collect()
}

pub(super) fn correlation(ctx: &InsightContext<'_>, phrases: &[String]) -> Result<Rendered> {
    let entry = ctx.entry;
    let measure = ctx.measure();
    let breakdown = ctx.breakdown();

    let constraints: Vec<(String, Value)> = ctx
        .subset
        .columns()
        .iter()
        .filter(|c| c.as_str() != measure)
        .filter_map(|c| {
            entry
                .correlated_value(c)
                .filter(|v| !v.is_wildcard())
                .map(|v| (c.clone(), v.clone()))
        })
        .collect();
    let counterpart = filter_by_constraints(ctx.record, &constraints)?;

    let aligned = align(
        ctx.subset.group_sum(breakdown, &[measure])?,
        counterpart.group_sum(breakdown, &[measure])?,
    );
    let own: Vec<f64> = aligned.iter().map(|(_, v, _)| v.as_f64().unwrap_or(f64::NAN)).collect();
    let theirs: Vec<f64> = aligned.iter().map(|(_, _, v)| v.as_f64().unwrap_or(f64::NAN)).collect();
    let coefficient = stats::pearson(&own, &theirs)?;

    let counterpart_phrases = describe_correlated(ctx.features, entry);
    let sentence = format!(
        "The Pearson correlation between{} and{} is {}.",
        scoped(phrases, " subset with ", " all data"),
        scoped(&counterpart_phrases, " subset with ", " all data"),
        format_f64(coefficient)
    );

    let mut breakdown_value = Vec::with_capacity(aligned.len());
    let mut own_values = Vec::with_capacity(aligned.len());
    let mut their_values = Vec::with_capacity(aligned.len());
    for (key, a, b) in aligned {
        breakdown_value.push(key);
        own_values.push(a);
        their_values.push(b);
    }

    Ok(Rendered {
        detail: InsightDetail::Correlation {
            breakdown: breakdown.to_string(),
            measure: measure.to_string(),
            breakdown_value,
            measure_value: [own_values, their_values],
            coefficient,
        },
        sentence,
    })
}
