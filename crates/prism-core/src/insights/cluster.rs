//! Two-measure insights over grouped totals

use crate::config::EngineSettings;
use crate::error::{Error, Result};
use crate::sentence::when_clause;
use crate::stats;
use crate::table::{GroupSum, Value};

use super::engine::{InsightContext, Rendered};
use super::types::InsightDetail;

/// Totals of both measures per group, ascending by the first measure
struct MeasurePair<'a> {
    x_measure: &'a str,
    y_measure: &'a str,
    groups: Vec<GroupSum>,
}

impl<'a> MeasurePair<'a> {
    fn group(ctx: &InsightContext<'a>) -> Result<Self> {
        let measures = ctx.entry.measures();
        let [x_measure, y_measure] = measures[..] else {
            return Err(Error::InvalidData(format!(
                "Insight {} needs exactly two measures separated by ';', got '{}'",
                ctx.entry.iid, ctx.entry.measure
            )));
        };
        let mut groups = ctx
            .subset
            .group_sum(ctx.breakdown(), &[x_measure, y_measure])?;
        groups.sort_by(|a, b| a.sums[0].cmp(&b.sums[0]));
        Ok(Self {
            x_measure,
            y_measure,
            groups,
        })
    }

    fn values(&self, idx: usize) -> Vec<Value> {
        self.groups.iter().map(|g| g.sums[idx].clone()).collect()
    }

    fn floats(&self, idx: usize) -> Vec<f64> {
        self.groups.iter().map(|g| g.sum_f64(idx)).collect()
    }
}

/// `" and "` after a subspace clause, `" when "` after "in all data"
fn grouping_joiner(phrases: &[String]) -> &'static str {
    if phrases.is_empty() {
        " when "
    } else {
        " and "
    }
}

pub(super) fn cross_measure(ctx: &InsightContext<'_>, phrases: &[String]) -> Result<Rendered> {
    let pair = MeasurePair::group(ctx)?;
    let x = pair.floats(0);
    let y = pair.floats(1);
    let fit = stats::linear_regression(&x, &y)?;
    let (first, last) = match (x.first(), x.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(Error::Statistics("No groups to fit".into())),
    };

    let sentence = format!(
        "{} and {} are linear correlated{}{}being grouped by {}.",
        pair.x_measure,
        pair.y_measure,
        when_clause(phrases),
        grouping_joiner(phrases),
        ctx.breakdown()
    );

    Ok(Rendered {
        detail: InsightDetail::CrossMeasure {
            x_measure: pair.x_measure.to_string(),
            y_measure: pair.y_measure.to_string(),
            x_value: pair.values(0),
            y_value: pair.values(1),
            line_y_value: [fit.predict(first), fit.predict(last)],
        },
        sentence,
    })
}

pub(super) fn clustering(
    ctx: &InsightContext<'_>,
    phrases: &[String],
    settings: &EngineSettings,
) -> Result<Rendered> {
    let pair = MeasurePair::group(ctx)?;
    let xs = stats::standardize(&pair.floats(0));
    let ys = stats::standardize(&pair.floats(1));
    let points: Vec<[f64; 2]> = xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect();

    let clustering = settings.clustering;
    let label = stats::dbscan(&points, clustering.eps, clustering.min_samples);

    let noise: Vec<String> = pair
        .groups
        .iter()
        .zip(&label)
        .filter(|(_, l)| **l == stats::NOISE)
        .take(settings.max_noise_examples)
        .map(|(g, _)| g.key.to_string())
        .collect();
    let exception = if label.contains(&stats::NOISE) {
        let mut names = noise;
        names.push("etc".to_string());
        format!(", except for {}", names.join(", "))
    } else {
        String::new()
    };

    let sentence = format!(
        "{} and {} form clusters{}{}being grouped by {}{}.",
        pair.x_measure,
        pair.y_measure,
        when_clause(phrases),
        grouping_joiner(phrases),
        ctx.breakdown(),
        exception
    );

    Ok(Rendered {
        detail: InsightDetail::Clustering {
            x_measure: pair.x_measure.to_string(),
            y_measure: pair.y_measure.to_string(),
            x_value: pair.values(0),
            y_value: pair.values(1),
            label,
        },
        sentence,
    })
}
