//! Single-measure group-by insights: top1, change point, outlier, attribution

use crate::error::{Error, Result};
use crate::sentence::{compose, format_f64, format_number, round2, when_clause};
use crate::stats;
use crate::table::{GroupSum, Value};

use super::describe::coerce_breakdown_value;
use super::engine::{InsightContext, Rendered};
use super::types::{InsightDetail, InsightKind};

fn keys(groups: &[GroupSum]) -> Vec<Value> {
    groups.iter().map(|g| g.key.clone()).collect()
}

fn first_sums(groups: &[GroupSum]) -> Vec<Value> {
    groups.iter().map(|g| g.sums[0].clone()).collect()
}

pub(super) fn top1(ctx: &InsightContext<'_>, phrases: &[String], top_n: usize) -> Result<Rendered> {
    let measure = ctx.measure();
    let breakdown = ctx.breakdown();
    let mut groups = ctx.subset.group_sum(breakdown, &[measure])?;
    groups.sort_by(|a, b| b.sums[0].cmp(&a.sums[0]));
    groups.truncate(top_n.max(1));

    let top = groups
        .first()
        .ok_or_else(|| Error::Statistics("top1 needs at least one group".into()))?;
    // Without a catalogued value the largest group names itself
    let value = match &ctx.entry.breakdown_value {
        Some(raw) => coerce_breakdown_value(raw),
        None => top.key.clone(),
    };

    let mut scope = phrases.to_vec();
    scope.push(format!("{} is {}", breakdown, value));
    let sentence = format!(
        "Given the statistics is {}, the maximum value of the total data is {}{}.",
        measure,
        format_number(&top.sums[0]),
        when_clause(&scope)
    );

    Ok(Rendered {
        detail: InsightDetail::Top {
            breakdown: breakdown.to_string(),
            measure: measure.to_string(),
            breakdown_value: keys(&groups),
            measure_value: first_sums(&groups),
        },
        sentence,
    })
}

/// `change point` and `outlier`: the total at the catalogued breakdown value
pub(super) fn point(ctx: &InsightContext<'_>, phrases: &[String]) -> Result<Rendered> {
    let entry = ctx.entry;
    let measure = ctx.measure();
    let breakdown = ctx.breakdown();
    let raw = entry.breakdown_value.as_deref().ok_or_else(|| {
        Error::NotFound(format!("Insight {} has no breakdown value", entry.iid))
    })?;
    let value = coerce_breakdown_value(raw);

    let groups = ctx.subset.group_sum(breakdown, &[measure])?;
    let y = groups
        .iter()
        .find(|g| g.key == value)
        .map(|g| g.sums[0].clone())
        .ok_or_else(|| {
            Error::NotFound(format!(
                "No {} group equal to '{}' for insight {}",
                breakdown, value, entry.iid
            ))
        })?;

    let when = when_clause(phrases);
    let sentence = if entry.kind == InsightKind::ChangePoint {
        format!(
            "Among {}s{}, change occurs in {} and its total {} is {}.",
            breakdown,
            when,
            value,
            measure,
            format_number(&y)
        )
    } else {
        format!(
            "Among {}s{}, the total {} of {} in {} is an anomaly.",
            breakdown,
            when,
            measure,
            format_number(&y),
            value
        )
    };

    Ok(Rendered {
        detail: InsightDetail::Point {
            breakdown: breakdown.to_string(),
            measure: measure.to_string(),
            breakdown_value: keys(&groups),
            measure_value: first_sums(&groups),
            x: value.to_string(),
            y: y.to_string(),
        },
        sentence,
    })
}

pub(super) fn attribution(ctx: &InsightContext<'_>, phrases: &[String]) -> Result<Rendered> {
    let measure = ctx.measure();
    let breakdown = ctx.breakdown();
    let mut groups = ctx.subset.group_sum(breakdown, &[measure])?;
    groups.sort_by(|a, b| a.sums[0].cmp(&b.sums[0]));

    let sums: Vec<f64> = groups.iter().map(|g| g.sum_f64(0)).collect();
    let percentage: Vec<f64> = stats::shares(&sums)?.into_iter().map(round2).collect();

    let names: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
    let pcts: Vec<String> = percentage.iter().map(|p| format_f64(*p)).collect();
    let sentence = format!(
        "{} makes up {} of the total {}{}.",
        compose(&names),
        compose(&pcts),
        measure,
        when_clause(phrases)
    );

    Ok(Rendered {
        detail: InsightDetail::Attribution {
            breakdown: breakdown.to_string(),
            measure: measure.to_string(),
            breakdown_value: keys(&groups),
            measure_value: first_sums(&groups),
            percentage,
        },
        sentence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::insights::InsightEngine;
    use crate::models::{InsightEntry, Subspace};
    use crate::table::Table;

    fn table(rows: &[[&str; 3]]) -> Table {
        Table::from_text(
            vec!["Year".into(), "Brand".into(), "Sales".into()],
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn subset() -> Table {
        table(&[
            ["2010", "BMW", "10"],
            ["2010", "Ford", "20"],
            ["2011", "BMW", "30"],
            ["2011", "Audi", "30"],
            ["2012", "Ford", "5"],
        ])
    }

    fn entry(kind: &str, breakdown: &str, value: Option<&str>) -> InsightEntry {
        InsightEntry {
            iid: 1,
            sid: 0,
            kind: InsightKind::parse(kind),
            category: None,
            breakdown: breakdown.into(),
            breakdown_value: value.map(str::to_string),
            measure: "Sales".into(),
            correlated: vec![],
        }
    }

    fn run(entry: &InsightEntry, top_n: usize) -> Result<InsightDetail> {
        Ok(run_on(&subset(), entry, top_n)?.detail)
    }

    fn run_on(subset: &Table, entry: &InsightEntry, top_n: usize) -> Result<Rendered> {
        let subspace = Subspace {
            sid: 0,
            cells: vec![Value::Wildcard, Value::Wildcard],
        };
        let features = vec!["Year".to_string(), "Brand".to_string()];
        let ctx = InsightContext {
            entry,
            features: &features,
            subspace: &subspace,
            subset,
            record: subset,
        };
        let engine = InsightEngine::new(EngineSettings {
            top_n,
            ..EngineSettings::default()
        });
        let result = engine.compute(&ctx)?.into_result().unwrap();
        Ok(Rendered {
            detail: result.detail,
            sentence: result.sentence,
        })
    }

    #[test]
    fn test_top1_descending_and_truncated() {
        let detail = run(&entry("top1", "Brand", Some("Audi")), 2).unwrap();
        match detail {
            InsightDetail::Top {
                breakdown_value,
                measure_value,
                ..
            } => {
                assert_eq!(
                    breakdown_value,
                    vec![Value::Str("BMW".into()), Value::Str("Audi".into())]
                );
                assert_eq!(measure_value, vec![Value::Int(40), Value::Int(30)]);
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_attribution_shares() {
        let detail = run(&entry("attribution", "Year", None), 10).unwrap();
        match detail {
            InsightDetail::Attribution {
                breakdown_value,
                percentage,
                ..
            } => {
                assert_eq!(
                    breakdown_value,
                    vec![Value::Int(2012), Value::Int(2010), Value::Int(2011)]
                );
                assert_eq!(percentage, vec![0.05, 0.32, 0.63]);
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_point_requires_matching_group() {
        let err = run(&entry("change point", "Year", Some("1999")), 10).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = run(&entry("outlier", "Year", None), 10).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_point_uses_typed_equality() {
        // "Ford" stays text and matches the text key
        let detail = run(&entry("outlier", "Brand", Some("Ford")), 10).unwrap();
        match detail {
            InsightDetail::Point { x, y, .. } => {
                assert_eq!(x, "Ford");
                assert_eq!(y, "25");
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_attribution_rounds_halves_to_even() {
        let subset = table(&[["2010", "A", "1"], ["2010", "B", "7"]]);
        let rendered = run_on(&subset, &entry("attribution", "Brand", None), 10).unwrap();
        match rendered.detail {
            InsightDetail::Attribution { percentage, .. } => {
                assert_eq!(percentage, vec![0.12, 0.88]);
            }
            other => panic!("unexpected detail {:?}", other),
        }
        assert_eq!(
            rendered.sentence,
            "A and B makes up 0.12 and 0.88 of the total Sales in all data."
        );

        let subset = table(&[["2010", "A", "5"], ["2010", "B", "3"]]);
        let rendered = run_on(&subset, &entry("attribution", "Brand", None), 10).unwrap();
        assert_eq!(
            rendered.sentence,
            "B and A makes up 0.38 and 0.62 of the total Sales in all data."
        );
    }

    #[test]
    fn test_blank_breakdown_cells_form_no_group() {
        let subset = table(&[["2010", "A", "1"], ["2011", "", "2"], ["2012", "B", "3"]]);
        let rendered = run_on(&subset, &entry("attribution", "Brand", None), 10).unwrap();
        match &rendered.detail {
            InsightDetail::Attribution {
                breakdown_value,
                percentage,
                ..
            } => {
                assert_eq!(
                    breakdown_value,
                    &vec![Value::Str("A".into()), Value::Str("B".into())]
                );
                assert_eq!(percentage, &vec![0.25, 0.75]);
            }
            other => panic!("unexpected detail {:?}", other),
        }
        assert_eq!(
            rendered.sentence,
            "A and B makes up 0.25 and 0.75 of the total Sales in all data."
        );
    }
}
