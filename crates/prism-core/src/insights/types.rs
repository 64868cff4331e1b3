//! Core types for the Insight Statistics Engine

use std::fmt;

use serde::{Serialize, Serializer};

use crate::table::Value;

/// Kinds of catalogued insights
///
/// Unrecognised names are kept as [`InsightKind::Unsupported`] so dispatch
/// can answer "nothing to render" instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InsightKind {
    Top1,
    Trend,
    Correlation,
    ChangePoint,
    Outlier,
    Attribution,
    CrossMeasureCorrelation,
    Clustering,
    Unsupported(String),
}

impl InsightKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "top1" => InsightKind::Top1,
            "trend" => InsightKind::Trend,
            "correlation" => InsightKind::Correlation,
            "change point" => InsightKind::ChangePoint,
            "outlier" => InsightKind::Outlier,
            "attribution" => InsightKind::Attribution,
            "cross measure correlation" => InsightKind::CrossMeasureCorrelation,
            "clustering" => InsightKind::Clustering,
            other => InsightKind::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InsightKind::Top1 => "top1",
            InsightKind::Trend => "trend",
            InsightKind::Correlation => "correlation",
            InsightKind::ChangePoint => "change point",
            InsightKind::Outlier => "outlier",
            InsightKind::Attribution => "attribution",
            InsightKind::CrossMeasureCorrelation => "cross measure correlation",
            InsightKind::Clustering => "clustering",
            InsightKind::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, InsightKind::Unsupported(_))
    }

    /// Every supported kind
    pub fn all() -> &'static [InsightKind] {
        &[
            InsightKind::Top1,
            InsightKind::Trend,
            InsightKind::Correlation,
            InsightKind::ChangePoint,
            InsightKind::Outlier,
            InsightKind::Attribution,
            InsightKind::CrossMeasureCorrelation,
            InsightKind::Clustering,
        ]
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for InsightKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Kind-specific numeric payload for charting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightDetail {
    /// `top1`: largest groups first
    Top {
        breakdown: String,
        measure: String,
        breakdown_value: Vec<Value>,
        measure_value: Vec<Value>,
    },
    Trend {
        breakdown: String,
        measure: String,
        breakdown_value: Vec<Value>,
        measure_value: Vec<Value>,
        slope: f64,
    },
    /// Sums of the insight subspace and its counterpart, aligned on breakdown keys
    Correlation {
        breakdown: String,
        measure: String,
        breakdown_value: Vec<Value>,
        measure_value: [Vec<Value>; 2],
        coefficient: f64,
    },
    /// `change point` and `outlier`: the full series plus the highlighted point
    Point {
        breakdown: String,
        measure: String,
        breakdown_value: Vec<Value>,
        measure_value: Vec<Value>,
        x: String,
        y: String,
    },
    Attribution {
        breakdown: String,
        measure: String,
        breakdown_value: Vec<Value>,
        measure_value: Vec<Value>,
        percentage: Vec<f64>,
    },
    CrossMeasure {
        x_measure: String,
        y_measure: String,
        x_value: Vec<Value>,
        y_value: Vec<Value>,
        /// Regression line evaluated at the smallest and largest x
        line_y_value: [f64; 2],
    },
    Clustering {
        x_measure: String,
        y_measure: String,
        x_value: Vec<Value>,
        y_value: Vec<Value>,
        /// Cluster id per group, -1 for noise
        label: Vec<i64>,
    },
}

/// A computed insight: numbers plus narration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightResult {
    pub iid: i64,
    pub insight_name: InsightKind,
    pub sentence: String,
    #[serde(flatten)]
    pub detail: InsightDetail,
}

/// Why an insight produced nothing to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoRenderReason {
    UnsupportedKind { kind: String },
    EmptySubset { sid: i64 },
}

/// Result of computing one insight
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightOutcome {
    Rendered(InsightResult),
    NothingToRender {
        iid: i64,
        #[serde(flatten)]
        reason: NoRenderReason,
    },
}

impl InsightOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, InsightOutcome::Rendered(_))
    }

    pub fn result(&self) -> Option<&InsightResult> {
        match self {
            InsightOutcome::Rendered(result) => Some(result),
            InsightOutcome::NothingToRender { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<InsightResult> {
        match self {
            InsightOutcome::Rendered(result) => Some(result),
            InsightOutcome::NothingToRender { .. } => None,
        }
    }

    pub fn sentence(&self) -> Option<&str> {
        self.result().map(|r| r.sentence.as_str())
    }
}
