use crate::calc::{SubjectStatistics, GRADES};
use serde::Serialize;

/// Table-ready strings; "0"/"0.00" where a bucket has no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDisplay {
    pub average: String,
    pub median: String,
    pub counts: Vec<String>,
    pub percents: Vec<String>,
}

pub fn fixed2(x: f64) -> String {
    format!("{:.2}", x)
}

pub fn stats_display(stats: &SubjectStatistics) -> StatsDisplay {
    StatsDisplay {
        average: fixed2(stats.average),
        median: fixed2(stats.median),
        counts: GRADES.map(|g| stats.count(g).to_string()).collect(),
        percents: GRADES.map(|g| fixed2(stats.percent(g))).collect(),
    }
}
