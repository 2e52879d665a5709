use crate::schema::{Field, StudentRecord};
use serde::Serialize;
use std::collections::BTreeMap;

pub const GRADES: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStatistics {
    pub average: f64,
    pub median: f64,
    /// Empty when no grades were found; otherwise keys 1..=5.
    pub grade_count: BTreeMap<u8, usize>,
    pub grade_percent: BTreeMap<u8, f64>,
}

impl SubjectStatistics {
    pub fn count(&self, grade: u8) -> usize {
        self.grade_count.get(&grade).copied().unwrap_or(0)
    }

    pub fn percent(&self, grade: u8) -> f64 {
        self.grade_percent.get(&grade).copied().unwrap_or(0.0)
    }
}

pub fn round_off_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Parsed grades for `subject`; ungraded and unparseable values are dropped.
pub fn subject_grades(records: &[StudentRecord], subject: Field) -> Vec<i64> {
    records.iter().filter_map(|r| r.grade(subject)).collect()
}

pub fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|v| *v as f64).sum();
    Some(sum / values.len() as f64)
}

pub fn median(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid] as f64)
    } else {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    }
}

/// Out-of-range values (e.g. 0 or 7) still move the mean and median but land
/// in no bucket.
pub fn subject_stats(records: &[StudentRecord], subject: Field) -> SubjectStatistics {
    let grades = subject_grades(records, subject);
    let (Some(average), Some(median)) = (mean(&grades), median(&grades)) else {
        return SubjectStatistics::default();
    };

    let total = grades.len() as f64;
    let mut grade_count = BTreeMap::new();
    let mut grade_percent = BTreeMap::new();
    for g in GRADES {
        let n = grades.iter().filter(|v| **v == i64::from(g)).count();
        grade_count.insert(g, n);
        grade_percent.insert(g, round_off_2_decimals(n as f64 / total * 100.0));
    }

    SubjectStatistics {
        average,
        median,
        grade_count,
        grade_percent,
    }
}
