use crate::calc::{self, SubjectStatistics, GRADES};
use crate::schema::{Field, StudentRecord, SUBJECTS};
use crate::store::enumerate_classes;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSubjectStats {
    pub class: String,
    pub subject: Field,
    pub stats: SubjectStatistics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject: Field,
    pub stats: SubjectStatistics,
}

/// Line chart: x = classes, one series per subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassAverageSeries {
    pub labels: Vec<String>,
    pub series: Vec<(Field, Vec<f64>)>,
}

/// Grouped bars: x = subjects, one series per grade.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeDistributionSeries {
    pub labels: Vec<Field>,
    pub series: Vec<(u8, Vec<usize>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallPerformanceSeries {
    pub labels: Vec<Field>,
    pub averages: Vec<f64>,
}

fn class_records(records: &[StudentRecord], class: &str) -> Vec<StudentRecord> {
    records
        .iter()
        .filter(|r| r.class.trim() == class)
        .cloned()
        .collect()
}

pub fn class_subject_table(records: &[StudentRecord]) -> Vec<ClassSubjectStats> {
    let mut rows = Vec::new();
    for class in enumerate_classes(records) {
        let members = class_records(records, &class);
        for subject in SUBJECTS {
            rows.push(ClassSubjectStats {
                class: class.clone(),
                subject,
                stats: calc::subject_stats(&members, subject),
            });
        }
    }
    rows
}

pub fn overall_subject_table(records: &[StudentRecord]) -> Vec<SubjectStats> {
    SUBJECTS
        .iter()
        .map(|subject| SubjectStats {
            subject: *subject,
            stats: calc::subject_stats(records, *subject),
        })
        .collect()
}

/// Classes without grades for a subject plot as 0.
pub fn class_average_series(records: &[StudentRecord]) -> ClassAverageSeries {
    let labels = enumerate_classes(records);
    let per_class: Vec<Vec<StudentRecord>> =
        labels.iter().map(|c| class_records(records, c)).collect();
    let series = SUBJECTS
        .iter()
        .map(|subject| {
            let data = per_class
                .iter()
                .map(|members| calc::subject_stats(members, *subject).average)
                .collect();
            (*subject, data)
        })
        .collect();
    ClassAverageSeries { labels, series }
}

pub fn grade_distribution_series(records: &[StudentRecord]) -> GradeDistributionSeries {
    let overall = overall_subject_table(records);
    let series = GRADES
        .map(|g| (g, overall.iter().map(|s| s.stats.count(g)).collect()))
        .collect();
    GradeDistributionSeries {
        labels: SUBJECTS.to_vec(),
        series,
    }
}

pub fn overall_performance_series(records: &[StudentRecord]) -> OverallPerformanceSeries {
    OverallPerformanceSeries {
        labels: SUBJECTS.to_vec(),
        averages: overall_subject_table(records)
            .into_iter()
            .map(|s| s.stats.average)
            .collect(),
    }
}
