use crate::aggregate;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::schema::Field;
use serde_json::json;

fn subject_labels(subjects: &[Field]) -> Vec<&'static str> {
    subjects.iter().map(|s| s.label()).collect()
}

fn handle_charts_class_averages(state: &mut AppState, req: &Request) -> serde_json::Value {
    let series = aggregate::class_average_series(state.store.records());
    let datasets: Vec<serde_json::Value> = series
        .series
        .iter()
        .map(|(subject, data)| {
            json!({
                "subject": subject,
                "label": subject.label(),
                "data": data,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "empty": series.labels.is_empty(),
            "labels": series.labels,
            "datasets": datasets,
        }),
    )
}

fn handle_charts_grade_distribution(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dist = aggregate::grade_distribution_series(state.store.records());
    let datasets: Vec<serde_json::Value> = dist
        .series
        .iter()
        .map(|(grade, data)| {
            json!({
                "grade": grade,
                "label": format!("Оценка {}", grade),
                "data": data,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "empty": state.store.is_empty(),
            "labels": subject_labels(&dist.labels),
            "subjects": dist.labels,
            "datasets": datasets,
        }),
    )
}

fn handle_charts_overall_performance(state: &mut AppState, req: &Request) -> serde_json::Value {
    let perf = aggregate::overall_performance_series(state.store.records());
    ok(
        &req.id,
        json!({
            "empty": state.store.is_empty(),
            "labels": subject_labels(&perf.labels),
            "subjects": perf.labels,
            "label": "Средняя оценка",
            "data": perf.averages,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "charts.classAverages" => Some(handle_charts_class_averages(state, req)),
        "charts.gradeDistribution" => Some(handle_charts_grade_distribution(state, req)),
        "charts.overallPerformance" => Some(handle_charts_overall_performance(state, req)),
        _ => None,
    }
}
