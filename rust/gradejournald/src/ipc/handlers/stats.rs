use crate::aggregate;
use crate::format::stats_display;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_stats_class_table(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = aggregate::class_subject_table(state.store.records())
        .into_iter()
        .map(|r| {
            json!({
                "class": r.class,
                "subject": r.subject,
                "subjectLabel": r.subject.label(),
                "display": stats_display(&r.stats),
                "stats": r.stats,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "empty": rows.is_empty(),
            "rows": rows,
        }),
    )
}

fn handle_stats_overall_table(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = aggregate::overall_subject_table(state.store.records())
        .into_iter()
        .map(|r| {
            json!({
                "subject": r.subject,
                "subjectLabel": r.subject.label(),
                "display": stats_display(&r.stats),
                "stats": r.stats,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "empty": state.store.is_empty(),
            "rows": rows,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.classTable" => Some(handle_stats_class_table(state, req)),
        "stats.overallTable" => Some(handle_stats_overall_table(state, req)),
        _ => None,
    }
}
