use crate::exchange::json_text;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::types::{AppState, Request};
use crate::schema::{Field, StudentRecord};
use serde_json::json;
use tracing::{info, warn};

/// Keys may be canonical names or any known header alias; anything else is
/// kept as an extra column.
fn parse_student(req: &Request) -> Result<StudentRecord, serde_json::Value> {
    let Some(obj) = req.params.get("student").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing params.student", None));
    };
    let mut rec = StudentRecord::default();
    for (key, value) in obj {
        if key == "extra" {
            let Some(extra) = value.as_object() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    "params.student.extra must be an object",
                    None,
                ));
            };
            for (label, v) in extra {
                rec.extra.insert(label.trim().to_string(), json_text(v));
            }
            continue;
        }
        match Field::from_label(key) {
            Some(field) => rec.set(field, json_text(value)),
            None => {
                rec.extra.insert(key.trim().to_string(), json_text(value));
            }
        }
    }
    Ok(rec)
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "students": state.store.records(),
            "selectedIndex": state.store.selected(),
        }),
    )
}

fn handle_students_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(index) = req.params.get("index").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing params.index", None);
    };
    match state.store.select(index) {
        Ok(student) => ok(&req.id, json!({ "index": index, "student": student })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_students_clear_selection(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.store.clear_selection();
    ok(&req.id, json!({ "selectedIndex": null }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = match parse_student(req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.store.add(student) {
        Ok(index) => {
            info!(index, records = state.store.len(), "student added");
            ok(
                &req.id,
                json!({ "index": index, "recordCount": state.store.len() }),
            )
        }
        Err(e) => {
            warn!(error = %e, "student add rejected");
            store_err(&req.id, &e)
        }
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = match parse_student(req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.store.update_selected(student) {
        Ok(index) => {
            info!(index, "student updated");
            ok(&req.id, json!({ "index": index }))
        }
        Err(e) => {
            warn!(error = %e, "student update rejected");
            store_err(&req.id, &e)
        }
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.delete_selected() {
        Ok((index, student)) => {
            info!(index, records = state.store.len(), "student deleted");
            ok(
                &req.id,
                json!({
                    "index": index,
                    "student": student,
                    "recordCount": state.store.len(),
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "student delete rejected");
            store_err(&req.id, &e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.select" => Some(handle_students_select(state, req)),
        "students.clearSelection" => Some(handle_students_clear_selection(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
