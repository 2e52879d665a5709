use crate::exchange::{self, ExchangeError, FileFormat};
use crate::ipc::error::{err, exchange_err, ok};
use crate::ipc::types::{AppState, Request};
use crate::sample::sample_records;
use crate::schema::{normalize_table, StudentRecord, SUBJECTS};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn required_path(req: &Request) -> Result<PathBuf, serde_json::Value> {
    req.params
        .get("path")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| err(&req.id, "bad_params", "missing params.path", None))
}

/// Explicit `params.format` wins over the file extension.
fn resolve_format(req: &Request, path: &Path) -> Result<FileFormat, ExchangeError> {
    match req.params.get("format").and_then(|v| v.as_str()) {
        Some(f) => FileFormat::parse(f),
        None => FileFormat::from_path(path),
    }
}

fn subjects_json() -> Vec<serde_json::Value> {
    SUBJECTS
        .iter()
        .map(|s| json!({ "subject": s, "label": s.label() }))
        .collect()
}

fn replace_journal(state: &mut AppState, records: Vec<StudentRecord>, source: String) -> serde_json::Value {
    let count = records.len();
    state.store.bulk_load(records, source.clone());
    info!(records = count, source = %source, "journal loaded");
    json!({
        "recordCount": count,
        "classes": state.store.enumerate_classes(),
    })
}

fn handle_journal_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "recordCount": state.store.len(),
            "classes": state.store.enumerate_classes(),
            "subjects": subjects_json(),
            "loadedAt": state.store.loaded_at().map(|t| t.to_rfc3339()),
            "source": state.store.source(),
        }),
    )
}

fn handle_journal_load_sample(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = replace_journal(state, sample_records(), "sample".to_string());
    ok(&req.id, result)
}

fn handle_journal_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_path(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let decoded = resolve_format(req, &path).and_then(|format| exchange::decode_file(&path, format));
    match decoded {
        Ok(raw) => {
            let records = normalize_table(&raw);
            let result = replace_journal(state, records, path.to_string_lossy().to_string());
            ok(&req.id, result)
        }
        Err(e) => {
            warn!(path = %path.to_string_lossy(), error = %e, "import failed; journal unchanged");
            exchange_err(&req.id, &e)
        }
    }
}

fn handle_journal_load_rows(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(rows) = req.params.get("rows") else {
        return err(&req.id, "bad_params", "missing params.rows", None);
    };
    match exchange::load_rows(rows) {
        Ok(raw) => {
            let records = normalize_table(&raw);
            let result = replace_journal(state, records, "rows".to_string());
            ok(&req.id, result)
        }
        Err(e) => {
            warn!(error = %e, "row load failed; journal unchanged");
            exchange_err(&req.id, &e)
        }
    }
}

fn handle_journal_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_path(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let exported = resolve_format(req, &path).and_then(|format| {
        let bytes = exchange::encode(state.store.records(), format, &state.config.export)?;
        exchange::write_file(&path, &bytes)?;
        Ok((format, bytes.len()))
    });
    match exported {
        Ok((format, len)) => {
            info!(
                path = %path.to_string_lossy(),
                format = format.as_str(),
                records = state.store.len(),
                bytes = len,
                "journal exported"
            );
            ok(
                &req.id,
                json!({
                    "path": path.to_string_lossy(),
                    "format": format.as_str(),
                    "bytes": len,
                    "rowCount": state.store.len(),
                }),
            )
        }
        Err(e) => {
            warn!(path = %path.to_string_lossy(), error = %e, "export failed");
            exchange_err(&req.id, &e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "journal.info" => Some(handle_journal_info(state, req)),
        "journal.loadSample" => Some(handle_journal_load_sample(state, req)),
        "journal.import" => Some(handle_journal_import(state, req)),
        "journal.loadRows" => Some(handle_journal_load_rows(state, req)),
        "journal.export" => Some(handle_journal_export(state, req)),
        _ => None,
    }
}
