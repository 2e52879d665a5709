use crate::exchange::ExchangeError;
use crate::store::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn store_err(id: &str, e: &StoreError) -> serde_json::Value {
    let details = match e {
        StoreError::Validation { field } => Some(json!({ "field": field })),
        StoreError::IndexOutOfRange { index, len } => Some(json!({ "index": index, "len": len })),
        StoreError::NoSelection => None,
    };
    err(id, e.code(), e.to_string(), details)
}

pub fn exchange_err(id: &str, e: &ExchangeError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}
