use crate::backup::default_export_file_name;
use crate::ipc::error::ok;
use crate::ipc::helpers::{store_mut, to_json, today, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::store::parse_import_text;
use serde_json::{json, Value};

fn data_export(state: &mut AppState) -> HandlerResult {
    let store = store_mut(state)?;
    Ok(json!({
        "fileName": default_export_file_name(&today()),
        "data": to_json(&store.export_all())?
    }))
}

/// Accepts the snapshot either as `data` (a JSON value) or `text` (raw file
/// contents).
fn data_import(state: &mut AppState, params: &Value) -> HandlerResult {
    let store = store_mut(state)?;
    let data = match (params.get("data"), params.get("text").and_then(|v| v.as_str())) {
        (Some(d), _) => d.clone(),
        (None, Some(text)) => parse_import_text(text)?,
        (None, None) => return Err(HandlerErr::bad_params("missing data")),
    };
    let fields = store.import_all(&data)?;
    Ok(json!({ "ok": true, "imported": fields }))
}

fn data_reset(state: &mut AppState) -> HandlerResult {
    let store = store_mut(state)?;
    let seeded = store.reset_all()?;
    Ok(json!({ "ok": true, "seeded": seeded }))
}

fn data_stats(state: &mut AppState) -> HandlerResult {
    let store = store_mut(state)?;
    to_json(&store.app_stats())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "data.export" => data_export(state),
        "data.import" => data_import(state, &req.params),
        "data.reset" => data_reset(state),
        "data.stats" => data_stats(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
