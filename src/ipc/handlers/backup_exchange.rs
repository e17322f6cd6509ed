use crate::backup;
use crate::error::StoreError;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, store_mut, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn bundle_err(e: anyhow::Error) -> HandlerErr {
    match e.downcast_ref::<StoreError>() {
        Some(se) => HandlerErr::new(se.code(), se.to_string()),
        None => HandlerErr::new("io_failed", format!("{e:#}")),
    }
}

fn backup_export_bundle(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let store = store_mut(state)?;
    let summary = backup::export_bundle(store, &out_path)
        .map_err(bundle_err)?;
    Ok(json!({
        "ok": true,
        "path": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count
    }))
}

fn backup_import_bundle(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let store = store_mut(state)?;
    let summary = backup::import_bundle(store, &in_path)
        .map_err(bundle_err)?;
    Ok(json!({
        "ok": true,
        "bundleFormatDetected": summary.bundle_format_detected,
        "imported": summary.fields
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.exportBundle" => backup_export_bundle(state, &req.params),
        "backup.importBundle" => backup_import_bundle(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
