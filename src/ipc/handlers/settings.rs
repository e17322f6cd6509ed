use crate::ipc::error::ok;
use crate::ipc::helpers::{get_patch_map, get_required_str, store_mut, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::settings::SettingsDomain;
use serde_json::{json, Value};

fn parse_domain(params: &Value) -> Result<SettingsDomain, HandlerErr> {
    let raw = get_required_str(params, "domain")?;
    SettingsDomain::parse(&raw).ok_or_else(|| {
        HandlerErr::bad_params(format!(
            "domain must be one of general, timer, noise (got {})",
            raw
        ))
    })
}

fn settings_get(state: &mut AppState, params: &Value) -> HandlerResult {
    let domain = parse_domain(params)?;
    let settings = match state.store.as_ref() {
        Some(store) => store.settings(domain),
        None => domain.fallback(),
    };
    Ok(json!({ "domain": domain.name(), "settings": settings }))
}

fn settings_update(state: &mut AppState, params: &Value) -> HandlerResult {
    let domain = parse_domain(params)?;
    let patch = get_patch_map(params)?;
    let store = store_mut(state)?;
    let settings = store.update_settings(domain, &patch)?;
    Ok(json!({ "domain": domain.name(), "settings": settings }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "settings.get" => settings_get(state, &req.params),
        "settings.update" => settings_update(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
