use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_optional_str, get_patch, get_required_str, store_mut, to_json, today, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::NewExitPrompt;
use crate::prompts::{prompt_usage, prompts_csv};
use serde_json::json;

fn prompts_list(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let Some(store) = state.store.as_ref() else {
        return Ok(json!({ "prompts": [] }));
    };
    let category = get_optional_str(params, "category");
    let prompts = store.exit_prompts(category.as_deref());
    Ok(json!({ "prompts": to_json(&prompts)? }))
}

fn prompts_create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let data = NewExitPrompt {
        prompt: get_required_str(params, "prompt")?,
        category: get_optional_str(params, "category").unwrap_or_default(),
        is_custom: params.get("isCustom").and_then(|v| v.as_bool()),
    };
    let prompt = store.create_exit_prompt(data)?;
    Ok(json!({ "prompt": to_json(&prompt)? }))
}

fn prompts_update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let prompt_id = get_required_str(params, "promptId")?;
    let patch = get_patch(params)?;
    match store.update_exit_prompt(&prompt_id, &patch)? {
        Some(p) => Ok(json!({ "prompt": to_json(&p)? })),
        None => Err(HandlerErr::not_found("prompt")),
    }
}

fn prompts_delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let prompt_id = get_required_str(params, "promptId")?;
    let force = params
        .get("force")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let Some(prompt) = store.exit_prompt(&prompt_id) else {
        return Err(HandlerErr::not_found("prompt"));
    };
    // The library screens only let users remove their own prompts.
    if !prompt.is_custom && !force {
        return Err(HandlerErr::new(
            "built_in_prompt",
            "Cannot delete built-in prompts",
        ));
    }
    store.delete_exit_prompt(&prompt_id)?;
    Ok(json!({ "ok": true }))
}

fn prompts_mark_used(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let prompt_id = get_required_str(params, "promptId")?;
    match store.mark_prompt_used(&prompt_id)? {
        Some(p) => Ok(json!({ "prompt": to_json(&p)? })),
        None => Err(HandlerErr::not_found("prompt")),
    }
}

fn prompts_random(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let category = get_optional_str(params, "category");
    let picked = store.random_prompt(category.as_deref())?;
    Ok(json!({ "prompt": to_json(&picked)? }))
}

fn prompts_usage(state: &mut AppState) -> HandlerResult {
    let prompts = match state.store.as_ref() {
        Some(store) => store.exit_prompts(None),
        None => Vec::new(),
    };
    to_json(&prompt_usage(&prompts))
}

fn prompts_export_csv(state: &mut AppState) -> HandlerResult {
    let store = store_mut(state)?;
    let prompts = store.exit_prompts(None);
    Ok(json!({
        "fileName": format!("exit-tickets-data-{}.csv", today()),
        "csv": prompts_csv(&prompts)
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "prompts.list" => prompts_list(state, &req.params),
        "prompts.create" => prompts_create(state, &req.params),
        "prompts.update" => prompts_update(state, &req.params),
        "prompts.delete" => prompts_delete(state, &req.params),
        "prompts.markUsed" => prompts_mark_used(state, &req.params),
        "prompts.random" => prompts_random(state, &req.params),
        "prompts.usage" => prompts_usage(state),
        "prompts.exportCsv" => prompts_export_csv(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
