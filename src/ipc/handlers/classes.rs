use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_optional_str, get_patch, get_required_str, store_mut, to_json, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::NewClass;
use serde_json::json;

fn classes_list(state: &mut AppState) -> HandlerResult {
    let Some(store) = state.store.as_ref() else {
        return Ok(json!({ "classes": [] }));
    };

    // Include student counts so the UI can show a useful dashboard.
    let students = store.students(None);
    let mut classes = Vec::new();
    for c in store.classes() {
        let count = students.iter().filter(|s| s.class_id == c.id).count();
        let mut v = to_json(&c)?;
        v["studentCount"] = json!(count);
        classes.push(v);
    }
    Ok(json!({ "classes": classes }))
}

fn classes_create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let data = NewClass {
        name: get_required_str(params, "name")?,
        period: get_optional_str(params, "period"),
    };
    let class = store.create_class(data)?;
    Ok(json!({ "class": to_json(&class)? }))
}

fn classes_update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let patch = get_patch(params)?;
    match store.update_class(&class_id, &patch)? {
        Some(class) => Ok(json!({ "class": to_json(&class)? })),
        None => Err(HandlerErr::not_found("class")),
    }
}

fn classes_delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    if !store.delete_class(&class_id)? {
        return Err(HandlerErr::not_found("class"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => classes_list(state),
        "classes.create" => classes_create(state, &req.params),
        "classes.update" => classes_update(state, &req.params),
        "classes.delete" => classes_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
