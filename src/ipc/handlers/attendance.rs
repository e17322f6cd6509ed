use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_required_bool, get_required_str, store_mut, to_json, today, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::roster::{attendance_report, attendance_summary, dated_file_name, make_groups, pick_random};
use serde_json::json;

fn attendance_set(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let student_id = get_required_str(params, "studentId")?;
    // Without an explicit value the current state is flipped.
    let updated = match params.get("present") {
        None | Some(serde_json::Value::Null) => store.toggle_attendance(&student_id)?,
        Some(v) => {
            let present = v
                .as_bool()
                .ok_or_else(|| HandlerErr::bad_params("present must be boolean"))?;
            store.set_attendance(&student_id, present)?
        }
    };
    match updated {
        Some(s) => Ok(json!({ "student": to_json(&s)? })),
        None => Err(HandlerErr::not_found("student")),
    }
}

fn attendance_mark_all(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let present = get_required_bool(params, "present")?;
    let updated = store.mark_all(&class_id, present)?;
    Ok(json!({ "updated": updated }))
}

fn attendance_summary_open(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let class_id = get_required_str(params, "classId")?;
    let students = match state.store.as_ref() {
        Some(store) => store.students(Some(&class_id)),
        None => Vec::new(),
    };
    to_json(&attendance_summary(&students))
}

fn attendance_report_open(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let Some(class) = store.class(&class_id) else {
        return Err(HandlerErr::not_found("class"));
    };
    let students = store.students(Some(&class_id));
    let date = today();
    Ok(json!({
        "fileName": dated_file_name(&class.name, "attendance", &date, "txt"),
        "text": attendance_report(&class.name, &students, &date)
    }))
}

fn picker_pick(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let class_id = get_required_str(params, "classId")?;
    let students = match state.store.as_ref() {
        Some(store) => store.students(Some(&class_id)),
        None => Vec::new(),
    };
    Ok(json!({ "student": to_json(&pick_random(&students))? }))
}

fn picker_groups(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let size = params
        .get("size")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| HandlerErr::bad_params("size must be a positive integer"))?;
    let shuffle = params
        .get("shuffle")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let students = store.students(Some(&class_id));
    let groups = make_groups(&students, size as usize, shuffle)?;
    Ok(json!({ "groups": to_json(&groups)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.set" => attendance_set(state, &req.params),
        "attendance.markAll" => attendance_mark_all(state, &req.params),
        "attendance.summary" => attendance_summary_open(state, &req.params),
        "attendance.report" => attendance_report_open(state, &req.params),
        "picker.pick" => picker_pick(state, &req.params),
        "picker.groups" => picker_groups(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
