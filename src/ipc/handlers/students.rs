use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_optional_str, get_patch, get_required_str, store_mut, to_json, today, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::NewStudent;
use crate::roster::{dated_file_name, parse_roster_csv, students_csv, ROSTER_TEMPLATE};
use serde_json::json;

fn students_list(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let Some(store) = state.store.as_ref() else {
        return Ok(json!({ "students": [] }));
    };
    let class_id = get_optional_str(params, "classId");
    let students = store.students(class_id.as_deref());
    Ok(json!({ "students": to_json(&students)? }))
}

fn students_create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let data = NewStudent {
        name: get_required_str(params, "name")?,
        class_id: get_optional_str(params, "classId").unwrap_or_default(),
        student_id: get_optional_str(params, "studentId"),
        present: params.get("present").and_then(|v| v.as_bool()),
    };
    let student = store.create_student(data)?;
    Ok(json!({ "student": to_json(&student)? }))
}

fn students_update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let patch = get_patch(params)?;
    match store.update_student(&student_id, &patch)? {
        Some(s) => Ok(json!({ "student": to_json(&s)? })),
        None => Err(HandlerErr::not_found("student")),
    }
}

fn students_delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let student_id = get_required_str(params, "studentId")?;
    if !store.delete_student(&student_id)? {
        return Err(HandlerErr::not_found("student"));
    }
    Ok(json!({ "ok": true }))
}

fn students_import_csv(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let csv = get_required_str(params, "csv")?;
    if store.class(&class_id).is_none() {
        return Err(HandlerErr::not_found("class"));
    }
    let names = parse_roster_csv(&csv)?;
    let report = store.import_roster(&class_id, &names)?;
    to_json(&report)
}

fn students_export_csv(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let store = store_mut(state)?;
    let class_id = get_required_str(params, "classId")?;
    let class_name = store
        .class(&class_id)
        .map(|c| c.name)
        .unwrap_or_else(|| "Unknown".to_string());
    let students = store.students(Some(&class_id));
    Ok(json!({
        "fileName": dated_file_name(&class_name, "students", &today(), "csv"),
        "csv": students_csv(&students),
        "count": students.len()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state, &req.params),
        "students.create" => students_create(state, &req.params),
        "students.update" => students_update(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        "students.importCsv" => students_import_csv(state, &req.params),
        "students.exportCsv" => students_export_csv(state, &req.params),
        "students.csvTemplate" => Ok(json!({
            "fileName": "students-template.csv",
            "csv": ROSTER_TEMPLATE
        })),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
