use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::SqliteKv;
use crate::error::StoreError;
use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::store::ClassroomStore;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new("not_found", format!("{} not found", what))
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let message = match &e {
            StoreError::Validation(m) => m.clone(),
            _ => e.to_string(),
        };
        Self::new(e.code(), message)
    }
}

pub type HandlerResult = Result<Value, HandlerErr>;

pub fn store_mut(state: &mut AppState) -> Result<&mut ClassroomStore<SqliteKv>, HandlerErr> {
    state
        .store
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn get_required_bool(params: &Value, key: &str) -> Result<bool, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be boolean", key)))
}

pub fn get_patch(params: &Value) -> Result<Value, HandlerErr> {
    match params.get("patch") {
        Some(p @ Value::Object(_)) => Ok(p.clone()),
        Some(_) => Err(HandlerErr::bad_params("patch must be an object")),
        None => Err(HandlerErr::bad_params("missing patch")),
    }
}

pub fn get_patch_map(params: &Value) -> Result<Map<String, Value>, HandlerErr> {
    match get_patch(params)? {
        Value::Object(m) => Ok(m),
        _ => Err(HandlerErr::bad_params("patch must be an object")),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr::new("encode_failed", e.to_string()))
}

/// `YYYY-MM-DD` in UTC, used for download file names and report headers.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
