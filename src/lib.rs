//! Local persistence for a classroom utility suite: classes, students,
//! exit-ticket prompts and settings over a pluggable key-value backend, plus
//! the JSON-lines IPC surface the `classroomd` sidecar exposes.

pub mod backup;
pub mod csv;
pub mod db;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod kv;
pub mod models;
pub mod prompts;
pub mod roster;
pub mod settings;
pub mod store;

pub use error::{Result, StoreError};
pub use kv::{KeyValue, MemoryKv};
pub use models::{
    ClassRecord, ExitPromptRecord, NewClass, NewExitPrompt, NewStudent, Snapshot, StudentRecord,
};
pub use settings::SettingsDomain;
pub use store::ClassroomStore;
