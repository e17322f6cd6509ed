//! Typed CRUD over the key-value backend.
//!
//! Every collection lives under one key as a JSON array. Reads never fail:
//! a missing key, a backend read error or an unparseable payload all yield
//! the fallback the accessor passes to [`ClassroomStore::load_or`]. Inside a
//! readable array each record stands alone: one that does not fit the record
//! type is hidden from typed reads but survives every write. Writes
//! re-serialize the whole collection.

use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::defaults::{DEFAULT_CLASSES, DEFAULT_PROMPTS};
use crate::error::{Result, StoreError};
use crate::kv::KeyValue;
use crate::models::{
    non_blank, ClassRecord, ExitPromptRecord, NewClass, NewExitPrompt, NewStudent, Snapshot,
    StudentRecord,
};
use crate::prompts::pick_prompt;
use crate::settings::{shallow_merge, SettingsDomain};

pub mod keys {
    pub const CLASSES: &str = "classroom_classes";
    pub const STUDENTS: &str = "classroom_students";
    pub const EXIT_PROMPTS: &str = "classroom_exit_prompts";
    pub const SETTINGS: &str = "classroom_settings";
    pub const TIMER_SETTINGS: &str = "classroom_timer_settings";
    pub const NOISE_SETTINGS: &str = "classroom_noise_settings";

    pub const ALL: [&str; 6] = [
        CLASSES,
        STUDENTS,
        EXIT_PROMPTS,
        SETTINGS,
        TIMER_SETTINGS,
        NOISE_SETTINGS,
    ];
}

/// Export document field -> storage key.
const SNAPSHOT_FIELDS: [(&str, &str); 6] = [
    ("classes", keys::CLASSES),
    ("students", keys::STUDENTS),
    ("settings", keys::SETTINGS),
    ("exitPrompts", keys::EXIT_PROMPTS),
    ("timerSettings", keys::TIMER_SETTINGS),
    ("noiseSettings", keys::NOISE_SETTINGS),
];

/// RFC 3339 UTC with millisecond precision, e.g. `2026-10-16T08:00:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;

    /// `(field, value, message)` for every required text field.
    fn required(&self) -> Vec<(&'static str, &str, &'static str)>;
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(message));
    }
    Ok(())
}

/// Checks the required fields that `patch` names. Stored records may already
/// carry blanks (imports are not validated) and untouched fields stay as-is.
fn require_patched<T: Record>(record: &T, patch: &Map<String, Value>) -> Result<()> {
    for (field, value, message) in record.required() {
        if patch.contains_key(field) {
            require(value, message)?;
        }
    }
    Ok(())
}

impl Record for ClassRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn required(&self) -> Vec<(&'static str, &str, &'static str)> {
        vec![("name", &self.name, "Class name is required")]
    }
}

impl Record for StudentRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn required(&self) -> Vec<(&'static str, &str, &'static str)> {
        vec![
            ("name", &self.name, "Student name is required"),
            ("classId", &self.class_id, "Class ID is required"),
        ]
    }
}

impl Record for ExitPromptRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn required(&self) -> Vec<(&'static str, &str, &'static str)> {
        vec![
            ("prompt", &self.prompt, "Prompt text is required"),
            ("category", &self.category, "Category is required"),
        ]
    }
}

/// One element of a stored collection. Elements that do not parse as the
/// record type are kept verbatim and written back unchanged.
#[derive(Serialize)]
#[serde(untagged)]
enum Slot<T> {
    Parsed(T),
    Opaque(Value),
}

impl<T: Record> Slot<T> {
    fn from_value(v: Value) -> Self {
        match serde_json::from_value::<T>(v.clone()) {
            Ok(r) => Slot::Parsed(r),
            Err(e) => {
                warn!("keeping unreadable record as-is: {}", e);
                Slot::Opaque(v)
            }
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Slot::Parsed(r) => Some(r.id()),
            Slot::Opaque(v) => v.get("id").and_then(|id| id.as_str()),
        }
    }

    fn parsed(self) -> Option<T> {
        match self {
            Slot::Parsed(r) => Some(r),
            Slot::Opaque(_) => None,
        }
    }
}

/// Shallow-merges `patch` over `record`. `id` and `createdAt` are not patchable.
fn apply_patch<T: Record>(record: &T, patch: &Map<String, Value>) -> Result<T> {
    let mut merged = match serde_json::to_value(record)? {
        Value::Object(m) => m,
        _ => return Err(StoreError::storage("record did not serialize to an object")),
    };
    for (k, v) in patch {
        if k == "id" || k == "createdAt" {
            continue;
        }
        merged.insert(k.clone(), v.clone());
    }
    serde_json::from_value(Value::Object(merged))
        .map_err(|e| StoreError::validation(format!("invalid update: {}", e)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub classes: usize,
    pub prompts: usize,
}

impl SeedReport {
    pub fn seeded_anything(&self) -> bool {
        self.classes > 0 || self.prompts > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterImport {
    pub imported: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStats {
    pub classes: usize,
    pub students: usize,
    pub exit_prompts: usize,
    pub custom_prompts: usize,
    pub storage_kb: f64,
}

pub struct ClassroomStore<K: KeyValue> {
    kv: K,
}

impl<K: KeyValue> ClassroomStore<K> {
    /// Wraps a backend without touching it.
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Wraps a backend and seeds default classes and prompts where missing.
    pub fn open(kv: K) -> Result<(Self, SeedReport)> {
        let mut store = Self::new(kv);
        let report = store.seed_defaults()?;
        Ok((store, report))
    }

    pub fn backend(&self) -> &K {
        &self.kv
    }

    pub fn into_backend(self) -> K {
        self.kv
    }

    /// Reads `key`, returning `fallback` when it is absent, unreadable or corrupt.
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                warn!("reading {} failed, using fallback: {}", key, e);
                return fallback;
            }
        };
        if raw.trim().is_empty() {
            return fallback;
        }
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("error parsing stored {}, using fallback: {}", key, e);
                fallback
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        debug!("write {} ({} bytes)", key, raw.len());
        self.kv.set(key, &raw)
    }

    fn slots<T: Record>(&self, key: &str) -> Vec<Slot<T>> {
        let raw: Vec<Value> = self.load_or(key, Vec::new());
        raw.into_iter().map(Slot::from_value).collect()
    }

    fn records<T: Record>(&self, key: &str) -> Vec<T> {
        self.slots(key).into_iter().filter_map(Slot::parsed).collect()
    }

    fn push_record<T: Record>(&mut self, key: &str, record: T) -> Result<()> {
        let mut slots: Vec<Slot<T>> = self.slots(key);
        slots.push(Slot::Parsed(record));
        self.save(key, &slots)
    }

    fn update_in<T: Record>(&mut self, key: &str, id: &str, patch: &Value) -> Result<Option<T>> {
        let Some(patch) = patch.as_object() else {
            return Err(StoreError::validation("update must be a JSON object"));
        };
        let mut slots: Vec<Slot<T>> = self.slots(key);
        let found = slots.iter_mut().find_map(|slot| match slot {
            Slot::Parsed(r) if r.id() == id => Some(r),
            _ => None,
        });
        let Some(record) = found else {
            return Ok(None);
        };
        let updated = apply_patch(record, patch)?;
        require_patched(&updated, patch)?;
        *record = updated.clone();
        self.save(key, &slots)?;
        Ok(Some(updated))
    }

    fn delete_in<T: Record>(&mut self, key: &str, id: &str) -> Result<bool> {
        let slots: Vec<Slot<T>> = self.slots(key);
        let before = slots.len();
        let remaining: Vec<Slot<T>> = slots.into_iter().filter(|s| s.id() != Some(id)).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.save(key, &remaining)?;
        Ok(true)
    }

    // Classes

    pub fn classes(&self) -> Vec<ClassRecord> {
        self.records(keys::CLASSES)
    }

    pub fn class(&self, id: &str) -> Option<ClassRecord> {
        self.classes().into_iter().find(|c| c.id == id)
    }

    pub fn create_class(&mut self, data: NewClass) -> Result<ClassRecord> {
        require(&data.name, "Class name is required")?;
        let record = ClassRecord {
            id: new_id(),
            name: data.name.trim().to_string(),
            period: non_blank(data.period),
            created_at: timestamp_now(),
            extra: Map::new(),
        };
        self.push_record(keys::CLASSES, record.clone())?;
        Ok(record)
    }

    pub fn update_class(&mut self, id: &str, patch: &Value) -> Result<Option<ClassRecord>> {
        self.update_in(keys::CLASSES, id, patch)
    }

    /// Removes the class and every student whose `classId` points at it.
    ///
    /// Students are written before classes through [`KeyValue::set_many`];
    /// whether the pair is atomic depends on the backend.
    pub fn delete_class(&mut self, id: &str) -> Result<bool> {
        let classes: Vec<Slot<ClassRecord>> = self.slots(keys::CLASSES);
        let before = classes.len();
        let remaining: Vec<Slot<ClassRecord>> =
            classes.into_iter().filter(|c| c.id() != Some(id)).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        let students: Vec<Slot<StudentRecord>> = self
            .slots(keys::STUDENTS)
            .into_iter()
            .filter(|slot: &Slot<StudentRecord>| match slot {
                Slot::Parsed(s) => s.class_id != id,
                Slot::Opaque(v) => v.get("classId").and_then(|c| c.as_str()) != Some(id),
            })
            .collect();
        self.kv.set_many(&[
            (keys::STUDENTS, serde_json::to_string(&students)?),
            (keys::CLASSES, serde_json::to_string(&remaining)?),
        ])?;
        debug!("deleted class {} with its students", id);
        Ok(true)
    }

    // Students

    /// All students, or only those of `class_id`. Orphans show up only in the
    /// unfiltered list.
    pub fn students(&self, class_id: Option<&str>) -> Vec<StudentRecord> {
        let all: Vec<StudentRecord> = self.records(keys::STUDENTS);
        match class_id {
            Some(cid) => all.into_iter().filter(|s| s.class_id == cid).collect(),
            None => all,
        }
    }

    pub fn student(&self, id: &str) -> Option<StudentRecord> {
        self.students(None).into_iter().find(|s| s.id == id)
    }

    fn build_student(data: NewStudent) -> Result<StudentRecord> {
        require(&data.name, "Student name is required")?;
        require(&data.class_id, "Class ID is required")?;
        Ok(StudentRecord {
            id: new_id(),
            name: data.name.trim().to_string(),
            student_id: non_blank(data.student_id),
            class_id: data.class_id,
            present: data.present.unwrap_or(true),
            created_at: timestamp_now(),
            extra: Map::new(),
        })
    }

    pub fn create_student(&mut self, data: NewStudent) -> Result<StudentRecord> {
        let record = Self::build_student(data)?;
        self.push_record(keys::STUDENTS, record.clone())?;
        Ok(record)
    }

    pub fn update_student(&mut self, id: &str, patch: &Value) -> Result<Option<StudentRecord>> {
        self.update_in(keys::STUDENTS, id, patch)
    }

    pub fn delete_student(&mut self, id: &str) -> Result<bool> {
        self.delete_in::<StudentRecord>(keys::STUDENTS, id)
    }

    /// Adds one student per name in a single write. Names that fail
    /// validation are counted, not fatal.
    pub fn import_roster(&mut self, class_id: &str, names: &[String]) -> Result<RosterImport> {
        let mut students: Vec<Slot<StudentRecord>> = self.slots(keys::STUDENTS);
        let mut report = RosterImport::default();
        for name in names {
            match Self::build_student(NewStudent::new(name.as_str(), class_id)) {
                Ok(s) => {
                    students.push(Slot::Parsed(s));
                    report.imported += 1;
                }
                Err(e) => {
                    warn!("skipping roster row {:?}: {}", name, e);
                    report.failed += 1;
                }
            }
        }
        if report.imported > 0 {
            self.save(keys::STUDENTS, &students)?;
        }
        info!(
            "roster import into {}: {} imported, {} failed",
            class_id, report.imported, report.failed
        );
        Ok(report)
    }

    pub fn set_attendance(&mut self, id: &str, present: bool) -> Result<Option<StudentRecord>> {
        self.update_student(id, &serde_json::json!({ "present": present }))
    }

    pub fn toggle_attendance(&mut self, id: &str) -> Result<Option<StudentRecord>> {
        let Some(student) = self.student(id) else {
            return Ok(None);
        };
        self.set_attendance(id, !student.present)
    }

    /// Marks every student of the class present or absent; returns how many.
    pub fn mark_all(&mut self, class_id: &str, present: bool) -> Result<usize> {
        let mut students: Vec<Slot<StudentRecord>> = self.slots(keys::STUDENTS);
        let mut n = 0usize;
        for slot in students.iter_mut() {
            if let Slot::Parsed(s) = slot {
                if s.class_id == class_id {
                    s.present = present;
                    n += 1;
                }
            }
        }
        if n > 0 {
            self.save(keys::STUDENTS, &students)?;
        }
        Ok(n)
    }

    // Exit prompts

    pub fn exit_prompts(&self, category: Option<&str>) -> Vec<ExitPromptRecord> {
        let all: Vec<ExitPromptRecord> = self.records(keys::EXIT_PROMPTS);
        match category {
            Some(cat) => all.into_iter().filter(|p| p.category == cat).collect(),
            None => all,
        }
    }

    pub fn exit_prompt(&self, id: &str) -> Option<ExitPromptRecord> {
        self.exit_prompts(None).into_iter().find(|p| p.id == id)
    }

    pub fn create_exit_prompt(&mut self, data: NewExitPrompt) -> Result<ExitPromptRecord> {
        require(&data.prompt, "Prompt text is required")?;
        require(&data.category, "Category is required")?;
        let record = ExitPromptRecord {
            id: new_id(),
            prompt: data.prompt.trim().to_string(),
            category: data.category,
            is_custom: data.is_custom.unwrap_or(true),
            used_at: None,
            created_at: timestamp_now(),
            extra: Map::new(),
        };
        self.push_record(keys::EXIT_PROMPTS, record.clone())?;
        Ok(record)
    }

    pub fn update_exit_prompt(
        &mut self,
        id: &str,
        patch: &Value,
    ) -> Result<Option<ExitPromptRecord>> {
        self.update_in(keys::EXIT_PROMPTS, id, patch)
    }

    /// Stamps `usedAt` with the current time.
    pub fn mark_prompt_used(&mut self, id: &str) -> Result<Option<ExitPromptRecord>> {
        self.update_exit_prompt(id, &serde_json::json!({ "usedAt": timestamp_now() }))
    }

    /// Picks a prompt, optionally within `category`, and marks it used.
    pub fn random_prompt(&mut self, category: Option<&str>) -> Result<Option<ExitPromptRecord>> {
        let prompts = self.exit_prompts(category);
        let Some(picked) = pick_prompt(&prompts) else {
            return Ok(None);
        };
        self.mark_prompt_used(&picked.id)
    }

    pub fn delete_exit_prompt(&mut self, id: &str) -> Result<bool> {
        self.delete_in::<ExitPromptRecord>(keys::EXIT_PROMPTS, id)
    }

    // Settings

    pub fn settings(&self, domain: SettingsDomain) -> Map<String, Value> {
        self.load_or(domain.key(), domain.fallback())
    }

    pub fn update_settings(
        &mut self,
        domain: SettingsDomain,
        patch: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let mut current = self.settings(domain);
        shallow_merge(&mut current, patch);
        self.save(domain.key(), &current)?;
        Ok(current)
    }

    // Whole store

    pub fn export_all(&self) -> Snapshot {
        Snapshot {
            classes: self.load_or(keys::CLASSES, Vec::new()),
            students: self.load_or(keys::STUDENTS, Vec::new()),
            settings: self.settings(SettingsDomain::General),
            exit_prompts: self.load_or(keys::EXIT_PROMPTS, Vec::new()),
            timer_settings: self.settings(SettingsDomain::Timer),
            noise_settings: self.settings(SettingsDomain::Noise),
            export_date: timestamp_now(),
        }
    }

    /// Overwrites each collection named in `data` wholesale. Records are not
    /// validated. Returns the export field names that were written.
    pub fn import_all(&mut self, data: &Value) -> Result<Vec<&'static str>> {
        let Some(obj) = data.as_object() else {
            return Err(StoreError::format("expected a JSON object"));
        };
        let mut writes: Vec<(&str, String)> = Vec::new();
        let mut fields = Vec::new();
        for (field, key) in SNAPSHOT_FIELDS {
            match obj.get(field) {
                None | Some(Value::Null) => continue,
                Some(v) => {
                    writes.push((key, serde_json::to_string(v)?));
                    fields.push(field);
                }
            }
        }
        if !writes.is_empty() {
            self.kv.set_many(&writes)?;
        }
        info!("imported {}", fields.join(", "));
        Ok(fields)
    }

    /// Deletes every known key, then seeds default classes and prompts again.
    pub fn reset_all(&mut self) -> Result<SeedReport> {
        for key in keys::ALL {
            self.kv.remove(key)?;
        }
        info!("cleared all classroom data");
        self.seed_defaults()
    }

    /// Seeds classes when none are stored and built-in prompts when none are
    /// stored. Unreadable records count as stored.
    pub fn seed_defaults(&mut self) -> Result<SeedReport> {
        let mut report = SeedReport::default();
        if self.slots::<ClassRecord>(keys::CLASSES).is_empty() {
            for (name, period) in DEFAULT_CLASSES {
                self.create_class(NewClass::named(name).with_period(period))?;
                report.classes += 1;
            }
        }
        if self.slots::<ExitPromptRecord>(keys::EXIT_PROMPTS).is_empty() {
            for (prompt, category) in DEFAULT_PROMPTS {
                self.create_exit_prompt(NewExitPrompt::built_in(prompt, category))?;
                report.prompts += 1;
            }
        }
        if report.seeded_anything() {
            info!(
                "seeded {} classes and {} exit prompts",
                report.classes, report.prompts
            );
        }
        Ok(report)
    }

    /// `storage_kb` counts UTF-16 code units, the unit browser storage quotas
    /// are measured in.
    pub fn app_stats(&self) -> AppStats {
        let prompts = self.exit_prompts(None);
        let units: usize = keys::ALL
            .iter()
            .filter_map(|k| self.kv.get(k).ok().flatten())
            .map(|v| v.encode_utf16().count())
            .sum();
        AppStats {
            classes: self.classes().len(),
            students: self.students(None).len(),
            exit_prompts: prompts.len(),
            custom_prompts: prompts.iter().filter(|p| p.is_custom).count(),
            storage_kb: (units as f64 / 1024.0 * 100.0).round() / 100.0,
        }
    }
}

/// Import payloads as the settings screen receives them: raw file text.
pub fn parse_import_text(text: &str) -> Result<Value> {
    let v: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::format(format!("not valid JSON: {}", e)))?;
    Ok(v)
}
