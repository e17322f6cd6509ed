use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Categories the exit-ticket screens offer. The store does not enforce them.
pub const PROMPT_CATEGORIES: [&str; 4] = ["reflection", "comprehension", "application", "feedback"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Fields this version does not know about, kept so imports round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub class_id: String,
    #[serde(default = "default_present", deserialize_with = "null_as_present")]
    pub present: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitPromptRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_custom: bool,
    #[serde(default)]
    pub used_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_present() -> bool {
    true
}

// Imported files are trusted as-is, so `null` reads like a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn null_as_present<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(d)?.unwrap_or_else(default_present))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub period: Option<String>,
}

impl NewClass {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            period: None,
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub present: Option<bool>,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_id: class_id.into(),
            student_id: None,
            present: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExitPrompt {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_custom: Option<bool>,
}

impl NewExitPrompt {
    pub fn new(prompt: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            category: category.into(),
            is_custom: None,
        }
    }

    pub fn built_in(prompt: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            is_custom: Some(false),
            ..Self::new(prompt, category)
        }
    }
}

/// Whole-store export document. Collections hold records exactly as stored,
/// including ones that do not parse as this version's record types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub classes: Vec<Value>,
    pub students: Vec<Value>,
    pub settings: Map<String, Value>,
    pub exit_prompts: Vec<Value>,
    pub timer_settings: Map<String, Value>,
    pub noise_settings: Map<String, Value>,
    pub export_date: String,
}

/// Treats missing and blank optional text the same way.
pub(crate) fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
