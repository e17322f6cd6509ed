use serde_json::{json, Map, Value};

/// One independently stored settings singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsDomain {
    General,
    Timer,
    Noise,
}

impl SettingsDomain {
    pub const ALL: [SettingsDomain; 3] = [Self::General, Self::Timer, Self::Noise];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "timer" => Some(Self::Timer),
            "noise" => Some(Self::Noise),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Timer => "timer",
            Self::Noise => "noise",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::General => crate::store::keys::SETTINGS,
            Self::Timer => crate::store::keys::TIMER_SETTINGS,
            Self::Noise => crate::store::keys::NOISE_SETTINGS,
        }
    }

    /// What a read returns when nothing (or nothing parseable) is stored.
    pub fn fallback(self) -> Map<String, Value> {
        let v = match self {
            Self::General => json!({}),
            Self::Timer => json!({
                "alertsEnabled": true,
                "finalWarning": true,
                "lastMinute": true,
                "soundType": "beep"
            }),
            Self::Noise => json!({
                "quietThreshold": 30,
                "acceptableThreshold": 50,
                "firmWarningThreshold": 70,
                "strongWarningThreshold": 85,
                "micSensitivity": 50,
                "visualAlerts": true,
                "audioAlerts": true,
                "audioAlertSound": "chime"
            }),
        };
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }
}

/// Top-level keys of `patch` replace the same keys of `base`; nested objects
/// are replaced wholesale, never merged.
pub fn shallow_merge(base: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (k, v) in patch {
        base.insert(k.clone(), v.clone());
    }
}
