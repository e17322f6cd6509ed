use classroomd::{
    ClassroomStore, MemoryKv, NewClass, NewExitPrompt, NewStudent, SettingsDomain, StoreError,
};
use serde_json::json;
use std::collections::HashSet;

fn empty_store() -> ClassroomStore<MemoryKv> {
    ClassroomStore::new(MemoryKv::new())
}

#[test]
fn created_class_gets_id_and_null_period() {
    let mut store = empty_store();
    let class = store
        .create_class(NewClass::named("Period 1"))
        .expect("create class");
    assert!(!class.id.is_empty());
    assert_eq!(class.name, "Period 1");
    assert_eq!(class.period, None);
    assert!(!class.created_at.is_empty());

    let as_json = serde_json::to_value(&class).unwrap();
    assert_eq!(as_json["period"], json!(null));

    let listed = store.classes();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], class);
}

#[test]
fn ids_are_unique_within_a_collection() {
    let mut store = empty_store();
    let mut ids = HashSet::new();
    for i in 0..50 {
        let c = store
            .create_class(NewClass::named(format!("Class {}", i)))
            .expect("create class");
        assert!(ids.insert(c.id.clone()), "duplicate id {}", c.id);
    }
    let listed: HashSet<String> = store.classes().into_iter().map(|c| c.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn class_name_is_trimmed_and_blank_period_is_null() {
    let mut store = empty_store();
    let c = store
        .create_class(NewClass::named("  Homeroom  ").with_period("   "))
        .unwrap();
    assert_eq!(c.name, "Homeroom");
    assert_eq!(c.period, None);
}

#[test]
fn student_defaults_present_and_filters_by_class() {
    let mut store = empty_store();
    let a = store.create_class(NewClass::named("A")).unwrap();
    let b = store.create_class(NewClass::named("B")).unwrap();

    let ada = store.create_student(NewStudent::new("Ada", &a.id)).unwrap();
    assert!(ada.present);
    assert_eq!(ada.student_id, None);

    let mut bob = NewStudent::new("Bob", &b.id);
    bob.present = Some(false);
    bob.student_id = Some("S-42".into());
    let bob = store.create_student(bob).unwrap();
    assert!(!bob.present);
    assert_eq!(bob.student_id.as_deref(), Some("S-42"));

    let in_a: Vec<String> = store
        .students(Some(&a.id))
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(in_a, vec!["Ada"]);
    assert_eq!(store.students(None).len(), 2);
}

#[test]
fn empty_prompt_fails_with_required_message_and_no_write() {
    let mut store = empty_store();
    let err = store
        .create_exit_prompt(NewExitPrompt::new("", "reflection"))
        .unwrap_err();
    match err {
        StoreError::Validation(msg) => assert!(msg.contains("required"), "got {}", msg),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(store.exit_prompts(None).is_empty());
}

#[test]
fn student_requires_class_id() {
    let mut store = empty_store();
    let err = store
        .create_student(NewStudent::new("Ada", "  "))
        .unwrap_err();
    assert_eq!(err.to_string(), "Class ID is required");
    assert!(store.students(None).is_empty());
}

#[test]
fn custom_prompts_default_to_custom_and_filter_by_category() {
    let mut store = empty_store();
    let p = store
        .create_exit_prompt(NewExitPrompt::new("What surprised you?", "reflection"))
        .unwrap();
    assert!(p.is_custom);
    assert_eq!(p.used_at, None);
    store
        .create_exit_prompt(NewExitPrompt::built_in("Rate today", "feedback"))
        .unwrap();

    assert_eq!(store.exit_prompts(Some("reflection")).len(), 1);
    assert_eq!(store.exit_prompts(Some("feedback")).len(), 1);
    assert_eq!(store.exit_prompts(Some("application")).len(), 0);
    assert_eq!(store.exit_prompts(None).len(), 2);
}

#[test]
fn update_changes_only_the_patched_field() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    let s = store.create_student(NewStudent::new("Ada", &c.id)).unwrap();

    let updated = store
        .update_student(&s.id, &json!({ "name": "Ada L." }))
        .unwrap()
        .expect("student exists");
    let listed = store.student(&s.id).expect("still listed");
    assert_eq!(updated, listed);

    let mut expected = s.clone();
    expected.name = "Ada L.".into();
    assert_eq!(listed, expected);
}

#[test]
fn update_ignores_id_and_created_at() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    let updated = store
        .update_class(
            &c.id,
            &json!({ "id": "hijack", "createdAt": "1999", "period": "P2" }),
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, c.id);
    assert_eq!(updated.created_at, c.created_at);
    assert_eq!(updated.period.as_deref(), Some("P2"));
}

#[test]
fn update_keeps_unknown_fields_from_the_patch() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    store
        .update_class(&c.id, &json!({ "room": "B12" }))
        .unwrap()
        .unwrap();
    let listed = store.class(&c.id).unwrap();
    assert_eq!(listed.extra.get("room"), Some(&json!("B12")));
}

#[test]
fn update_unknown_id_is_not_found_and_changes_nothing() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    let before = store.classes();
    let res = store
        .update_class("missing", &json!({ "name": "B" }))
        .unwrap();
    assert!(res.is_none());
    assert_eq!(store.classes(), before);
    assert_eq!(store.class(&c.id).unwrap().name, "A");
}

#[test]
fn update_rejects_blanking_required_fields_and_bad_types() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    let s = store.create_student(NewStudent::new("Ada", &c.id)).unwrap();

    let e = store
        .update_student(&s.id, &json!({ "name": "   " }))
        .unwrap_err();
    assert!(matches!(e, StoreError::Validation(_)));

    let e = store
        .update_student(&s.id, &json!({ "present": "yes" }))
        .unwrap_err();
    assert!(matches!(e, StoreError::Validation(_)));

    let e = store.update_student(&s.id, &json!(["nope"])).unwrap_err();
    assert!(matches!(e, StoreError::Validation(_)));

    assert_eq!(store.student(&s.id).unwrap(), s);
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let mut store = empty_store();
    let c = store.create_class(NewClass::named("A")).unwrap();
    let s = store.create_student(NewStudent::new("Ada", &c.id)).unwrap();
    let p = store
        .create_exit_prompt(NewExitPrompt::new("Why?", "reflection"))
        .unwrap();

    assert!(store.delete_student(&s.id).unwrap());
    assert!(!store.delete_student(&s.id).unwrap());
    assert!(store.delete_exit_prompt(&p.id).unwrap());
    assert!(!store.delete_exit_prompt("missing").unwrap());
    assert!(!store.delete_class("missing").unwrap());

    // Deleting a student leaves its class alone.
    assert_eq!(store.classes().len(), 1);
}

#[test]
fn mark_prompt_used_sets_timestamp() {
    let mut store = empty_store();
    let p = store
        .create_exit_prompt(NewExitPrompt::new("Why?", "reflection"))
        .unwrap();
    let used = store.mark_prompt_used(&p.id).unwrap().unwrap();
    assert!(used.used_at.is_some());
    assert_eq!(used.prompt, p.prompt);
    assert!(store.mark_prompt_used("missing").unwrap().is_none());
}

#[test]
fn settings_merge_shallowly_per_domain() {
    let mut store = empty_store();
    assert!(store.settings(SettingsDomain::General).is_empty());

    let patch = json!({ "teacherName": "Ms. Rivera", "soundEnabled": true });
    store
        .update_settings(SettingsDomain::General, patch.as_object().unwrap())
        .unwrap();
    let patch = json!({ "schoolName": "Northside" });
    let merged = store
        .update_settings(SettingsDomain::General, patch.as_object().unwrap())
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(merged),
        json!({ "teacherName": "Ms. Rivera", "soundEnabled": true, "schoolName": "Northside" })
    );

    let patch = json!({ "soundType": "chime" });
    let timer = store
        .update_settings(SettingsDomain::Timer, patch.as_object().unwrap())
        .unwrap();
    assert_eq!(timer.get("soundType"), Some(&json!("chime")));
    assert_eq!(timer.get("alertsEnabled"), Some(&json!(true)));

    // Other domains are untouched.
    assert_eq!(
        store.settings(SettingsDomain::Noise),
        SettingsDomain::Noise.fallback()
    );
}

#[test]
fn app_stats_counts_records_and_storage() {
    let mut store = empty_store();
    assert_eq!(store.app_stats().storage_kb, 0.0);
    let c = store.create_class(NewClass::named("A")).unwrap();
    store.create_student(NewStudent::new("Ada", &c.id)).unwrap();
    store
        .create_exit_prompt(NewExitPrompt::new("Why?", "reflection"))
        .unwrap();
    store
        .create_exit_prompt(NewExitPrompt::built_in("How?", "application"))
        .unwrap();

    let stats = store.app_stats();
    assert_eq!(stats.classes, 1);
    assert_eq!(stats.students, 1);
    assert_eq!(stats.exit_prompts, 2);
    assert_eq!(stats.custom_prompts, 1);
    assert!(stats.storage_kb > 0.0);
}

#[test]
fn random_prompt_marks_its_pick_used() {
    let mut store = empty_store();
    assert!(store.random_prompt(None).unwrap().is_none());

    let p = store
        .create_exit_prompt(NewExitPrompt::new("Why?", "reflection"))
        .unwrap();
    store
        .create_exit_prompt(NewExitPrompt::new("How?", "application"))
        .unwrap();
    let picked = store
        .random_prompt(Some("reflection"))
        .unwrap()
        .expect("one reflection prompt");
    assert_eq!(picked.id, p.id);
    assert!(picked.used_at.is_some());
    assert_eq!(store.exit_prompt(&p.id), Some(picked));
    assert!(store.random_prompt(Some("feedback")).unwrap().is_none());
}

#[test]
fn storage_size_counts_utf16_units() {
    use classroomd::store::keys;
    use classroomd::KeyValue;

    let mut kv = MemoryKv::new();
    // 1022 two-byte characters plus the quotes: 1024 units, 2046 bytes.
    kv.set(keys::SETTINGS, &format!("\"{}\"", "é".repeat(1022)))
        .unwrap();
    let store = ClassroomStore::new(kv);
    assert_eq!(store.app_stats().storage_kb, 1.0);
}
