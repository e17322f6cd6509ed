use classroomd::backup::{self, BUNDLE_FORMAT_V1, PLAIN_JSON_FORMAT};
use classroomd::{ClassroomStore, MemoryKv, NewClass, NewStudent, SettingsDomain};
use serde_json::json;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn populated_store() -> ClassroomStore<MemoryKv> {
    let (mut store, _) = ClassroomStore::open(MemoryKv::new()).expect("open store");
    let class = store
        .create_class(NewClass::named("Backup Class").with_period("P7"))
        .expect("create class");
    store
        .create_student(NewStudent::new("Grace", &class.id))
        .expect("create student");
    let patch = json!({ "teacherName": "Mr. Okafor" });
    store
        .update_settings(SettingsDomain::General, patch.as_object().unwrap())
        .expect("update settings");
    store
}

#[test]
fn zip_export_and_import_roundtrip() {
    let out_dir = temp_dir("classroom-backup-out");
    let src = populated_store();

    let bundle_path = out_dir.join("classroom.backup.zip");
    let export = backup::export_bundle(&src, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 2);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(BUNDLE_FORMAT_V1));
    archive.by_name("data.json").expect("data entry in bundle");

    let mut dst = ClassroomStore::new(MemoryKv::new());
    let import = backup::import_bundle(&mut dst, &bundle_path).expect("import bundle");
    assert_eq!(import.bundle_format_detected, BUNDLE_FORMAT_V1);
    assert_eq!(import.fields.len(), 6);

    assert_eq!(dst.classes(), src.classes());
    assert_eq!(dst.students(None), src.students(None));
    assert_eq!(dst.exit_prompts(None), src.exit_prompts(None));
    assert_eq!(
        dst.settings(SettingsDomain::General),
        src.settings(SettingsDomain::General)
    );

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn plain_json_export_is_importable() {
    let out_dir = temp_dir("classroom-backup-plain");
    let src = populated_store();

    let json_path = out_dir.join(backup::default_export_file_name("2026-10-16"));
    assert!(json_path.ends_with("classroom-data-2026-10-16.json"));
    let text = serde_json::to_string_pretty(&src.export_all()).expect("serialize");
    std::fs::write(&json_path, text).expect("write json export");

    let mut dst = ClassroomStore::new(MemoryKv::new());
    let import = backup::import_bundle(&mut dst, &json_path).expect("import plain json");
    assert_eq!(import.bundle_format_detected, PLAIN_JSON_FORMAT);
    assert_eq!(dst.classes(), src.classes());

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_data_entry_is_rejected() {
    let out_dir = temp_dir("classroom-backup-tampered");
    let bundle_path = out_dir.join("tampered.zip");

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "sha256": "0000"
    });
    {
        let f = File::create(&bundle_path).expect("create zip");
        let mut zip = zip::ZipWriter::new(f);
        let opts = zip::write::FileOptions::default();
        zip.start_file("manifest.json", opts).expect("start manifest");
        zip.write_all(manifest.to_string().as_bytes())
            .expect("write manifest");
        zip.start_file("data.json", opts).expect("start data");
        zip.write_all(br#"{"classes":[]}"#).expect("write data");
        zip.finish().expect("finish zip");
    }

    let mut dst = ClassroomStore::new(MemoryKv::new());
    let created = dst.create_class(NewClass::named("Keep me")).unwrap();
    let err = backup::import_bundle(&mut dst, &bundle_path).expect_err("checksum mismatch");
    assert!(err.to_string().contains("checksum"), "got {}", err);
    assert_eq!(dst.classes(), vec![created]);

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn non_json_plain_file_is_a_format_error() {
    let out_dir = temp_dir("classroom-backup-garbage");
    let path = out_dir.join("notes.txt");
    std::fs::write(&path, "this is not json").expect("write file");

    let mut dst = ClassroomStore::new(MemoryKv::new());
    let err = backup::import_bundle(&mut dst, &path).expect_err("garbage input");
    let store_err = err
        .downcast_ref::<classroomd::StoreError>()
        .expect("store error kept in chain");
    assert_eq!(store_err.code(), "bad_format");
    assert!(dst.classes().is_empty());

    let _ = std::fs::remove_dir_all(out_dir);
}
