use classroomd::db::SqliteKv;
use classroomd::{ClassroomStore, KeyValue, MemoryKv, NewClass, NewStudent, StoreError};
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

#[test]
fn deleting_a_class_removes_exactly_its_students() {
    let mut store = ClassroomStore::new(MemoryKv::new());
    let a = store.create_class(NewClass::named("A")).unwrap();
    let b = store.create_class(NewClass::named("B")).unwrap();
    for name in ["Ada", "Alan", "Barbara"] {
        store.create_student(NewStudent::new(name, &a.id)).unwrap();
    }
    let kept = store.create_student(NewStudent::new("Bea", &b.id)).unwrap();

    assert!(store.delete_class(&a.id).unwrap());

    assert_eq!(store.classes(), vec![b.clone()]);
    assert_eq!(store.students(None), vec![kept]);
    assert!(store.students(Some(&a.id)).is_empty());
}

#[test]
fn deleting_unknown_class_leaves_students_alone() {
    let mut store = ClassroomStore::new(MemoryKv::new());
    let a = store.create_class(NewClass::named("A")).unwrap();
    store.create_student(NewStudent::new("Ada", &a.id)).unwrap();
    let before = store.students(None);

    assert!(!store.delete_class("nope").unwrap());
    assert_eq!(store.students(None), before);
}

#[test]
fn orphaned_students_appear_only_in_the_unfiltered_list() {
    let mut store = ClassroomStore::new(MemoryKv::new());
    let orphan = store
        .create_student(NewStudent::new("Lost", "no-such-class"))
        .expect("class existence is not checked");
    assert_eq!(store.students(None), vec![orphan]);
    assert!(store.students(Some("other")).is_empty());
}

/// Accepts the students write and refuses the classes write, so a
/// non-transactional cascade would leave a class without its students.
struct FailOnClasses(MemoryKv);

impl KeyValue for FailOnClasses {
    fn get(&self, key: &str) -> classroomd::Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> classroomd::Result<()> {
        if key == "classroom_classes" && value == "[]" {
            return Err(StoreError::storage("disk full"));
        }
        self.0.set(key, value)
    }

    fn remove(&mut self, key: &str) -> classroomd::Result<()> {
        self.0.remove(key)
    }
}

#[test]
fn sequential_backend_surfaces_failure_from_second_write() {
    let mut store = ClassroomStore::new(FailOnClasses(MemoryKv::new()));
    let a = store.create_class(NewClass::named("A")).unwrap();
    store.create_student(NewStudent::new("Ada", &a.id)).unwrap();

    let err = store.delete_class(&a.id).unwrap_err();
    assert_eq!(err.code(), "storage_failed");
    // Students were written first; the class survives as an empty class.
    assert_eq!(store.classes().len(), 1);
    assert!(store.students(None).is_empty());
}

#[test]
fn sqlite_cascade_commits_both_collections() {
    let workspace = temp_dir("classroom-cascade");
    let kv = SqliteKv::open(&workspace).expect("open sqlite kv");
    let mut store = ClassroomStore::new(kv);
    let a = store.create_class(NewClass::named("A")).unwrap();
    let b = store.create_class(NewClass::named("B")).unwrap();
    store.create_student(NewStudent::new("Ada", &a.id)).unwrap();
    store.create_student(NewStudent::new("Bea", &b.id)).unwrap();

    assert!(store.delete_class(&a.id).unwrap());
    drop(store);

    let reopened = ClassroomStore::new(SqliteKv::open(&workspace).expect("reopen"));
    assert_eq!(reopened.classes().len(), 1);
    let students = reopened.students(None);
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].class_id, b.id);

    let _ = std::fs::remove_dir_all(workspace);
}
