//! Roster helpers over already-loaded student lists: CSV in/out, attendance
//! summaries, the random picker and group generation.
//!
//! Nothing here touches storage; callers pass records in and persist results
//! through the store.

use serde::Serialize;
use uuid::Uuid;

use crate::csv;
use crate::error::{Result, StoreError};
use crate::models::StudentRecord;

pub const ROSTER_TEMPLATE: &str = "name\nJohn Doe\nJane Smith\nMike Johnson\nSarah Wilson\nDavid Brown";

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn random_index(len: usize) -> usize {
    (Uuid::new_v4().as_u128() % len as u128) as usize
}

/// Names from a roster CSV. The first header containing "name" selects the
/// column; rows with a blank name are skipped.
pub fn parse_roster_csv(text: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    if lines.len() < 2 {
        return Err(StoreError::format(
            "CSV must have at least a header row and one data row",
        ));
    }
    let headers: Vec<String> = csv::parse_record(lines[0])
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let Some(name_idx) = headers.iter().position(|h| h.contains("name")) else {
        return Err(StoreError::format("CSV must contain a \"name\" column"));
    };

    let mut names = Vec::new();
    for line in &lines[1..] {
        let fields = csv::parse_record(line);
        let Some(name) = fields.get(name_idx).map(|s| s.trim()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

pub fn students_csv(students: &[StudentRecord]) -> String {
    let mut out = String::from("name,studentId,present\n");
    let rows: Vec<String> = students
        .iter()
        .map(|s| {
            format!(
                "{},{},{}",
                csv::quote(&s.name),
                csv::quote(s.student_id.as_deref().unwrap_or("")),
                csv::quote(if s.present { "Yes" } else { "No" })
            )
        })
        .collect();
    out.push_str(&rows.join("\n"));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    /// Whole percent present.
    pub rate: u32,
}

pub fn attendance_summary(students: &[StudentRecord]) -> AttendanceSummary {
    let total = students.len();
    let present = students.iter().filter(|s| s.present).count();
    let rate = if total == 0 {
        0
    } else {
        ((present as f64 / total as f64) * 100.0).round() as u32
    };
    AttendanceSummary {
        total,
        present,
        absent: total - present,
        rate,
    }
}

pub fn attendance_report(class_name: &str, students: &[StudentRecord], date: &str) -> String {
    let present: Vec<&StudentRecord> = students.iter().filter(|s| s.present).collect();
    let absent: Vec<&StudentRecord> = students.iter().filter(|s| !s.present).collect();

    let mut report = format!("Attendance Report - {}\n", class_name);
    report.push_str(&format!("Date: {}\n", date));
    report.push_str(&format!("Total Students: {}\n", students.len()));
    report.push_str(&format!("Present: {}\n", present.len()));
    report.push_str(&format!("Absent: {}\n\n", absent.len()));

    report.push_str("Present Students:\n");
    for s in &present {
        report.push_str(&format!("- {}\n", s.name));
    }
    if !absent.is_empty() {
        report.push_str("\nAbsent Students:\n");
        for s in &absent {
            report.push_str(&format!("- {}\n", s.name));
        }
    }
    report
}

/// A random present student, or `None` when nobody is present.
pub fn pick_random(students: &[StudentRecord]) -> Option<&StudentRecord> {
    let present: Vec<&StudentRecord> = students.iter().filter(|s| s.present).collect();
    if present.is_empty() {
        return None;
    }
    Some(present[random_index(present.len())])
}

/// Splits present students into groups of `size` (the last may be smaller).
pub fn make_groups(
    students: &[StudentRecord],
    size: usize,
    shuffle: bool,
) -> Result<Vec<Vec<StudentRecord>>> {
    if size == 0 {
        return Err(StoreError::validation("Group size must be at least 1"));
    }
    let mut pool: Vec<StudentRecord> = students.iter().filter(|s| s.present).cloned().collect();
    if shuffle {
        for i in (1..pool.len()).rev() {
            let j = random_index(i + 1);
            pool.swap(i, j);
        }
    }
    Ok(pool.chunks(size).map(|c| c.to_vec()).collect())
}

/// `<class>-<what>-YYYY-MM-DD.<ext>`, the download name the screens use.
pub fn dated_file_name(class_name: &str, what: &str, date: &str, ext: &str) -> String {
    format!("{}-{}-{}.{}", class_name, what, date, ext)
}
