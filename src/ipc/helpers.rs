use crate::export::{self, Sheet};
use crate::insights::{Assignments, Roster};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::records::{Child, Teacher};
use crate::source::{RecordSource, SourceError};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    optional_str(req, key)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn record_source<'a>(state: &'a AppState, req: &Request) -> Result<&'a dyn RecordSource, Value> {
    state
        .source
        .as_deref()
        .ok_or_else(|| err(&req.id, "no_source", "configure a records source first", None))
}

pub fn source_err(req: &Request, e: SourceError) -> Value {
    warn!(method = %req.method, error = %e, "records fetch failed");
    err(
        &req.id,
        e.code(),
        e.to_string(),
        Some(json!({ "endpoint": e.endpoint(), "status": e.status() })),
    )
}

pub fn fetch_children(state: &AppState, req: &Request) -> Result<Vec<Child>, Value> {
    record_source(state, req)?
        .fetch_children()
        .map_err(|e| source_err(req, e))
}

pub fn fetch_teachers(state: &AppState, req: &Request) -> Result<Vec<Teacher>, Value> {
    record_source(state, req)?
        .fetch_teachers()
        .map_err(|e| source_err(req, e))
}

pub fn child_records<'a, I>(children: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Child>,
{
    children.into_iter().map(Child::to_record).collect()
}

pub fn teacher_records<'a, I>(teachers: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Teacher>,
{
    teachers.into_iter().map(Teacher::to_record).collect()
}

/// `{subject: [child, ...]}` in subject order.
pub fn rosters_json(rosters: &[Roster<'_>]) -> Value {
    let mut m = serde_json::Map::new();
    for r in rosters {
        m.insert(
            r.subject.to_string(),
            Value::Array(child_records(r.children.iter().copied())),
        );
    }
    Value::Object(m)
}

/// `{subject: teacher}` in subject order.
pub fn assignments_json(assignments: &Assignments<'_>) -> Value {
    let mut m = serde_json::Map::new();
    for (subject, teacher) in &assignments.entries {
        m.insert(subject.to_string(), teacher.to_record());
    }
    Value::Object(m)
}

/// Writes the sheets to `params.outPath`, or to `school_insights.xlsx` in
/// `params.outDir` when only a directory is given.
pub fn download(req: &Request, sheets: Vec<Sheet>) -> Value {
    let out_path = match (optional_str(req, "outPath"), optional_str(req, "outDir")) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(dir)) => PathBuf::from(dir).join(export::WORKBOOK_FILE_NAME),
        (None, None) => {
            return err(&req.id, "bad_params", "missing outPath", None);
        }
    };
    match export::write_workbook(&out_path, &sheets) {
        Ok(summary) => {
            info!(
                path = %out_path.display(),
                sheets = summary.sheets.len(),
                rows = summary.rows_exported,
                "workbook exported"
            );
            ok(
                &req.id,
                json!({
                    "path": out_path.to_string_lossy(),
                    "fileName": out_path.file_name().map(|n| n.to_string_lossy().to_string()),
                    "sheets": summary.sheets,
                    "rowsExported": summary.rows_exported,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "export_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path.to_string_lossy() })),
        ),
    }
}
