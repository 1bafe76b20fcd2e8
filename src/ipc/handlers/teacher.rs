use crate::export::Sheet;
use crate::insights;
use crate::ipc::error::ok;
use crate::ipc::helpers::{child_records, download, fetch_children, optional_str};
use crate::ipc::types::{AppState, Request};
use crate::records::Child;
use serde_json::json;
use tracing::info;

/// Children taking the requested subject, or every child when none is given.
fn class_children(
    state: &AppState,
    req: &Request,
) -> Result<(Option<String>, Vec<Child>), serde_json::Value> {
    let subject = optional_str(req, "subject");
    info!(subject = subject.as_deref().unwrap_or("*"), "fetching students of class");
    let children = fetch_children(state, req)?;
    let children = insights::subject_members(children, subject.as_deref(), state.subject_match);
    Ok((subject, children))
}

fn handle_teacher_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (subject, children) = match class_children(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "subject": subject,
            "children": child_records(&children),
        }),
    )
}

fn handle_teacher_download(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (_, children) = match class_children(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    download(req, vec![Sheet::new("children", child_records(&children))])
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teacher.view" => Some(handle_teacher_view(state, req)),
        "teacher.download" => Some(handle_teacher_download(state, req)),
        _ => None,
    }
}
