use crate::export::Sheet;
use crate::insights;
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    assignments_json, child_records, download, fetch_children, fetch_teachers, optional_str,
    teacher_records,
};
use crate::ipc::types::{AppState, Request};
use crate::records::{Child, Teacher};
use serde_json::json;

struct FamilyData {
    family: Option<String>,
    children: Vec<Child>,
    teachers: Vec<Teacher>,
}

fn load_family(state: &AppState, req: &Request) -> Result<FamilyData, serde_json::Value> {
    let family = optional_str(req, "family");
    let children = fetch_children(state, req)?;
    let teachers = fetch_teachers(state, req)?;
    Ok(FamilyData {
        children: insights::family_members(children, family.as_deref()),
        family,
        teachers,
    })
}

fn handle_parent_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match load_family(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assigned = insights::assignments(&data.children, &data.teachers, state.subject_match);
    ok(
        &req.id,
        json!({
            "family": data.family,
            "children": child_records(&data.children),
            "teachers": assignments_json(&assigned),
            "ambiguousSubjects": assigned.ambiguous,
        }),
    )
}

fn handle_parent_download(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match load_family(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assigned = insights::assignments(&data.children, &data.teachers, state.subject_match);
    download(
        req,
        vec![
            Sheet::new("children", child_records(&data.children)),
            Sheet::new("teachers", teacher_records(assigned.teachers())),
        ],
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "parent.view" => Some(handle_parent_view(state, req)),
        "parent.download" => Some(handle_parent_download(state, req)),
        _ => None,
    }
}
