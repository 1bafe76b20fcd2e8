use crate::export::Sheet;
use crate::insights::{self, SubjectIndex};
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    child_records, download, fetch_children, fetch_teachers, rosters_json, teacher_records,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_manager_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let children = match fetch_children(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let teachers = match fetch_teachers(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mode = state.subject_match;

    let unregistered = insights::unregistered(&children);
    let rosters = insights::rosters(&children, &teachers, mode);
    let index = SubjectIndex::build(&teachers, mode);
    let occupancy = insights::occupancy(&index, &children);
    let pairs = insights::hobby_pairs(&index, &children);
    let labels: Vec<&str> = occupancy.counts.iter().map(|c| c.subject).collect();
    let values: Vec<usize> = occupancy.counts.iter().map(|c| c.count).collect();

    ok(
        &req.id,
        json!({
            "children": rosters_json(&rosters.by_subject),
            "teachers": teacher_records(&teachers),
            "schoolAnalytics": {
                "title": "Class occupancy",
                "labels": labels,
                "values": values,
                "totalEnrollments": occupancy.total(),
            },
            "unmatchedSubjects": occupancy.unmatched,
            "unregisteredStudents": child_records(unregistered.iter().copied()),
            "numOfStudents": rosters.total_children,
            "hobbyPairs": pairs,
        }),
    )
}

fn handle_manager_download(state: &mut AppState, req: &Request) -> serde_json::Value {
    let children = match fetch_children(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let teachers = match fetch_teachers(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let unregistered = insights::unregistered(&children);
    let rosters = insights::rosters(&children, &teachers, state.subject_match);

    let mut sheets = vec![
        Sheet::new("teachers", teacher_records(&teachers)),
        Sheet::new("children", child_records(&children)),
        Sheet::new(
            "unregistered_students",
            child_records(unregistered.iter().copied()),
        ),
    ];
    sheets.extend(
        rosters
            .by_subject
            .iter()
            .map(|r| Sheet::new(r.subject, child_records(r.children.iter().copied()))),
    );
    download(req, sheets)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "manager.view" => Some(handle_manager_view(state, req)),
        "manager.download" => Some(handle_manager_download(state, req)),
        _ => None,
    }
}
