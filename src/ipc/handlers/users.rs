use crate::insights::{self, SubjectIndex};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{fetch_children, fetch_teachers, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub const USER_TYPES: [&str; 3] = ["Teacher", "Parent", "School Manager"];
pub const ACTIONS: [&str; 2] = ["View", "Download"];

fn handle_users_list(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "userTypes": USER_TYPES }))
}

fn handle_users_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_type = match required_str(req, "userType") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match user_type.as_str() {
        "Teacher" => {
            let teachers = match fetch_teachers(state, req) {
                Ok(v) => v,
                Err(e) => return e,
            };
            let index = SubjectIndex::build(&teachers, state.subject_match);
            ok(
                &req.id,
                json!({
                    "page": "teacher.subject",
                    "userType": user_type,
                    "subjects": index.subjects(),
                    "actions": ACTIONS,
                }),
            )
        }
        "Parent" => {
            let children = match fetch_children(state, req) {
                Ok(v) => v,
                Err(e) => return e,
            };
            ok(
                &req.id,
                json!({
                    "page": "parent.family",
                    "userType": user_type,
                    "families": insights::families(&children),
                    "actions": ACTIONS,
                }),
            )
        }
        "School Manager" => ok(
            &req.id,
            json!({
                "page": "manager.actions",
                "userType": user_type,
                "actions": ACTIONS,
            }),
        ),
        other => err(
            &req.id,
            "not_found",
            "user type not found",
            Some(json!({ "userType": other, "userTypes": USER_TYPES })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.list" => Some(handle_users_list(state, req)),
        "users.open" => Some(handle_users_open(state, req)),
        _ => None,
    }
}
