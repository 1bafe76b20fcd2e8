use crate::config;
use crate::insights::SubjectMatch;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::source;
use serde_json::json;
use tracing::info;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sourceConfigured": state.source.is_some(),
            "sourceKind": state.source.as_ref().map(|s| s.kind()),
            "subjectMatch": state.subject_match.as_str(),
        }),
    )
}

fn handle_source_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let settings = match config::source_settings_from_params(&req.params) {
        Ok(v) => v,
        Err(message) => return err(&req.id, "bad_params", message, None),
    };
    match source::open(settings) {
        Ok(src) => {
            let kind = src.kind();
            info!(kind, "records source configured");
            state.source = Some(src);
            ok(&req.id, json!({ "kind": kind }))
        }
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

fn handle_settings_subject_match(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "mode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(mode) = SubjectMatch::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "mode must be one of: exact, caseInsensitive",
            Some(json!({ "mode": raw })),
        );
    };
    state.subject_match = mode;
    ok(&req.id, json!({ "subjectMatch": mode.as_str() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "source.configure" => Some(handle_source_configure(state, req)),
        "settings.subjectMatch" => Some(handle_settings_subject_match(state, req)),
        _ => None,
    }
}
