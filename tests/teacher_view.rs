mod test_support;

use serde_json::json;
use test_support::{names, request_ok, spawn_with_fixtures, spawn_with_subject_match};

#[test]
fn teacher_view_filters_children_by_subject() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let art = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "teacher.view",
        json!({ "subject": "Art" }),
    );
    assert_eq!(art.get("subject"), Some(&json!("Art")));
    assert_eq!(names(&art["children"]), vec!["Tom", "Ari"]);
    let keys: Vec<&str> = art.as_object().map(|o| o.keys().map(String::as_str).collect()).unwrap_or_default();
    assert_eq!(keys, vec!["subject", "children"]);

    let lower = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teacher.view",
        json!({ "subject": "art" }),
    );
    assert_eq!(names(&lower["children"]), vec!["Tom", "Ari"]);

    let all = request_ok(&mut stdin, &mut reader, "3", "teacher.view", json!({}));
    assert_eq!(all.get("subject"), Some(&serde_json::Value::Null));
    assert_eq!(names(&all["children"]).len(), 5);

    let first = &art["children"][0];
    assert_eq!(first["last_name"], json!("Levi"));
    assert_eq!(first["email"], json!("tom.levi@home.example"));
    assert_eq!(first["hobbies"], json!(["math", "art"]));
}

#[test]
fn exact_matching_does_not_fold_case() {
    let (_child, mut stdin, mut reader) = spawn_with_subject_match("exact");

    let art = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "teacher.view",
        json!({ "subject": "Art" }),
    );
    assert!(names(&art["children"]).is_empty());

    let lower = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teacher.view",
        json!({ "subject": "art" }),
    );
    assert_eq!(names(&lower["children"]), vec!["Tom", "Ari"]);
}

#[test]
fn teacher_first_page_lists_subjects_once() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let page = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "users.open",
        json!({ "userType": "Teacher" }),
    );
    assert_eq!(page.get("page"), Some(&json!("teacher.subject")));
    assert_eq!(
        page.get("subjects"),
        Some(&json!(["Math", "Art", "Music", "Chess"]))
    );
}
