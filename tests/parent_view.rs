mod test_support;

use serde_json::json;
use test_support::{names, request, request_ok, spawn_with_fixtures};

#[test]
fn parent_view_pairs_family_with_their_teachers() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let levi = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "parent.view",
        json!({ "family": "levi" }),
    );
    assert_eq!(names(&levi["children"]), vec!["Tom", "Noa"]);

    let teachers = levi["teachers"].as_object().expect("teachers object");
    let subjects: Vec<&str> = teachers.keys().map(|k| k.as_str()).collect();
    assert_eq!(subjects, vec!["Math", "Art"]);
    assert_eq!(teachers["Math"]["name"], json!("Ada Byron"));
    assert_eq!(
        teachers["Math"]["phones"],
        json!([{ "mobile": "555-0101" }, { "office": "555-0102" }])
    );
    // Two Art teachers: the later one is assigned.
    assert_eq!(teachers["Art"]["name"], json!("Pablo Ruiz"));
    assert_eq!(levi["ambiguousSubjects"], json!(["Art"]));
}

#[test]
fn parent_view_for_unknown_family_is_empty() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let nobody = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "parent.view",
        json!({ "family": "Nobody" }),
    );
    assert!(names(&nobody["children"]).is_empty());
    assert_eq!(nobody["teachers"], json!({}));
    assert_eq!(nobody["ambiguousSubjects"], json!([]));
}

#[test]
fn parent_first_page_lists_families() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let page = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "users.open",
        json!({ "userType": "Parent" }),
    );
    assert_eq!(page.get("families"), Some(&json!(["Levi", "Cohen", "Stein"])));
}

#[test]
fn parent_download_requires_out_path() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "parent.download",
        json!({ "family": "Cohen" }),
    );
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("bad_params"));
}
