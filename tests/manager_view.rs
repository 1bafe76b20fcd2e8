mod test_support;

use serde_json::json;
use test_support::{names, request_ok, spawn_with_fixtures};

#[test]
fn manager_view_aggregates_whole_school() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let view = request_ok(&mut stdin, &mut reader, "1", "manager.view", json!({}));

    assert_eq!(view["numOfStudents"], json!(5));
    assert_eq!(names(&view["unregisteredStudents"]), vec!["Noa"]);
    assert_eq!(view["teachers"].as_array().map(|a| a.len()), Some(5));

    let rosters = view["children"].as_object().expect("rosters object");
    let subjects: Vec<&str> = rosters.keys().map(|k| k.as_str()).collect();
    assert_eq!(subjects, vec!["Math", "Art", "Music", "Chess"]);
    assert_eq!(names(&rosters["Math"]), vec!["Tom", "Maya"]);
    assert_eq!(names(&rosters["Art"]), vec!["Tom", "Ari"]);
    assert_eq!(names(&rosters["Music"]), vec!["Dana", "Ari"]);
    assert!(names(&rosters["Chess"]).is_empty());

    let chart = &view["schoolAnalytics"];
    assert_eq!(chart["labels"], json!(["Math", "Art", "Music", "Chess"]));
    assert_eq!(chart["values"], json!([2, 2, 2, 0]));
    assert_eq!(chart["totalEnrollments"], json!(6));
    assert_eq!(view["unmatchedSubjects"], json!(["drama"]));

    assert_eq!(
        view["hobbyPairs"],
        json!([
            { "first": "Art", "second": "Music", "count": 1 },
            { "first": "Math", "second": "Art", "count": 1 },
        ])
    );
}

#[test]
fn manager_view_is_stable_across_requests() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let a = request_ok(&mut stdin, &mut reader, "1", "manager.view", json!({}));
    let b = request_ok(&mut stdin, &mut reader, "2", "manager.view", json!({}));
    assert_eq!(a, b);
}

#[test]
fn switching_to_exact_matching_changes_occupancy() {
    let (_child, mut stdin, mut reader) = spawn_with_fixtures();

    let set = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "settings.subjectMatch",
        json!({ "mode": "exact" }),
    );
    assert_eq!(set["subjectMatch"], json!("exact"));

    let view = request_ok(&mut stdin, &mut reader, "2", "manager.view", json!({}));
    assert_eq!(view["schoolAnalytics"]["values"], json!([0, 0, 0, 0]));
    assert_eq!(
        view["unmatchedSubjects"],
        json!(["math", "art", "music", "drama"])
    );
    assert_eq!(names(&view["unregisteredStudents"]), vec!["Noa"]);
}
