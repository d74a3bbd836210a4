mod common;

use serde_json::json;
use wiremock::MockServer;

async fn sok_class_server() -> MockServer {
    let server = MockServer::start().await;
    common::mount_login(&server, "admin").await;
    common::mount_data(
        &server,
        json!([["Ms. Sok", "Female", 2, 125, 0, 0]]),
        json!([
            common::student_row("Dara", "Male", "Grade5", "Ms. Sok", "50 $", "2024-03-01"),
            common::student_row("Sreymom", "Female", "Grade5", "Ms. Sok", "75 $", "2024-03-15"),
        ]),
    )
    .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn teacher_and_date_range_narrow_to_one_record_with_split_totals() {
    let server = sok_class_server().await;
    let (_child, mut stdin, mut reader) = common::spawn_sidecar();
    let counts = common::open_session(&mut stdin, &mut reader, &server.uri());
    assert_eq!(counts["students"], json!(2));
    assert_eq!(counts["teachers"], json!(1));

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.filter",
        json!({ "teacher": "Ms. Sok", "dateFrom": "2024-03-01", "dateTo": "2024-03-10" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(1));
    assert_eq!(view["rows"][0]["name"], json!("Dara"));
    assert_eq!(view["rows"][0]["fee"], json!(50.0));
    assert_eq!(view["totals"]["totalFee"], json!(50.0));
    assert_eq!(view["totals"]["teacherShare"], json!(40.0));
    assert_eq!(view["totals"]["schoolShare"], json!(10.0));

    // Re-applying the same criteria is a no-op on the outcome.
    let again = common::request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.filter",
        json!({ "teacher": "Ms. Sok", "dateFrom": "2024-03-01", "dateTo": "2024-03-10" }),
    );
    assert_eq!(again, view);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_sentinel_and_blank_criteria_are_wildcards() {
    let server = sok_class_server().await;
    let (_child, mut stdin, mut reader) = common::spawn_sidecar();
    common::open_session(&mut stdin, &mut reader, &server.uri());

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.filter",
        json!({ "teacher": "ALL", "grade": "", "gender": "ALL" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(2));
    assert_eq!(view["criteria"]["teacher"], json!(null));
}

#[tokio::test(flavor = "multi_thread")]
async fn query_matches_either_name_or_teacher_case_insensitively() {
    let server = sok_class_server().await;
    let (_child, mut stdin, mut reader) = common::spawn_sidecar();
    common::open_session(&mut stdin, &mut reader, &server.uri());

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.filter",
        json!({ "query": "sreymom" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(1));
    assert_eq!(view["rows"][0]["name"], json!("Sreymom"));

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.filter",
        json!({ "query": "ms. sok" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn records_without_a_parseable_date_fail_closed_under_date_bounds() {
    let server = MockServer::start().await;
    common::mount_login(&server, "admin").await;
    common::mount_data(
        &server,
        json!([]),
        json!([
            common::student_row("Dara", "Male", "Grade5", "Ms. Sok", "50", "2024-03-05"),
            common::student_row("NoDate", "Male", "Grade5", "Ms. Sok", "60", "pending"),
        ]),
    )
    .await;

    let (_child, mut stdin, mut reader) = common::spawn_sidecar();
    common::open_session(&mut stdin, &mut reader, &server.uri());

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.filter",
        json!({ "dateFrom": "2024-03-01" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(1));
    assert_eq!(view["rows"][0]["name"], json!("Dara"));

    // Without date bounds the unparseable record is a normal row.
    let view = common::request_ok(&mut stdin, &mut reader, "11", "students.filter", json!({}));
    assert_eq!(view["pagination"]["totalItems"], json!(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_result_is_a_valid_page_one_of_one() {
    let server = sok_class_server().await;
    let (_child, mut stdin, mut reader) = common::spawn_sidecar();
    common::open_session(&mut stdin, &mut reader, &server.uri());

    let view = common::request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.filter",
        json!({ "teacher": "Mr. Nobody" }),
    );
    assert_eq!(view["pagination"]["totalItems"], json!(0));
    assert_eq!(view["pagination"]["totalPages"], json!(1));
    assert_eq!(view["pagination"]["page"], json!(1));
    assert_eq!(view["pagination"]["start"], json!(0));
    assert_eq!(view["pagination"]["end"], json!(0));
    assert_eq!(view["rows"], json!([]));
    assert_eq!(view["totals"]["totalFee"], json!(0.0));
}
