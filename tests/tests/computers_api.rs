//! End-to-end tests for the computer and assignment endpoints.
//!
//! Every request goes through the full router and middleware stack; threshold
//! checks and lifecycle notifications run on the real dispatch pool against a
//! recording notifier.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::fixtures;
use notifier::NotificationLevel;
use integration_tests::setup::TestContext;
use serde_json::Value;

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

async fn create(server: &TestServer, body: &Value) -> Value {
    let response = server.post("/api/v1/computers").json(body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Creating a computer returns 201 with the normalized record
#[tokio::test]
async fn test_create_computer() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let body = serde_json::json!({
        "mac_address": "aa-bb-cc-00-11-22",
        "computer_name": "dev-laptop-01",
        "ip_address": "10.0.0.15",
        "employee_abbreviation": "MMU",
        "description": "Developer laptop"
    });

    let response = server.post("/api/v1/computers").json(&body).await;
    response.assert_status(StatusCode::CREATED);

    let json: Value = response.json();
    assert_eq!(json["message"], "Computer created successfully");
    assert_eq!(json["data"]["mac_address"], "AA:BB:CC:00:11:22");
    assert_eq!(json["data"]["employee_abbreviation"], "MMU");
    assert!(json["data"]["id"].as_str().is_some());
}

/// All field violations are reported together
#[tokio::test]
async fn test_create_reports_every_violation() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/api/v1/computers")
        .json(&fixtures::invalid_computer())
        .await;
    response.assert_status_bad_request();

    let json: Value = response.json();
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details = json["details"].as_array().expect("details should be present");
    assert_eq!(details.len(), 4, "got {:?}", details);
}

/// A body that is not JSON is rejected in the API error format
#[tokio::test]
async fn test_malformed_body() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/api/v1/computers")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status_bad_request();

    let json: Value = response.json();
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Invalid request body");
}

/// MAC addresses are unique regardless of input formatting
#[tokio::test]
async fn test_duplicate_mac_conflict() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let mut body = fixtures::computer("first");
    body["mac_address"] = Value::from("02:AA:BB:CC:DD:EE");
    create(&server, &body).await;

    body["computer_name"] = Value::from("second");
    body["mac_address"] = Value::from("02-aa-bb-cc-dd-ee");
    let response = server.post("/api/v1/computers").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "ALREADY_EXISTS");
}

/// Get, update, and delete round through the same record
#[tokio::test]
async fn test_get_update_delete() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let created = create(&server, &fixtures::computer("office-pc")).await;
    let id = created["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/computers/{}", id);

    let response = server.get(&path).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["computer_name"], "office-pc");

    let mut replacement = fixtures::computer("office-pc-renamed");
    replacement["mac_address"] = created["mac_address"].clone();
    let response = server.put(&path).json(&replacement).await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["message"], "Computer updated successfully");
    assert_eq!(json["data"]["computer_name"], "office-pc-renamed");
    assert_eq!(json["data"]["created_at"], created["created_at"]);

    let response = server.delete(&path).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Computer deleted successfully");

    server.get(&path).await.assert_status_not_found();
}

/// Malformed IDs are a validation error, unknown IDs are not found
#[tokio::test]
async fn test_id_errors() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.get("/api/v1/computers/not-a-uuid").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

    let response = server
        .get(&format!("/api/v1/computers/{}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

/// Lists are paginated and ordered by computer name
#[tokio::test]
async fn test_list_pagination() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    for name in ["charlie", "alpha", "bravo"] {
        create(&server, &fixtures::computer(name)).await;
    }

    let response = server
        .get("/api/v1/computers")
        .add_query_param("page", 1)
        .add_query_param("page_size", 2)
        .await;
    response.assert_status_ok();

    let json: Value = response.json();
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["computer_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "bravo"]);
    assert_eq!(json["pagination"]["total_items"], 3);
    assert_eq!(json["pagination"]["total_pages"], 2);
    assert_eq!(json["pagination"]["has_next"], true);
    assert_eq!(json["pagination"]["next_page"], 2);
}

/// Out-of-range paging parameters fall back to the defaults
#[tokio::test]
async fn test_list_invalid_paging_uses_defaults() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/api/v1/computers")
        .add_query_param("page", 0)
        .add_query_param("page_size", 1000)
        .await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["page_size"], 10);
}

/// Assign, list, and unassign through the employee endpoints
#[tokio::test]
async fn test_employee_assignment_flow() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let created = create(&server, &fixtures::computer("loaner")).await;
    let id = created["id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/v1/employees/JDO/computers/{}", id))
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["message"], "Computer successfully assigned to employee");
    assert_eq!(json["data"]["employee_abbreviation"], "JDO");

    let response = server.get("/api/v1/employees/JDO/computers").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["pagination"]["total_items"], 1);

    // Only the current holder can release it
    let response = server
        .delete(&format!("/api/v1/employees/XYZ/computers/{}", id))
        .await;
    response.assert_status_not_found();

    let response = server
        .delete(&format!("/api/v1/employees/JDO/computers/{}", id))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "Computer successfully removed from employee"
    );

    let response = server.get("/api/v1/employees/JDO/computers").await;
    assert_eq!(response.json::<Value>()["pagination"]["total_items"], 0);
}

/// Employee codes in the path are validated
#[tokio::test]
async fn test_invalid_employee_code() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.get("/api/v1/employees/TOOLONG/computers").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}

/// Reaching the threshold through the API sends a warning off the request path
#[tokio::test]
async fn test_third_assignment_triggers_warning() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    for i in 0..3 {
        create(&server, &fixtures::assigned_computer(&format!("pc-{}", i), "ABC")).await;
    }

    let warnings = ctx.wait_for_type("threshold_exceeded", 1).await;
    assert!(!warnings.is_empty());

    for notification in warnings {
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert_eq!(notification.employee_abbreviation, "ABC");
        assert_eq!(
            notification.message,
            "Employee ABC has 3 computers assigned (threshold: 3)"
        );
        assert_eq!(notification.metadata["computer_count"], "3");
    }
}

/// Unassigned computers never trigger a threshold check
#[tokio::test]
async fn test_unassigned_create_skips_check() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    create(&server, &fixtures::computer("spare")).await;
    create(&server, &fixtures::assigned_computer("marker", "QRS")).await;

    // The assigned create is the only check that reaches the registry.
    assert_eq!(ctx.wait_for_checks(1).await, 1);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(ctx.registry.count_calls(), 1);
}

/// Registry failures during the check do not affect the response
#[tokio::test]
async fn test_check_failure_is_invisible_to_caller() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    ctx.registry.set_fail_counts(true);

    let response = server
        .post("/api/v1/computers")
        .json(&fixtures::assigned_computer("desk", "ERR"))
        .await;
    response.assert_status(StatusCode::CREATED);

    assert_eq!(ctx.wait_for_checks(1).await, 1);
    assert!(ctx.notifier.of_type("threshold_exceeded").is_empty());
}

/// Creating an assigned computer announces it; unassigned creates stay quiet
#[tokio::test]
async fn test_create_announces_assigned_computer() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    create(&server, &fixtures::computer("spare")).await;
    let created = create(&server, &fixtures::assigned_computer("laptop", "JDO")).await;

    let sent = ctx.wait_for_type("computer_created", 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(ctx.notifier.of_type("computer_created").len(), 1);

    let n = &sent[0];
    assert_eq!(n.level, NotificationLevel::Info);
    assert_eq!(n.employee_abbreviation, "JDO");
    assert_eq!(n.message, "Computer laptop created for employee JDO");
    assert_eq!(n.metadata["computer_id"], created["id"].as_str().unwrap());
    assert_eq!(n.metadata["computer_name"], "laptop");
}

/// Reassigning through an update is announced; other edits are not
#[tokio::test]
async fn test_update_announces_reassignment() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let created = create(&server, &fixtures::assigned_computer("workstation", "ABC")).await;
    let path = format!("/api/v1/computers/{}", created["id"].as_str().unwrap());

    let mut renamed = fixtures::assigned_computer("workstation-2", "ABC");
    renamed["mac_address"] = created["mac_address"].clone();
    server.put(&path).json(&renamed).await.assert_status_ok();

    let mut moved = fixtures::assigned_computer("workstation-2", "XYZ");
    moved["mac_address"] = created["mac_address"].clone();
    server.put(&path).json(&moved).await.assert_status_ok();

    let sent = ctx.wait_for_type("computer_updated", 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(ctx.notifier.of_type("computer_updated").len(), 1);

    let n = &sent[0];
    assert_eq!(n.level, NotificationLevel::Info);
    assert_eq!(n.employee_abbreviation, "XYZ");
    assert_eq!(
        n.message,
        "Computer workstation-2 updated (reassigned from ABC to XYZ)"
    );
    assert_eq!(n.metadata["old_employee"], "ABC");
    assert_eq!(n.metadata["new_employee"], "XYZ");
    assert_eq!(n.metadata["computer_id"], created["id"].as_str().unwrap());
}

/// Deleting an assigned computer sends a warning; unassigned deletes stay quiet
#[tokio::test]
async fn test_delete_announces_assigned_computer() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let spare = create(&server, &fixtures::computer("spare")).await;
    let assigned = create(&server, &fixtures::assigned_computer("retired", "QRS")).await;

    for record in [&spare, &assigned] {
        server
            .delete(&format!("/api/v1/computers/{}", record["id"].as_str().unwrap()))
            .await
            .assert_status_ok();
    }

    let sent = ctx.wait_for_type("computer_deleted", 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(ctx.notifier.of_type("computer_deleted").len(), 1);

    let n = &sent[0];
    assert_eq!(n.level, NotificationLevel::Warning);
    assert_eq!(n.message, "Computer retired deleted (was assigned to QRS)");
    assert_eq!(n.metadata["computer_id"], assigned["id"].as_str().unwrap());
    assert_eq!(n.metadata["computer_name"], "retired");
}
