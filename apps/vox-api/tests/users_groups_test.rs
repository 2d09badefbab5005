mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_returns_user_with_correct_fields() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/users")
        .json(&serde_json::json!({ "name": "Alice", "email": "alice@vox.test" }))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    assert!(body["id"].as_str().unwrap().starts_with("usr_"));
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@vox.test");
}

#[tokio::test]
async fn create_user_rejects_invalid_email() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/users")
        .json(&serde_json::json!({ "name": "Alice", "email": "not-an-email" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn get_unknown_user_returns_not_found() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/api/v1/users/usr_missing").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Groups: create / fetch / update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_group_requires_existing_owner() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/groups")
        .json(&serde_json::json!({ "name": "Finals", "owner": "usr_missing" }))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_group_requires_existing_parent() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner1").await;

    let resp = server
        .post("/api/v1/groups")
        .json(&serde_json::json!({
            "name": "Orphan",
            "owner": owner,
            "parent": "grp_missing",
        }))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_root_group_has_no_parent_field() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner2").await;

    let resp = server
        .post("/api/v1/groups")
        .json(&serde_json::json!({ "name": "Finals", "owner": owner }))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    assert!(body["id"].as_str().unwrap().starts_with("grp_"));
    assert_eq!(body["name"], "Finals");
    assert_eq!(body["owner"], owner);
    assert!(body.get("parent").is_none());
}

#[tokio::test]
async fn update_group_renames_but_never_moves_owner() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner3").await;
    let group = common::create_group(&server, "Old name", &owner, None).await;

    let resp = server
        .patch(&format!("/api/v1/groups/{group}"))
        .json(&serde_json::json!({ "name": "New name", "owner": "usr_other" }))
        .await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["name"], "New name");
    // The owner field in the payload is ignored, not applied.
    assert_eq!(body["owner"], owner);
}

#[tokio::test]
async fn update_group_validates_a_new_parent() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner4").await;
    let group = common::create_group(&server, "Movable", &owner, None).await;
    let target = common::create_group(&server, "Target", &owner, None).await;

    let resp = server
        .patch(&format!("/api/v1/groups/{group}"))
        .json(&serde_json::json!({ "parent": "grp_missing" }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    let resp = server
        .patch(&format!("/api/v1/groups/{group}"))
        .json(&serde_json::json!({ "parent": target }))
        .await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["parent"], target);
}

#[tokio::test]
async fn delete_group_then_fetch_returns_not_found() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner5").await;
    let group = common::create_group(&server, "Doomed", &owner, None).await;

    let resp = server.delete(&format!("/api/v1/groups/{group}")).await;
    resp.assert_status(StatusCode::NO_CONTENT);

    let resp = server.get(&format!("/api/v1/groups/{group}")).await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Groups: listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_group_listing_sorts_by_name_and_pages_by_ten() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner6").await;

    for i in 0..12 {
        common::create_group(&server, &format!("Group {i:02}"), &owner, None).await;
    }
    // A subgroup must not appear among root groups.
    let root = common::create_group(&server, "A root", &owner, None).await;
    common::create_group(&server, "A child", &owner, Some(&root)).await;

    let resp = server.get(&format!("/api/v1/users/{owner}/groups")).await;
    resp.assert_status_ok();
    let page0: serde_json::Value = resp.json();
    let names: Vec<&str> = page0
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "A root");
    assert_eq!(names[1], "Group 00");

    let resp = server
        .get(&format!("/api/v1/users/{owner}/groups?page=1"))
        .await;
    resp.assert_status_ok();
    let page1: serde_json::Value = resp.json();
    assert_eq!(page1.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn child_listing_returns_only_direct_subgroups() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner7").await;
    let root = common::create_group(&server, "Root", &owner, None).await;
    let child = common::create_group(&server, "Child", &owner, Some(&root)).await;
    common::create_group(&server, "Grandchild", &owner, Some(&child)).await;

    let resp = server
        .get(&format!("/api/v1/groups/{root}/children"))
        .await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    let children = body.as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["name"], "Child");
}

// ---------------------------------------------------------------------------
// Groups: hierarchy views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hierarchy_views_classify_root_and_child() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner8").await;
    let root = common::create_group(&server, "Root", &owner, None).await;
    let child = common::create_group(&server, "Child", &owner, Some(&root)).await;
    common::create_participant(&server, "Ana", &child).await;

    // Root has a subgroup, so only Child is a leaf.
    let resp = server
        .get(&format!("/api/v1/users/{owner}/groups/leaves"))
        .await;
    resp.assert_status_ok();
    let leaves: serde_json::Value = resp.json();
    let leaves = leaves.as_array().unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0]["id"], child);
    assert_eq!(leaves[0]["parent"], "Root");
    assert_eq!(leaves[0]["is_subgroup"], true);

    let resp = server
        .get(&format!("/api/v1/users/{owner}/groups/without-participants"))
        .await;
    resp.assert_status_ok();
    let empty: serde_json::Value = resp.json();
    let empty = empty.as_array().unwrap();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0]["id"], root);
    assert!(empty[0].get("parent").is_none());
    assert_eq!(empty[0]["is_subgroup"], false);

    let resp = server
        .get(&format!("/api/v1/users/{owner}/groups/with-participants"))
        .await;
    resp.assert_status_ok();
    let populated: serde_json::Value = resp.json();
    let populated = populated.as_array().unwrap();
    assert_eq!(populated.len(), 1);
    assert_eq!(populated[0]["id"], child);
}

#[tokio::test]
async fn hierarchy_views_for_unknown_owner_are_empty() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/api/v1/users/usr_missing/groups/leaves").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Groups: poll result
// ---------------------------------------------------------------------------

#[tokio::test]
async fn result_ranks_by_votes_desc_then_name_asc() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner9").await;
    let group = common::create_group(&server, "Finals", &owner, None).await;

    common::create_participant(&server, "Ana", &group).await;
    let bia = common::create_participant(&server, "Bia", &group).await;
    let caio = common::create_participant(&server, "Caio", &group).await;

    for participant in [&bia, &caio] {
        for _ in 0..3 {
            let resp = server
                .post("/api/v1/votes")
                .json(&serde_json::json!({ "participant": participant }))
                .await;
            resp.assert_status(StatusCode::CREATED);
        }
    }

    let resp = server.get(&format!("/api/v1/groups/{group}/result")).await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["group"]["id"], group);
    assert_eq!(body["group"]["name"], "Finals");

    let ranked: Vec<(&str, u64)> = body["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].as_str().unwrap(), p["votes"].as_u64().unwrap()))
        .collect();
    // Bia and Caio tie at 3 and rank alphabetically; Ana trails with 0.
    assert_eq!(ranked, vec![("Bia", 3), ("Caio", 3), ("Ana", 0)]);
}

#[tokio::test]
async fn result_for_group_without_participants_is_empty() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner10").await;
    let group = common::create_group(&server, "Quiet", &owner, None).await;

    let resp = server.get(&format!("/api/v1/groups/{group}/result")).await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["participants"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn result_for_unknown_group_returns_not_found() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/api/v1/groups/grp_missing/result").await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn result_is_stable_without_intervening_votes() {
    let (app, _state) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let owner = common::create_user(&server, "owner11").await;
    let group = common::create_group(&server, "Stable", &owner, None).await;
    let ana = common::create_participant(&server, "Ana", &group).await;

    let resp = server
        .post("/api/v1/votes")
        .json(&serde_json::json!({ "participant": ana }))
        .await;
    resp.assert_status(StatusCode::CREATED);

    let first: serde_json::Value = server
        .get(&format!("/api/v1/groups/{group}/result"))
        .await
        .json();
    let second: serde_json::Value = server
        .get(&format!("/api/v1/groups/{group}/result"))
        .await
        .json();
    assert_eq!(first, second);
}
