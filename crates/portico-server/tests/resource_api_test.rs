//! Integration tests for the resource endpoints and the routing tree

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};

use common::post_json;

macro_rules! create {
    ($app:expr, $uri:expr, $body:expr) => {{
        let resp = test::call_service(&$app, post_json($uri, $body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "POST {} failed", $uri);
        let value: Value = test::read_body_json(resp).await;
        value
    }};
}

#[actix_web::test]
async fn test_tree_scenario() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({ "name": "N1" }));
    let n1 = namespace["id"].as_str().unwrap();

    let users = create!(
        app,
        "/resources",
        json!({ "namespaceId": n1, "parentResourceId": null, "path": "users" })
    );
    let r1 = users["id"].as_str().unwrap();

    let profile = create!(
        app,
        "/resources",
        json!({ "namespaceId": n1, "parentResourceId": r1, "path": "profile" })
    );
    let r2 = profile["id"].as_str().unwrap();

    let tree: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/namespaces/{n1}/resources/tree"))
            .to_request(),
    )
    .await;

    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], r1);
    assert_eq!(roots[0]["path"], "users");
    let children = roots[0]["childResources"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], r2);
    assert_eq!(children[0]["path"], "profile");
    assert!(children[0]["childResources"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_tree_carries_methods() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({}));
    let ns = namespace["id"].as_str().unwrap();
    let root = create!(app, "/resources", json!({ "namespaceId": ns, "path": "orders" }));
    let root_id = root["id"].as_str().unwrap();
    create!(
        app,
        "/methods",
        json!({ "resourceId": root_id, "verb": "GET", "integrationType": "MOCK" })
    );

    let tree: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/namespaces/{ns}/resources/tree"))
            .to_request(),
    )
    .await;
    let methods = tree[0]["methods"].as_array().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0]["verb"], "GET");

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/resources/{root_id}/methods"))
            .to_request(),
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_tree_of_unknown_namespace() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/namespaces/{}/resources/tree",
                portico_common::new_id()
            ))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sibling_path_conflict() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({}));
    let ns = namespace["id"].as_str().unwrap();
    create!(app, "/resources", json!({ "namespaceId": ns, "path": "users" }));

    let resp = test::call_service(
        &app,
        post_json("/resources", json!({ "namespaceId": ns, "path": "users" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], "Conflict");
}

#[actix_web::test]
async fn test_validation_statuses() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({}));
    let ns = namespace["id"].as_str().unwrap();

    let cases = [
        (json!({ "namespaceId": "nope", "path": "a" }), StatusCode::CONFLICT),
        (json!({ "namespaceId": ns, "path": "a/b" }), StatusCode::CONFLICT),
        (json!({ "namespaceId": ns, "path": "" }), StatusCode::CONFLICT),
        (
            json!({ "namespaceId": portico_common::new_id(), "path": "a" }),
            StatusCode::NOT_FOUND,
        ),
        (
            json!({ "namespaceId": ns, "parentResourceId": portico_common::new_id(), "path": "a" }),
            StatusCode::NOT_FOUND,
        ),
    ];
    for (body, status) in cases {
        let resp = test::call_service(&app, post_json("/resources", body.clone()).to_request()).await;
        assert_eq!(resp.status(), status, "body {body}");
    }
}

#[actix_web::test]
async fn test_parent_must_share_namespace() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let first = create!(app, "/namespaces", json!({}));
    let second = create!(app, "/namespaces", json!({}));
    let parent = create!(
        app,
        "/resources",
        json!({ "namespaceId": first["id"], "path": "users" })
    );

    let resp = test::call_service(
        &app,
        post_json(
            "/resources",
            json!({ "namespaceId": second["id"], "parentResourceId": parent["id"], "path": "x" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_list_filter_and_round_trip() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let first = create!(app, "/namespaces", json!({}));
    let second = create!(app, "/namespaces", json!({}));
    let a = create!(app, "/resources", json!({ "namespaceId": first["id"], "path": "a" }));
    create!(app, "/resources", json!({ "namespaceId": second["id"], "path": "b" }));

    let all: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/resources").to_request(),
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let filtered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/resources?namespaceId={}",
                first["id"].as_str().unwrap()
            ))
            .to_request(),
    )
    .await;
    assert_eq!(filtered, json!([a.clone()]));

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/resources/{}", a["id"].as_str().unwrap()))
            .to_request(),
    )
    .await;
    assert_eq!(fetched, a);
}

#[actix_web::test]
async fn test_update_cannot_reparent() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({}));
    let ns = namespace["id"].as_str().unwrap();
    let a = create!(app, "/resources", json!({ "namespaceId": ns, "path": "a" }));
    let b = create!(app, "/resources", json!({ "namespaceId": ns, "path": "b" }));

    let resp = test::call_service(
        &app,
        common::put_json(
            "/resources",
            json!({ "id": b["id"], "namespaceId": ns, "parentResourceId": a["id"], "path": "b" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let renamed: Value = test::call_and_read_body_json(
        &app,
        common::put_json(
            "/resources",
            json!({ "id": b["id"], "namespaceId": ns, "path": "b2" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(renamed["path"], "b2");
    assert_eq!(renamed["id"], b["id"]);
}

#[actix_web::test]
async fn test_delete_guard() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;

    let namespace = create!(app, "/namespaces", json!({}));
    let ns = namespace["id"].as_str().unwrap();
    let parent = create!(app, "/resources", json!({ "namespaceId": ns, "path": "p" }));
    let child = create!(
        app,
        "/resources",
        json!({ "namespaceId": ns, "parentResourceId": parent["id"], "path": "c" })
    );

    let parent_uri = format!("/resources/{}", parent["id"].as_str().unwrap());
    let resp = test::call_service(&app, test::TestRequest::delete().uri(&parent_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let child_uri = format!("/resources/{}", child["id"].as_str().unwrap());
    let deleted: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete().uri(&child_uri).to_request(),
    )
    .await;
    assert_eq!(deleted["deleted"], true);

    let deleted: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete().uri(&parent_uri).to_request(),
    )
    .await;
    assert_eq!(deleted["deleted"], true);
}
