//! Integration tests for the method endpoints

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

macro_rules! resource {
    ($app:expr) => {{
        let namespace = create!($app, "/namespaces", json!({}));
        create!(
            $app,
            "/resources",
            json!({ "namespaceId": namespace["id"], "path": "users" })
        )
    }};
}

#[actix_web::test]
async fn test_mock_method_normalization_and_verb_conflict() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;
    let resource = resource!(app);
    let r1 = resource["id"].as_str().unwrap();

    let method = create!(
        app,
        "/methods",
        json!({
            "resourceId": r1,
            "verb": "GET",
            "integrationType": "MOCK",
            "mockResponseBody": ""
        })
    );
    assert_eq!(method["mockResponseBody"], "{}");
    assert_eq!(method["mockResponseCode"], 200);
    assert_eq!(method["integrationType"], "MOCK");

    let resp = test::call_service(
        &app,
        post_json(
            "/methods",
            json!({ "resourceId": r1, "verb": "GET", "integrationType": "MOCK" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // another verb on the same resource is fine
    create!(
        app,
        "/methods",
        json!({ "resourceId": r1, "verb": "POST", "integrationType": "MOCK" })
    );
}

#[actix_web::test]
async fn test_round_trip_with_defaults() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;
    let resource = resource!(app);

    let input = json!({
        "resourceId": resource["id"],
        "verb": "PUT",
        "integrationType": "HTTP",
        "endpointUrl": "https://backend.internal/users",
        "rateLimit": 50,
        "denyUpload": true
    });
    let created = create!(app, "/methods", input.clone());
    for (key, value) in input.as_object().unwrap() {
        assert_eq!(&created[key], value, "field {key}");
    }
    assert_eq!(created["forwardedMethod"], "PUT");
    assert_eq!(created["authType"], "NONE");
    assert_eq!(created["contentType"], "application/json");
    assert_eq!(created["endpointProtocol"], "HTTP/1.1");
    assert_eq!(created["timeoutMs"], 29000);
    assert_eq!(created["active"], true);

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/methods/{}", created["id"].as_str().unwrap()))
            .to_request(),
    )
    .await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_method_validation() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;
    let resource = resource!(app);
    let rid = resource["id"].as_str().unwrap();

    let cases = [
        // HTTP integration needs a URL
        (json!({ "resourceId": rid, "verb": "GET" }), StatusCode::CONFLICT),
        (
            json!({ "resourceId": rid, "verb": "GET", "endpointUrl": "nope" }),
            StatusCode::CONFLICT,
        ),
        (
            json!({ "resourceId": rid, "verb": "GET", "integrationType": "MOCK", "mockResponseBody": "{oops" }),
            StatusCode::CONFLICT,
        ),
        (
            json!({ "resourceId": rid, "verb": "FETCH", "integrationType": "MOCK" }),
            StatusCode::CONFLICT,
        ),
        (
            json!({ "resourceId": "bad", "verb": "GET", "integrationType": "MOCK" }),
            StatusCode::CONFLICT,
        ),
        (
            json!({ "resourceId": portico_common::new_id(), "verb": "GET", "integrationType": "MOCK" }),
            StatusCode::NOT_FOUND,
        ),
    ];
    for (body, status) in cases {
        let resp = test::call_service(&app, post_json("/methods", body.clone()).to_request()).await;
        assert_eq!(resp.status(), status, "body {body}");
    }
}

#[actix_web::test]
async fn test_list_filter_update_and_delete() {
    let (state, _) = common::state();
    let app = test::init_service(common::demo_app(state)).await;
    let first = resource!(app);
    let second = resource!(app);

    let method = create!(
        app,
        "/methods",
        json!({ "resourceId": first["id"], "verb": "GET", "integrationType": "MOCK" })
    );
    create!(
        app,
        "/methods",
        json!({ "resourceId": second["id"], "verb": "GET", "integrationType": "MOCK" })
    );

    let all: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/methods").to_request(),
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let filtered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/methods?resourceId={}",
                first["id"].as_str().unwrap()
            ))
            .to_request(),
    )
    .await;
    assert_eq!(filtered, json!([method.clone()]));

    let updated: Value = test::call_and_read_body_json(
        &app,
        common::put_json(
            "/methods",
            json!({
                "id": method["id"],
                "resourceId": first["id"],
                "verb": "GET",
                "integrationType": "MOCK",
                "mockResponseBody": "{\"hello\":\"world\"}",
                "mockResponseCode": 201
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(updated["id"], method["id"]);
    assert_eq!(updated["mockResponseCode"], 201);

    let uri = format!("/methods/{}", method["id"].as_str().unwrap());
    let deleted: Value =
        test::call_and_read_body_json(&app, test::TestRequest::delete().uri(&uri).to_request())
            .await;
    assert_eq!(deleted["deleted"], true);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
