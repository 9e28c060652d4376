//! Integration tests for the `/inventory` endpoints.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, create_gift, create_user, get, send, token_for};
use sqlx::PgPool;

fn authed(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn inventory_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(app, get("/api/v1/inventory", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_user_gets_an_empty_inventory(pool: PgPool) {
    let user = create_user(&pool, 1).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let first = body_json(send(app.clone(), get("/api/v1/inventory", Some(&token))).await).await;
    let second = body_json(send(app, get("/api/v1/inventory", Some(&token))).await).await;

    assert_eq!(first["items"].as_array().unwrap().len(), 0);
    assert_eq!(first["inventory_id"], second["inventory_id"]);
}

// ---------------------------------------------------------------------------
// Adjustments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_then_list_shows_instance_id(pool: PgPool) {
    let user = create_user(&pool, 1).await;
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/inventory/add?gift_id={}&delta=2", rose.id);
    let added = body_json(send(app.clone(), authed(Method::POST, &uri, &token)).await).await;
    assert_eq!(added["quantity"], 2);

    let uri = format!("/api/v1/inventory/add?gift_id={}", rose.id);
    let added = body_json(send(app.clone(), authed(Method::POST, &uri, &token)).await).await;
    assert_eq!(added["quantity"], 3);

    let listed = body_json(send(app, get("/api/v1/inventory", Some(&token))).await).await;
    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["instance_id"], added["instance_id"]);
    assert!(items[0]["instance_id"].as_str().unwrap().starts_with("inv_"));
    assert_eq!(items[0]["name"], "Rose");
    assert_eq!(items[0]["quantity"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_rejects_zero_negative_and_unknown_gift(pool: PgPool) {
    let user = create_user(&pool, 1).await;
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    for delta in [0, -1] {
        let uri = format!("/api/v1/inventory/add?gift_id={}&delta={delta}", rose.id);
        let response = send(app.clone(), authed(Method::POST, &uri, &token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = send(
        app,
        authed(Method::POST, "/api/v1/inventory/add?gift_id=999", &token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_to_zero_removes_the_item(pool: PgPool) {
    let user = create_user(&pool, 1).await;
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/inventory/set?gift_id={}&quantity=5", rose.id);
    let set = body_json(send(app.clone(), authed(Method::PUT, &uri, &token)).await).await;
    assert_eq!(set["quantity"], 5);

    let uri = format!("/api/v1/inventory/set?gift_id={}&quantity=0", rose.id);
    let cleared = body_json(send(app.clone(), authed(Method::PUT, &uri, &token)).await).await;
    assert_eq!(cleared["removed"], true);

    let uri = format!("/api/v1/inventory/set?gift_id={}&quantity=-1", rose.id);
    let response = send(app.clone(), authed(Method::PUT, &uri, &token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listed = body_json(send(app, get("/api/v1/inventory", Some(&token))).await).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_deletes_and_then_404s(pool: PgPool) {
    let user = create_user(&pool, 1).await;
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/inventory/add?gift_id={}", rose.id);
    send(app.clone(), authed(Method::POST, &uri, &token)).await;

    let uri = format!("/api/v1/inventory/remove?gift_id={}", rose.id);
    let response = send(app.clone(), authed(Method::DELETE, &uri, &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["removed"], true);

    let response = send(app, authed(Method::DELETE, &uri, &token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inventories_are_per_user(pool: PgPool) {
    let alice = create_user(&pool, 1).await;
    let bob = create_user(&pool, 2).await;
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/inventory/add?gift_id={}", rose.id);
    send(app.clone(), authed(Method::POST, &uri, &token_for(&alice))).await;

    let listed = body_json(send(app, get("/api/v1/inventory", Some(&token_for(&bob)))).await).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 0);
}
