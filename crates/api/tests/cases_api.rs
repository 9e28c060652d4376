//! Integration tests for the `/cases` endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, create_case, create_gift, get, send};
use sqlx::PgPool;

fn open(case_id: i64) -> Request<Body> {
    Request::post(format!("/api/v1/cases/{case_id}/open-case"))
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Listing and detail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_cases_in_data_envelope(pool: PgPool) {
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    create_case(&pool, "Starter", &[rose.id]).await;
    create_case(&pool, "Premium", &[rose.id]).await;
    let app = common::build_test_app(pool);

    let response = send(app, get("/api/v1/cases?limit=1", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn detail_lists_gifts_without_weights(pool: PgPool) {
    let rose = create_gift(&pool, "Rose", 5.0, 1.0, 10.0).await;
    let bear = create_gift(&pool, "Bear", 1.0, 5.0, 50.0).await;
    let case_id = create_case(&pool, "Starter", &[bear.id, rose.id]).await;
    let app = common::build_test_app(pool);

    let json = body_json(send(app, get(&format!("/api/v1/cases/{case_id}"), None)).await).await;

    assert_eq!(json["data"]["name"], "Starter");
    let gifts = json["data"]["gifts"].as_array().unwrap();
    assert_eq!(gifts.len(), 2);
    assert_eq!(gifts[0]["id"], rose.id);
    for gift in gifts {
        assert!(gift.get("real_rarity").is_none());
        assert!(gift.get("visual_rarity").is_none());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_case_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(app.clone(), get("/api/v1/cases/999", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(app, open(999)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_case_returns_full_strip_with_drop_index(pool: PgPool) {
    let rose = create_gift(&pool, "Rose", 10.0, 1.0, 10.0).await;
    let bear = create_gift(&pool, "Bear", 1.0, 10.0, 50.0).await;
    let ids = [rose.id, bear.id];
    let case_id = create_case(&pool, "Starter", &ids).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = send(app.clone(), open(case_id)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let strip = json["gifts"].as_array().unwrap();
        assert_eq!(strip.len(), 111);

        let drop_index = json["drop_index"].as_u64().unwrap() as usize;
        assert!((90..=100).contains(&drop_index));
        for slot in strip {
            assert!(ids.contains(&slot["id"].as_i64().unwrap()));
            assert!(slot.get("real_rarity").is_none());
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_gift_case_fills_every_slot(pool: PgPool) {
    let rose = create_gift(&pool, "Rose", 1.0, 1.0, 10.0).await;
    let case_id = create_case(&pool, "Mono", &[rose.id]).await;
    let app = common::build_test_app(pool);

    let json = body_json(send(app, open(case_id)).await).await;

    let strip = json["gifts"].as_array().unwrap();
    assert!(strip.iter().all(|slot| slot["name"] == "Rose"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_case_cannot_be_opened(pool: PgPool) {
    let case_id = create_case(&pool, "Empty", &[]).await;
    let app = common::build_test_app(pool);

    let response = send(app, open(case_id)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Case is empty");
}
