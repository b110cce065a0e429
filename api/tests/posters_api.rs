//! Integration tests for poster metadata CRUD, browsing and search.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, body_bytes, body_json, create_poster, get, json_request, send, test_app,
};
use poster_board_api::routes::ENDPOINTS;
use serde_json::json;

// ---------------------------------------------------------------------------
// Health and routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app();
    let response = get(&app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_i64());
    assert_eq!(json["storage"], "memory");
    assert_eq!(json["posters"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = test_app();
    let response = get(&app.router, "/api/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_listed_endpoint_is_routed() {
    let app = test_app();
    let token = admin_token();

    for (method, path, _) in ENDPOINTS {
        let uri = path
            .replace("{key}", "posters/missing.png")
            .replace("{id}", "poster_0_missing")
            .replace("{category}", "gongke")
            .replace("{page}", "1");
        let method: Method = method.parse().unwrap();
        let response = send(
            &app.router,
            json_request(method.clone(), &uri, None, Some(&token)),
        )
        .await;

        let status = response.status();
        assert_ne!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        if status == StatusCode::NOT_FOUND {
            // Handler-level 404s carry a JSON error; an unmatched route has no body.
            let body = body_bytes(response).await;
            let json: serde_json::Value = serde_json::from_slice(&body)
                .unwrap_or_else(|_| panic!("{method} {uri} is not routed"));
            assert!(json["error"].is_string(), "{method} {uri}");
        }
    }
}

#[tokio::test]
async fn malformed_requests_get_json_400() {
    let app = test_app();
    let token = admin_token();

    let no_title = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/poster-metadata",
            Some(json!({"category": "工科", "imageKey": "posters/a.png"})),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(no_title.status(), StatusCode::BAD_REQUEST);
    let error = body_json(no_title).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("title"), "{error}");

    let not_json = send(
        &app.router,
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/admin/login")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{password"))
            .unwrap(),
    )
    .await;
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(not_json).await["error"].is_string());

    for uri in ["/api/exported-data/gongke/abc", "/api/posters?page=-1"] {
        let response = get(&app.router, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(body_json(response).await["error"].is_string(), "{uri}");
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writes_require_admin_token() {
    let app = test_app();
    let body = json!({"title": "t", "category": "工科", "imageKey": "posters/t.png"});

    let anonymous = send(
        &app.router,
        json_request(Method::POST, "/api/poster-metadata", Some(body.clone()), None),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(anonymous).await["error"], "Unauthorized");

    let forged = send(
        &app.router,
        json_request(Method::POST, "/api/poster-metadata", Some(body), Some("not-a-jwt")),
    )
    .await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let delete = send(
        &app.router,
        json_request(Method::DELETE, "/api/poster-metadata/poster_1_x", None, None),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn poster_lifecycle() {
    let app = test_app();
    let token = admin_token();

    let created = create_poster(&app.router, "Solar Car", "gongke").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("poster_"));
    assert_eq!(created["category"], "工科");
    assert_eq!(
        created["imageUrl"],
        "https://posters.example.com/api/get-poster-url/posters/Solar-Car.png"
    );
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let fetched = get(&app.router, &format!("/api/poster-metadata/{id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["poster"], created);

    let updated = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/poster-metadata/{id}"),
            Some(json!({"title": "Solar Racer", "targetAudience": ["mechanical", " "]})),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await["poster"].clone();
    assert_eq!(updated["title"], "Solar Racer");
    assert_eq!(updated["targetAudience"], json!(["mechanical"]));
    assert_eq!(updated["description"], "Solar Car description");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let deleted = send(
        &app.router,
        json_request(Method::DELETE, &format!("/api/poster-metadata/{id}"), None, Some(&token)),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await["success"], true);

    let gone = get(&app.router, &format!("/api/poster-metadata/{id}")).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let deleted_again = send(
        &app.router,
        json_request(Method::DELETE, &format!("/api/poster-metadata/{id}"), None, Some(&token)),
    )
    .await;
    assert_eq!(deleted_again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_json_error() {
    let app = test_app();
    let token = admin_token();

    for body in [
        json!({"title": "   ", "category": "工科", "imageKey": "posters/a.png"}),
        json!({"title": "ok", "category": "history", "imageKey": "posters/a.png"}),
        json!({"title": "ok", "category": "文科", "imageKey": ""}),
    ] {
        let response = send(
            &app.router,
            json_request(Method::POST, "/api/poster-metadata", Some(body.clone()), Some(&token)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert!(body_json(response).await["error"].is_string());
    }

    let missing = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/poster-metadata/poster_0_missing",
            Some(json!({"title": "x"})),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing, categories and search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_by_category() {
    let app = test_app();
    create_poster(&app.router, "Bridges", "工科").await;
    create_poster(&app.router, "Poems", "wenke").await;
    create_poster(&app.router, "Circuits", "Engineering / Technology").await;

    let all = body_json(get(&app.router, "/api/poster-metadata").await).await;
    assert_eq!(all["posters"].as_array().unwrap().len(), 3);

    let engineering = body_json(get(&app.router, "/api/poster-metadata?category=gongke").await).await;
    let titles: Vec<&str> = engineering["posters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Bridges") && titles.contains(&"Circuits"));

    let bad = get(&app.router, "/api/poster-metadata?category=history").await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_reflect_usage_and_fixed_table() {
    let app = test_app();
    create_poster(&app.router, "Markets", "商科").await;
    create_poster(&app.router, "Atoms", "理科").await;

    let used = body_json(get(&app.router, "/api/categories").await).await;
    assert_eq!(used["categories"], json!(["商科", "理科"]));

    let table = body_json(get(&app.router, "/api/category-list").await).await;
    let table = table.as_array().unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table[0]["id"], "工科");
    assert_eq!(table[0]["slug"], "gongke");
    assert_eq!(table[3]["englishName"], "Science / Natural Sciences");
}

#[tokio::test]
async fn browse_paginates_and_searches() {
    let app = test_app();
    for n in 0..7 {
        create_poster(&app.router, &format!("Robot {n}"), "工科").await;
    }
    create_poster(&app.router, "Sonnets", "文科").await;

    let first = body_json(get(&app.router, "/api/posters?category=gongke&page=1&limit=5").await).await;
    assert_eq!(first["data"].as_array().unwrap().len(), 5);
    assert_eq!(first["total"], 7);
    assert_eq!(first["totalPages"], 2);
    assert_eq!(first["hasMore"], true);

    let second = body_json(get(&app.router, "/api/posters?category=gongke&page=2&limit=5").await).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 2);
    assert_eq!(second["hasMore"], false);

    let search = body_json(get(&app.router, "/api/posters?q=SONNET").await).await;
    assert_eq!(search["total"], 1);
    assert_eq!(search["data"][0]["title"], "Sonnets");

    let audience = body_json(get(&app.router, "/api/posters?q=students&limit=100").await).await;
    assert_eq!(audience["total"], 8);
}
