// tests/user_tests.rs

use sqlx::postgres::PgPoolOptions;
use videotube::{config::Config, media::MediaClient, routes, state::AppState};

/// Stub media host: accepts uploads and deletes so handlers can run without
/// the real service.
async fn spawn_media_stub() -> String {
    let app = axum::Router::new()
        .route(
            "/upload",
            axum::routing::post(|| async {
                axum::Json(serde_json::json!({
                    "url": format!("https://media.test/{}", uuid::Uuid::new_v4()),
                    "public_id": uuid::Uuid::new_v4().to_string(),
                }))
            }),
        )
        .route(
            "/assets/{id}",
            axum::routing::delete(|| async { axum::http::StatusCode::OK }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Spawns the app on a random port and returns its base URL.
async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let media_url = spawn_media_stub().await;

    let config = Config {
        database_url: database_url.clone(),
        access_token_secret: "test_access_secret".to_string(),
        access_token_expiry: 600,
        refresh_token_secret: "test_refresh_secret".to_string(),
        refresh_token_expiry: 3600,
        media_base_url: media_url.clone(),
        media_api_key: "test-key".to_string(),
        rust_log: "error".to_string(),
    };

    let media = MediaClient::new(&media_url, "test-key");
    let state = AppState { pool, config, media };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn register_form(username: &str, email: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("fullname", "Test User")
        .text("email", email.to_string())
        .text("username", username.to_string())
        .text("password", "password123")
        .part(
            "avatar",
            reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF]).file_name("avatar.jpg"),
        )
}

async fn register(client: &reqwest::Client, address: &str, username: &str, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/users/register", address))
        .multipart(register_form(username, email))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn login(
    client: &reqwest::Client,
    address: &str,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/users/login", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn register_returns_user_without_secrets() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name);

    let response = register(&client, &address, &name, &email).await;
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], name);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("refreshToken").is_none());
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name);

    let first = register(&client, &address, &name, &email).await;
    assert_eq!(first.status().as_u16(), 201);

    // Same email, different username
    let other = format!("o_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let second = register(&client, &address, &other, &email).await;
    assert_eq!(second.status().as_u16(), 409);

    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 409);
}

#[tokio::test]
async fn register_without_avatar_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let form = reqwest::multipart::Form::new()
        .text("fullname", "Test User")
        .text("email", format!("{}@example.com", name))
        .text("username", name.clone())
        .text("password", "password123");

    let response = client
        .post(format!("{}/users/register", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name);

    register(&client, &address, &name, &email).await;

    // Unknown user -> 404
    let missing = login(&client, &address, "no_such_user", "password123").await;
    assert_eq!(missing.status().as_u16(), 404);

    // Wrong password -> 401, no tokens
    let wrong = login(&client, &address, &name, "wrong-password").await;
    assert_eq!(wrong.status().as_u16(), 401);

    // Correct password -> 200, tokens present, no password leaked
    let ok = login(&client, &address, &name, "password123").await;
    assert_eq!(ok.status().as_u16(), 200);
    let body: serde_json::Value = ok.json().await.unwrap();
    assert!(body["data"]["accessToken"].as_str().is_some());
    assert!(body["data"]["refreshToken"].as_str().is_some());
    assert!(body["data"]["user"].get("password").is_none());
    assert_eq!(body["data"]["user"]["email"], email);
}

#[tokio::test]
async fn mixed_case_username_can_log_back_in() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("Alice_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name.to_lowercase());

    let created = register(&client, &address, &name, &email).await;
    assert_eq!(created.status().as_u16(), 201);
    let body: serde_json::Value = created.json().await.unwrap();
    assert_eq!(body["data"]["username"], name.to_lowercase());

    // Logging in with the exact string used at registration must work.
    let response = login(&client, &address, &name, "password123").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["user"]["username"], name.to_lowercase());
}

#[tokio::test]
async fn refresh_token_rotation_revokes_old_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name);

    register(&client, &address, &name, &email).await;
    let body: serde_json::Value = login(&client, &address, &name, "password123")
        .await
        .json()
        .await
        .unwrap();
    let old_refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();

    // First rotation succeeds
    let rotated = client
        .post(format!("{}/users/refresh-token", address))
        .json(&serde_json::json!({"refreshToken": old_refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(rotated.status().as_u16(), 200);
    let rotated_body: serde_json::Value = rotated.json().await.unwrap();
    let new_refresh = rotated_body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(new_refresh, old_refresh);

    // The old token no longer matches the stored one
    let replay = client
        .post(format!("{}/users/refresh-token", address))
        .json(&serde_json::json!({"refreshToken": old_refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status().as_u16(), 401);
}

#[tokio::test]
async fn change_password_requires_correct_old_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", name);

    register(&client, &address, &name, &email).await;
    let body: serde_json::Value = login(&client, &address, &name, "password123")
        .await
        .json()
        .await
        .unwrap();
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let bad = client
        .post(format!("{}/users/change-password", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({"oldPassword": "nope", "newPassword": "password456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 401);

    let good = client
        .post(format!("{}/users/change-password", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({"oldPassword": "password123", "newPassword": "password456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(good.status().as_u16(), 200);

    // Old password no longer works
    let relogin = login(&client, &address, &name, "password123").await;
    assert_eq!(relogin.status().as_u16(), 401);
    let relogin_new = login(&client, &address, &name, "password456").await;
    assert_eq!(relogin_new.status().as_u16(), 200);
}

#[tokio::test]
async fn current_user_requires_auth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/users/current-user", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}
