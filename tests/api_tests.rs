mod common;

use axum::http::StatusCode;
use common::{PREFIX, spawn_app, spawn_app_with, test_config};
use facegate::models::training::NewTraining;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = app.get(&format!("{PREFIX}/health"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = spawn_app().await;

    let (status, body) = app.register("Ana", "Ana@Example.com", "EMP-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["employee_id"], "EMP-1");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app.login("ana@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["name"], "Ana");

    let (status, body) = app.get(&format!("{PREFIX}/auth/me"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.com");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app.get(&format!("{PREFIX}/auth/me"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .get(&format!("{PREFIX}/tasks"), Some("not-a-real-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = spawn_app().await;

    let (status, _) = app.register("Ana", "ana@example.com", "EMP-1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.register("Other", "ANA@example.com", "EMP-2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = app.register("Other", "other@example.com", "EMP-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Employee ID already registered");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    let (status, _) = app.register("", "ana@example.com", "EMP-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.register("Ana", "not-an-email", "EMP-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            &format!("{PREFIX}/auth/register"),
            None,
            json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "123",
                "employee_id": "EMP-1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    app.signed_in("ana@example.com", "EMP-1").await;

    let (wrong_status, wrong_body) = app.login("ana@example.com", "wrong-password").await;
    let (unknown_status, unknown_body) = app.login("nobody@example.com", "secret123").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_forgot_password() {
    let app = spawn_app().await;
    app.signed_in("ana@example.com", "EMP-1").await;

    let (status, body) = app
        .json(
            "POST",
            &format!("{PREFIX}/auth/forgot-password"),
            None,
            json!({ "email": "ana@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["message"].is_string());

    let (status, _) = app
        .json(
            "POST",
            &format!("{PREFIX}/auth/forgot-password"),
            None,
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_update_keeps_empty_fields() {
    let app = spawn_app().await;
    let (_, token) = app.signed_in("ana@example.com", "EMP-1").await;
    let path = format!("{PREFIX}/user/profile");

    let (status, body) = app
        .json(
            "PUT",
            &path,
            Some(&token),
            json!({ "name": "Ana Maria", "position": "Engineer" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["position"], "Engineer");

    let (status, body) = app
        .json("PUT", &path, Some(&token), json!({ "name": "", "position": "Lead" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana Maria");
    assert_eq!(body["data"]["position"], "Lead");
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    let (_, token) = app.signed_in("ana@example.com", "EMP-1").await;
    let path = format!("{PREFIX}/user/change-password");

    let (status, body) = app
        .json(
            "PUT",
            &path,
            Some(&token),
            json!({ "old_password": "wrong-one", "new_password": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = app
        .json(
            "PUT",
            &path,
            Some(&token),
            json!({ "old_password": "secret123", "new_password": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("ana@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("ana@example.com", "newsecret").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_profile_photo() {
    let app = spawn_app().await;
    let (_, token) = app.signed_in("ana@example.com", "EMP-1").await;
    let path = format!("{PREFIX}/user/upload-profile-photo");

    let (status, _) = app.multipart(&path, Some(&token), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .multipart(&path, Some(&token), Some(b"jpeg-bytes"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["profile_photo_url"],
        "https://assets.test/profile/1.jpg"
    );
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = spawn_app().await;
    let (user_id, token) = app.signed_in("ana@example.com", "EMP-1").await;
    let tasks = format!("{PREFIX}/tasks");

    let (status, body) = app
        .json(
            "POST",
            &tasks,
            Some(&token),
            json!({ "title": "Write report", "description": "Q1 numbers" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["user_id"], user_id);
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    let task_path = format!("{tasks}/{task_id}");

    app.json("POST", &tasks, Some(&token), json!({ "title": "File expenses" }))
        .await;

    let (status, body) = app.get(&tasks, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .json(
            "PUT",
            &task_path,
            Some(&token),
            json!({ "title": "", "status": "in_progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Write report");
    assert_eq!(body["data"]["status"], "in_progress");

    let (status, body) = app
        .get(&format!("{tasks}?status=in_progress"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let filtered = body["data"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], task_id.as_str());

    let (status, _) = app
        .json("PUT", &task_path, Some(&token), json!({ "status": "done" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&task_path, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&task_path, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&tasks, Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_task_ownership_enforcement() {
    let mut config = test_config();
    config.access.enforce_task_ownership = true;
    let app = spawn_app_with(config).await;

    let (_, owner) = app.signed_in("ana@example.com", "EMP-1").await;
    let (_, other) = app.signed_in("ben@example.com", "EMP-2").await;

    let (_, body) = app
        .json(
            "POST",
            &format!("{PREFIX}/tasks"),
            Some(&owner),
            json!({ "title": "Private" }),
        )
        .await;
    let task_path = format!("{PREFIX}/tasks/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = app.get(&task_path, Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&task_path, Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&task_path, Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_trainings_catalogue() {
    let app = spawn_app().await;
    let (_, token) = app.signed_in("ana@example.com", "EMP-1").await;

    let safety = app
        .shared
        .store
        .create_training(NewTraining {
            title: "Fire safety".into(),
            description: "Evacuation drills".into(),
            category: "safety".into(),
            duration: 45,
            image_url: None,
        })
        .await
        .unwrap();
    app.shared
        .store
        .create_training(NewTraining {
            title: "Onboarding".into(),
            category: "general".into(),
            duration: 30,
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, body) = app.get(&format!("{PREFIX}/trainings"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .get(&format!("{PREFIX}/trainings?category=safety"), Some(&token))
        .await;
    let filtered = body["data"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["title"], "Fire safety");

    let (status, body) = app
        .get(&format!("{PREFIX}/trainings/{}", safety.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 45);

    let (status, _) = app
        .get(&format!("{PREFIX}/trainings/missing"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_embedding_roundtrip() {
    let app = spawn_app().await;
    let (user_id, token) = app.signed_in("ana@example.com", "EMP-1").await;
    let user_path = format!("{PREFIX}/embeddings/user/{user_id}");

    let (status, _) = app
        .json(
            "POST",
            &format!("{PREFIX}/embeddings"),
            None,
            json!({ "user_id": "missing-user", "embedding": [0.1, 0.2] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .json(
            "POST",
            &format!("{PREFIX}/embeddings"),
            None,
            json!({ "user_id": user_id, "embedding": [0.1, 0.2] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let embedding_id = body["data"]["embedding_id"].as_str().unwrap().to_string();

    let (_, body) = app.get(&format!("{PREFIX}/auth/me"), Some(&token)).await;
    assert_eq!(body["data"]["face_embedding_id"], embedding_id.as_str());

    let (status, body) = app.get(&user_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["embedding"], "[0.1,0.2]");

    let (status, _) = app.delete(&user_path, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&user_path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&format!("{PREFIX}/auth/me"), Some(&token)).await;
    assert!(body["data"]["face_embedding_id"].is_null());
}

#[tokio::test]
async fn test_embedding_api_key() {
    let mut config = test_config();
    config.access.embedding_api_key = Some("recognizer-key".to_string());
    let app = spawn_app_with(config).await;
    let (user_id, _) = app.signed_in("ana@example.com", "EMP-1").await;
    let path = format!("{PREFIX}/embeddings/user/{user_id}");

    let (status, _) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::builder()
        .uri(&path)
        .header("X-Api-Key", "recognizer-key")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
