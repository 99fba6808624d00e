// Integration tests for API endpoints.
// They run the real handlers and services against an in-memory SQLite
// database, so no external services are needed.
// Run with: cargo test --test api_test

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test, web, App};
use hangouts_backend::{
    api,
    config::Config,
    db,
    models::{AuthResponse, CommentResponse, FollowUser, PostResponse},
    services::media::MediaClient,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;

async fn test_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    db::schema::setup(&conn).await.expect("Failed to set up schema");
    conn
}

/// Helper function to create a test app
async fn create_test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = Config::from_env().expect("Failed to load configuration");
    let pool = test_db().await;
    let media_client = MediaClient::new(&config);

    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(pool))
        .app_data(web::Data::new(media_client))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(api::auth::register))
                        .route("/login", web::post().to(api::auth::login)),
                )
                .service(
                    web::scope("/users")
                        .route("/me", web::get().to(api::users::me))
                        .route("/me", web::put().to(api::users::update_me))
                        .route("/{id}/follow", web::post().to(api::follow::follow_user))
                        .route("/{id}/unfollow", web::post().to(api::follow::unfollow_user))
                        .route("/{id}/followers", web::get().to(api::follow::followers))
                        .route("/{id}/following", web::get().to(api::follow::following))
                        .route("/{username}", web::get().to(api::users::profile_by_username)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::post().to(api::posts::create_post))
                        .route("/public", web::get().to(api::posts::public_feed))
                        .route("/mine", web::get().to(api::posts::my_posts))
                        .route("/user/{user_id}", web::get().to(api::posts::user_posts))
                        .route("/{post_id}", web::get().to(api::posts::get_post))
                        .route("/{post_id}", web::delete().to(api::posts::delete_post))
                        .route("/{post_id}/like", web::post().to(api::posts::toggle_like))
                        .route("/{post_id}/comments", web::post().to(api::posts::add_comment))
                        .route("/{post_id}/comments", web::get().to(api::posts::get_comments))
                        .route(
                            "/{post_id}/comments/{comment_id}",
                            web::delete().to(api::posts::delete_comment),
                        ),
                ),
        )
}

/// Registers a user and returns (token, user id).
async fn register_user<S>(app: &S, username: &str) -> (String, i64)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "password": "password123",
            "name": username
        }))
        .to_request();

    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "Register should succeed");
    let body: AuthResponse = test::read_body_json(resp).await;
    (body.token, body.user.id)
}

async fn create_post<S>(app: &S, token: &str, content: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "content": content }))
        .to_request();

    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "Create post should succeed");
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["id"].as_i64().expect("post id")
}

#[actix_web::test]
async fn test_register_and_login() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "alice").await;
    assert!(!token.is_empty(), "Token should not be empty");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "alice@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: AuthResponse = test::read_body_json(resp).await;
    assert_eq!(body.user.username, "alice");
}

#[actix_web::test]
async fn test_register_duplicate() {
    let app = test::init_service(create_test_app().await).await;

    register_user(&app, "bob").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "bob@example.com",
            "username": "bob",
            "password": "password123",
            "name": "bob"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::CONFLICT,
        "Duplicate registration should return 409 CONFLICT"
    );
}

#[actix_web::test]
async fn test_register_missing_fields() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "",
            "username": "nobody",
            "password": "password123",
            "name": "nobody"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let app = test::init_service(create_test_app().await).await;

    register_user(&app, "carol").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "carol@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_post_unauthorized() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_empty_post_rejected() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "dave").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::BAD_REQUEST,
        "A post with neither content nor image should be rejected"
    );
}

#[actix_web::test]
async fn test_feed_like_annotation_per_viewer() {
    let app = test::init_service(create_test_app().await).await;

    let (token_a, _) = register_user(&app, "author").await;
    let (token_b, _) = register_user(&app, "fan").await;

    let post_id = create_post(&app, &token_a, "hello").await;

    // Fan likes the post.
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/like", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_b)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Fan sees the post as liked.
    let req = test::TestRequest::get()
        .uri("/api/posts/public")
        .insert_header(("Authorization", format!("Bearer {}", token_b)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let feed: Vec<PostResponse> = test::read_body_json(resp).await;
    assert_eq!(feed.len(), 1);
    assert!(feed[0].liked_by_current_user);
    assert_eq!(feed[0].like_count, 1);
    assert_eq!(feed[0].content.as_deref(), Some("hello"));

    // The author does not.
    let req = test::TestRequest::get()
        .uri("/api/posts/public")
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let feed: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(!feed[0].liked_by_current_user);
}

#[actix_web::test]
async fn test_like_toggle() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "toggler").await;
    let post_id = create_post(&app, &token, "toggle me").await;

    for (pass, expected) in [(1, true), (2, false)] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{}/like", post_id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["liked"].as_bool(),
            Some(expected),
            "Toggle pass {} should report liked={}",
            pass,
            expected
        );
    }
}

#[actix_web::test]
async fn test_follow_and_unfollow() {
    let app = test::init_service(create_test_app().await).await;

    let (token_a, id_a) = register_user(&app, "follower").await;
    let (_token_b, id_b) = register_user(&app, "followed").await;

    // Self-follow is rejected.
    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", id_a))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Follow, then the followed user's followers list contains the follower.
    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", id_b))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}/followers", id_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let followers: Vec<FollowUser> = test::read_body_json(resp).await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, id_a);

    // Unfollow empties the list again.
    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/unfollow", id_b))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}/followers", id_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let followers: Vec<FollowUser> = test::read_body_json(resp).await;
    assert!(followers.is_empty());
}

#[actix_web::test]
async fn test_follow_unknown_user() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "lonely").await;

    let req = test::TestRequest::post()
        .uri("/api/users/9999/follow")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_post_ownership_and_cascade() {
    let app = test::init_service(create_test_app().await).await;

    let (token_owner, _) = register_user(&app, "owner").await;
    let (token_other, _) = register_user(&app, "other").await;

    let post_id = create_post(&app, &token_owner, "short lived").await;

    // Someone comments and likes it.
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_other)))
        .set_json(json!({ "content": "nice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/like", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_other)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A non-owner cannot delete it.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_other)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The owner can, and the comments disappear with it.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_owner)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}/comments", post_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let comments: Vec<CommentResponse> = test::read_body_json(resp).await;
    assert!(comments.is_empty(), "Comments should cascade with the post");
}

#[actix_web::test]
async fn test_delete_comment_scoped_to_post_and_author() {
    let app = test::init_service(create_test_app().await).await;

    let (token_a, _) = register_user(&app, "commenter").await;
    let (token_b, _) = register_user(&app, "bystander").await;

    let post_id = create_post(&app, &token_a, "discuss").await;
    let other_post_id = create_post(&app, &token_a, "unrelated").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post_id))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .set_json(json!({ "content": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let comment: CommentResponse = test::read_body_json(resp).await;

    // Wrong author.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/{}", post_id, comment.id))
        .insert_header(("Authorization", format!("Bearer {}", token_b)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Wrong post.
    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/posts/{}/comments/{}",
            other_post_id, comment.id
        ))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Right post and author.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/{}", post_id, comment.id))
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_profile_update_validation() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "profiled").await;

    let req = test::TestRequest::put()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "bio": "x".repeat(200) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "Bio over 160 chars");

    let req = test::TestRequest::put()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": "New Name", "bio": "hi there" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"].as_str(), Some("New Name"));
    assert_eq!(body["bio"].as_str(), Some("hi there"));
}

#[actix_web::test]
async fn test_profile_by_username() {
    let app = test::init_service(create_test_app().await).await;

    let (token, _) = register_user(&app, "findme").await;

    let req = test::TestRequest::get().uri("/api/users/findme").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"].as_str(), Some("findme"));
    assert!(
        body.get("email").map_or(true, |v| v.is_null()),
        "Public profile must not expose the email address"
    );

    // The owner still sees their own email on /me.
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["email"].as_str(), Some("findme@example.com"));

    let req = test::TestRequest::get().uri("/api/users/ghost").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
