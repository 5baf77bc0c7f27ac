use super::*;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode as AxumStatus, routing::post, Json, Router};
use shared::domain::{UserId, UserProfile};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ApiServerState {
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn record_and_accept(
    State(state): State<ApiServerState>,
    Json(body): Json<serde_json::Value>,
) -> AxumStatus {
    state.bodies.lock().await.push(body);
    AxumStatus::NO_CONTENT
}

async fn create_session(Json(body): Json<SignInRequest>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: UserProfile {
            id: UserId::new(),
            name: "Ana".into(),
            email: body.email,
            avatar_url: None,
        },
        token: "session-token".into(),
    })
}

async fn reject_with_body() -> (AxumStatus, Json<ApiError>) {
    (
        AxumStatus::BAD_REQUEST,
        Json(ApiError::new("User does not exist")),
    )
}

async fn reject_plain() -> (AxumStatus, &'static str) {
    (AxumStatus::INTERNAL_SERVER_ERROR, "boom")
}

async fn spawn_api_server() -> anyhow::Result<(String, ApiServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ApiServerState::default();
    let app = Router::new()
        .route("/password/forgot", post(record_and_accept))
        .route("/password/reset", post(record_and_accept))
        .route("/users", post(reject_with_body))
        .route("/sessions", post(create_session))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

async fn spawn_failing_server() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route("/password/forgot", post(reject_plain));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn forgot_password_posts_email() {
    let (url, state) = spawn_api_server().await.expect("server");
    let api = HttpAuthApi::new(url);

    api.forgot_password(&ForgotPasswordRequest {
        email: "user@example.com".into(),
    })
    .await
    .expect("forgot password");

    let bodies = state.bodies.lock().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], serde_json::json!({ "email": "user@example.com" }));
}

#[tokio::test]
async fn reset_password_sends_camel_case_payload() {
    let (url, state) = spawn_api_server().await.expect("server");
    let api = HttpAuthApi::with_timeout(url, Duration::from_secs(5)).expect("client");

    api.reset_password(&ResetPasswordRequest {
        password: "secret".into(),
        password_confirmation: "secret".into(),
        token: "tok-123".into(),
    })
    .await
    .expect("reset password");

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        serde_json::json!({
            "password": "secret",
            "passwordConfirmation": "secret",
            "token": "tok-123",
        })
    );
}

#[tokio::test]
async fn create_session_decodes_user_and_token() {
    let (url, _state) = spawn_api_server().await.expect("server");
    let api = HttpAuthApi::new(url);

    let session = api
        .create_session(&SignInRequest {
            email: "ana@example.com".into(),
            password: "secret".into(),
        })
        .await
        .expect("session");

    assert_eq!(session.token, "session-token");
    assert_eq!(session.user.email, "ana@example.com");
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let (url, _state) = spawn_api_server().await.expect("server");
    let api = HttpAuthApi::new(url);

    let err = api
        .create_user(&SignUpRequest {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "secret".into(),
        })
        .await
        .expect_err("rejected");

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    match err {
        RequestError::Status {
            endpoint, message, ..
        } => {
            assert_eq!(endpoint, "/users");
            assert_eq!(message, "User does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_reason_phrase() {
    let url = spawn_failing_server().await.expect("server");
    let api = HttpAuthApi::new(url);

    let err = api
        .forgot_password(&ForgotPasswordRequest {
            email: "user@example.com".into(),
        })
        .await
        .expect_err("server error");

    assert!(
        err.to_string().contains("Internal Server Error"),
        "got: {err}"
    );
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpAuthApi::new(format!("http://{addr}"));
    let err = api
        .forgot_password(&ForgotPasswordRequest {
            email: "user@example.com".into(),
        })
        .await
        .expect_err("nobody listening");

    assert!(matches!(err, RequestError::Transport { .. }));
    assert_eq!(err.status(), None);
}
