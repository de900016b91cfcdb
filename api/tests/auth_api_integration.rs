//! End-to-end tests of the HTTP surface over in-memory stores

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use hl_api::{create_app, AppState};
use hl_core::services::{
    AuthCollaborators, AuthService, AuthSettings, EmailMessage, EmailService, SmsService,
    SocialVerifierRegistry,
};
use hl_infra::build_stores;
use hl_shared::AppConfig;

#[derive(Clone, Default)]
struct CapturingSms {
    codes: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl SmsService for CapturingSms {
    async fn send_verification_code(&self, phone: &str, code: &str) -> Result<String, String> {
        self.codes.lock().await.push((phone.to_string(), code.to_string()));
        Ok("SM-test".to_string())
    }
}

#[derive(Clone, Default)]
struct CapturingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait]
impl EmailService for CapturingMailer {
    async fn send(&self, message: &EmailMessage) -> bool {
        self.sent.lock().await.push(message.clone());
        true
    }
}

struct Harness {
    state: web::Data<AppState>,
    config: AppConfig,
    sms: CapturingSms,
    mailer: CapturingMailer,
}

async fn harness() -> Harness {
    let mut config = AppConfig::default();
    config.password.bcrypt_cost = 4;

    let sms = CapturingSms::default();
    let mailer = CapturingMailer::default();
    let backends = build_stores(&config).await.unwrap();
    let (auth, _worker) = AuthService::assemble(
        backends.stores.clone(),
        AuthCollaborators {
            sms: Arc::new(sms.clone()),
            email: Arc::new(mailer.clone()),
            social: SocialVerifierRegistry::new(),
        },
        AuthSettings::from(&config),
    )
    .unwrap();

    Harness {
        state: web::Data::new(AppState::new(Arc::new(auth), backends)),
        config,
        sms,
        mailer,
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(create_app($harness.state.clone(), &$harness.config)).await
    };
}

fn reset_token_from(html: &str) -> String {
    let start = html.find("token=").expect("reset link in mail") + "token=".len();
    html[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

#[actix_web::test]
async fn test_register_then_login() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "ana@example.com", "password": "correct-horse", "name": "Ana" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "ana@example.com");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ana@example.com", "password": "correct-horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["accessToken"].as_str().is_some());
    assert!(body["refreshToken"].as_str().is_some());
    assert!(body["expiresIn"].as_i64().unwrap() > 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "ana@example.com", "password": "another-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DUPLICATE_ACCOUNT");
}

#[actix_web::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "bo@example.com", "password": "correct-horse" }))
        .to_request();
    test::call_service(&app, req).await;

    for body in [
        json!({ "email": "bo@example.com", "password": "wrong-horse" }),
        json!({ "email": "nobody@example.com", "password": "correct-horse" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "INVALID_CREDENTIALS");
    }
}

#[actix_web::test]
async fn test_login_without_identifier_is_a_validation_error() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "password": "whatever" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_otp_login_refresh_and_reuse() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-otp")
        .set_json(json!({ "phone": "+15551234567" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["sent"], true);
    assert!(body["expiresAt"].is_string());

    // A second request inside the cooldown is throttled
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-otp")
        .set_json(json!({ "phone": "+15551234567" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("Retry-After"));

    let code = h.sms.codes.lock().await.last().unwrap().1.clone();
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-otp")
        .set_json(json!({ "phone": "+15551234567", "otp": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = test::read_body_json(resp).await;
    assert_eq!(login["user"]["phoneVerified"], true);
    let first_refresh = login["refreshToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .insert_header(("Authorization", format!("Bearer {}", first_refresh)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rotated: Value = test::read_body_json(resp).await;
    let second_refresh = rotated["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // Replaying the rotated token is reuse and kills the session
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refreshToken": first_refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_REUSED");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .insert_header(("Authorization", format!("Bearer {}", second_refresh)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_without_token_is_unauthorized() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post().uri("/api/v1/auth/refresh-token").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_and_logout() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "phone": "+15557654321", "password": "correct-horse" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "phone": "+15557654321", "password": "correct-horse" }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let access = login["accessToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["userId"], login["user"]["id"]);
    assert_eq!(me["role"], "user");

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The access token is unexpired but its session is gone
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "cy@example.com", "password": "old-password" }))
        .to_request();
    test::call_service(&app, req).await;

    for email in ["cy@example.com", "ghost@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/request-password-reset")
            .set_json(json!({ "email": email }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
    }

    h.state.auth.flush_mail().await;
    // Welcome mail from registration plus exactly one reset link
    let resets: Vec<EmailMessage> = h
        .mailer
        .sent
        .lock()
        .await
        .iter()
        .filter(|message| message.html.contains("token="))
        .cloned()
        .collect();
    assert_eq!(resets.len(), 1);
    assert_eq!(resets[0].to, "cy@example.com");
    let token = reset_token_from(&resets[0].html);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({ "token": token, "newPassword": "new-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({ "token": token, "newPassword": "third-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_RESET_TOKEN");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "cy@example.com", "password": "new-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unconfigured_social_provider_is_rejected() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/social-login")
        .set_json(json!({ "provider": "google", "token": "id-token" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNSUPPORTED_PROVIDER");
}

#[actix_web::test]
async fn test_health_and_not_found() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let req = test::TestRequest::get().uri("/api/v1/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
