//! Helpers for reading caller context off a request

use actix_web::{http::header::AUTHORIZATION, HttpRequest};

use hl_core::domain::value_objects::Session;

/// Token of an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Per-request context handed to the auth services
pub fn session_from(req: &HttpRequest) -> Session {
    let mut session = Session::new();
    if let Some(ip) = req.connection_info().realip_remote_addr() {
        session = session.with_client_ip(ip);
    }
    if let Some(agent) = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
    {
        session = session.with_user_agent(agent);
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "bearer   xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("xyz"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        assert!(bearer_token(&TestRequest::default().to_http_request()).is_none());
    }

    #[test]
    fn test_session_carries_user_agent() {
        let req = TestRequest::default()
            .insert_header((actix_web::http::header::USER_AGENT, "heallink-ios/2.1"))
            .to_http_request();
        assert_eq!(session_from(&req).user_agent.as_deref(), Some("heallink-ios/2.1"));
    }
}
