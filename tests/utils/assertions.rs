//! Test assertion helpers for responses and cookies
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    http::{header, StatusCode},
    response::Response,
};

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Asserts the status and returns the parsed JSON body
pub async fn expect_json(response: Response, expected: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), expected, "unexpected status code");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("body should be JSON")
}

/// Full `Set-Cookie` header for the session cookie, if any
pub fn session_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("auth_token="))
        .map(str::to_string)
}

/// The `name=value` pair a browser would send back
pub fn session_cookie_pair(response: &Response) -> String {
    let set_cookie =
        session_set_cookie(response).expect("response should set the session cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

pub fn assert_profile(body: &serde_json::Value, message: &str, name: &str, email: &str) {
    assert_eq!(body["message"], message);
    assert_eq!(body["name"], name);
    assert_eq!(body["email"], email);
}
