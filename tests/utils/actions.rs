use axum::{
    body::Body,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestApp {
    /// Send a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a bodiless request carrying an optional `Cookie` header
    pub async fn request_with_cookie(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/v1/user/signup",
            serde_json::json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/v1/user/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn verify(&self, cookie: Option<&str>) -> Response {
        self.request_with_cookie(Method::GET, "/api/v1/user/auth-status", cookie)
            .await
    }

    pub async fn logout(&self, cookie: Option<&str>) -> Response {
        self.request_with_cookie(Method::GET, "/api/v1/user/logout", cookie)
            .await
    }

    #[allow(dead_code)]
    pub async fn logout_with_delete(&self, cookie: Option<&str>) -> Response {
        self.request_with_cookie(Method::DELETE, "/api/v1/user/logout", cookie)
            .await
    }

    /// Signs `token` with the app's cookie key and returns the `name=value` pair
    #[allow(dead_code)]
    pub fn signed_cookie_pair(&self, token: &str) -> String {
        let jar = SignedCookieJar::new(self.cookie_key.clone())
            .add(Cookie::new("auth_token", token.to_string()));
        let response = jar.into_response();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }
}
