//! Drives the real router against the in-memory store.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, HeaderName, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    activities::model::TypeActivity, app::build_app, auth::jwt::JwtKeys, state::AppState,
    users::model::User,
};

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Sends a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let headers: Vec<(HeaderName, String)> = token
            .map(|t| (header::AUTHORIZATION, format!("Bearer {t}")))
            .into_iter()
            .collect();
        self.request_with(method, uri, &headers, body).await
    }

    pub async fn request_with(
        &self,
        method: Method,
        uri: &str,
        headers: &[(HeaderName, String)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Stores a user directly and returns its id with a valid token.
    pub async fn signup(&self, email: &str) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            surname: "User".into(),
            email: email.into(),
            password_hash: "not-a-hash".into(),
            height: None,
            weight: None,
            health_goal: None,
            dietary_preferences: None,
        };
        self.state.store.users().insert(&user).await.unwrap();
        let token = JwtKeys::from_ref(&self.state).sign(user.id).unwrap();
        (user.id, token)
    }

    pub async fn type_activity(&self, name: &str) -> Uuid {
        let kind = TypeActivity {
            id: Uuid::new_v4(),
            name: name.into(),
        };
        self.state.store.type_activities().insert(&kind).await.unwrap();
        kind.id
    }
}
