#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use comics_catalog::models::{NewComic, NewSeries};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn new_series(name: &str, publisher: &str) -> NewSeries {
    NewSeries {
        name: name.to_string(),
        publisher: publisher.to_string(),
        start_year: 1990,
        end_year: None,
        cover_url: format!("https://covers.example/{}.jpg", name.replace(' ', "-")),
    }
}

pub fn new_comic(series_id: comics_catalog::models::EntityId, title: &str, pages: &[&str]) -> NewComic {
    NewComic {
        title: title.to_string(),
        cover_url: "https://covers.example/issue.jpg".to_string(),
        download_urls: vec!["https://dl.example/issue.cbz".to_string()],
        pages: pages.iter().map(|p| p.to_string()).collect(),
        series_id,
    }
}

#[cfg(feature = "http-server")]
pub mod http {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use comics_catalog::config::Environment;
    use comics_catalog::db::repository::FullRepository;
    use comics_catalog::db::LocalRepository;
    use comics_catalog::http::{create_router, AppState};

    pub struct TestResponse {
        pub status: StatusCode,
        pub text: String,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_str(&self.text)
                .unwrap_or_else(|e| panic!("response is not JSON ({}): {}", e, self.text))
        }

        pub fn data(&self) -> Value {
            self.json()["data"].clone()
        }

        pub fn error_code(&self) -> String {
            self.json()["error"].as_str().unwrap_or_default().to_string()
        }
    }

    /// Router over a fresh in-memory repository.
    pub fn test_app() -> Router {
        test_app_with(Arc::new(LocalRepository::new()), Environment::Production)
    }

    pub fn test_app_with(repository: Arc<dyn FullRepository>, environment: Environment) -> Router {
        create_router(AppState::new(repository, environment))
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        send_request(app, request).await
    }

    pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            text: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(app: &Router, uri: &str) -> TestResponse {
        send(app, Method::GET, uri, None).await
    }

    pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
        send(app, Method::POST, uri, Some(body)).await
    }

    pub async fn put(app: &Router, uri: &str, body: Value) -> TestResponse {
        send(app, Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(app: &Router, uri: &str) -> TestResponse {
        send(app, Method::DELETE, uri, None).await
    }
}
