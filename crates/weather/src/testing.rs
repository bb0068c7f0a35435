//! Local stand-in for the weather service.

use axum::{
    Router,
    extract::Query,
    http::{StatusCode, header},
    routing::get,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const MADRID: &str = r#"{"location":{"name":"Madrid","country":"Spain"},"current":{"temp_f":72.4,"condition":{"text":"Sunny"}}}"#;

pub(crate) struct Stub {
    pub url: String,
    pub queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Serve `body` with `status` for every GET, recording query strings.
pub(crate) async fn stub(status: StatusCode, body: &'static str) -> Stub {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let seen = queries.clone();
    let app = Router::new().route(
        "/v1/current.json",
        get(move |Query(query): Query<HashMap<String, String>>| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(query);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Stub {
        url: format!("http://{addr}/v1/current.json"),
        queries,
    }
}

/// A URL on a port nothing listens on.
pub(crate) async fn refused() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/current.json")
}

pub(crate) fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}
