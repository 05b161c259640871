use std::sync::Arc;

use metrix_core::protocol::gzip;
use metrix_core::store::{MemStorage, Repository};
use metrix_server::app_state::{AppState, FlushMode};
use metrix_server::persist::FileStore;
use metrix_server::{router, GAUGE_PRECISION};
use reqwest::StatusCode;

struct TestApp {
    base: String,
    store: Arc<dyn Repository>,
    http: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn spawn_with(state_for: impl FnOnce(Arc<dyn Repository>) -> AppState) -> TestApp {
    let store: Arc<dyn Repository> = Arc::new(MemStorage::with_gauge_precision(GAUGE_PRECISION));
    let app = router::build_router(state_for(Arc::clone(&store)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base: format!("http://{addr}"),
        store,
        http: reqwest::Client::new(),
    }
}

async fn json_body(res: reqwest::Response) -> serde_json::Value {
    serde_json::from_slice(&res.bytes().await.unwrap()).unwrap()
}

async fn spawn_app() -> TestApp {
    spawn_with(AppState::new).await
}

#[tokio::test]
async fn path_updates_accumulate_counters_and_overwrite_gauges() {
    let app = spawn_app().await;

    for (path, expected) in [
        ("/update/counter/hits/5", StatusCode::OK),
        ("/update/counter/hits/3", StatusCode::OK),
        ("/update/gauge/load/10", StatusCode::OK),
        ("/update/gauge/load/12.5", StatusCode::OK),
    ] {
        let res = app.http.post(app.url(path)).send().await.unwrap();
        assert_eq!(res.status(), expected, "{path}");
    }

    let res = app.http.get(app.url("/value/counter/hits")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(res.text().await.unwrap(), "8");

    let res = app.http.get(app.url("/value/gauge/load")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "12.5");
}

#[tokio::test]
async fn bad_path_input_is_400_and_missing_metric_is_404() {
    let app = spawn_app().await;

    for path in [
        "/update/histogram/x/1",
        "/update/counter/x/1.5",
        "/update/counter/x/abc",
        "/update/gauge/x/none",
    ] {
        let res = app.http.post(app.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
    }

    let res = app.http.get(app.url("/value/gauge/absent")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = app.http.get(app.url("/value/summary/absent")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(app.store.export_counters().unwrap().is_empty());
    assert!(app.store.export_gauges().unwrap().is_empty());
}

#[tokio::test]
#[allow(clippy::approx_constant)]
async fn gzip_json_update_is_applied() {
    let app = spawn_app().await;
    let body = gzip::compress(br#"{"id":"x","type":"gauge","value":3.14}"#).unwrap();

    let res = app
        .http
        .post(app.url("/update/"))
        .header("Content-Type", "application/json")
        .header("Content-Encoding", "gzip")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.store.get_gauge("x").unwrap(), 3.14);

    // Same bytes without the encoding header are not JSON.
    let res = app
        .http
        .post(app.url("/update/"))
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn corrupt_gzip_body_is_400() {
    let app = spawn_app().await;
    let res = app
        .http
        .post(app.url("/update/"))
        .header("Content-Type", "application/json")
        .header("Content-Encoding", "gzip")
        .body(&b"\x1f\x8b definitely not deflate"[..])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.export_gauges().unwrap().is_empty());
}

#[tokio::test]
async fn gzip_body_with_trailing_garbage_is_400() {
    let app = spawn_app().await;
    let mut body = gzip::compress(br#"{"id":"x","type":"gauge","value":1}"#).unwrap().to_vec();
    body.extend_from_slice(b"GARBAGE-NOT-GZIP");

    let res = app
        .http
        .post(app.url("/update/"))
        .header("Content-Type", "application/json")
        .header("Content-Encoding", "gzip")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.get_gauge("x").is_err());
}

#[tokio::test]
async fn json_update_answers_with_stored_state() {
    let app = spawn_app().await;

    for delta in [5, 3] {
        let res = app
            .http
            .post(app.url("/update"))
            .header("Content-Type", "application/json")
            .body(format!(r#"{{"id":"hits","type":"counter","delta":{delta}}}"#))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let last = json_body(res).await;
        if delta == 3 {
            assert_eq!(last["delta"], 8);
            assert_eq!(last["type"], "counter");
        }
    }

    let res = app
        .http
        .post(app.url("/update/"))
        .body(r#"{"id":"hits","type":"counter","delta":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST, "content type is required");
}

#[tokio::test]
async fn json_value_lookup() {
    let app = spawn_app().await;
    app.http.post(app.url("/update/gauge/temp/0.123456")).send().await.unwrap();

    let res = app
        .http
        .post(app.url("/value/"))
        .header("Content-Type", "application/json")
        .body(r#"{"id":"temp","type":"gauge"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let m = json_body(res).await;
    assert_eq!(m["id"], "temp");
    assert_eq!(m["value"], 0.123);
    assert!(m.get("delta").is_none());

    let res = app
        .http
        .post(app.url("/value"))
        .header("Content-Type", "application/json")
        .body(r#"{"id":"temp","type":"counter"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_are_compressed_only_on_success() {
    let app = spawn_app().await;
    app.http.post(app.url("/update/counter/hits/2")).send().await.unwrap();

    let res = app
        .http
        .post(app.url("/value/"))
        .header("Content-Type", "application/json")
        .header("Accept-Encoding", "gzip")
        .body(r#"{"id":"hits","type":"counter"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-encoding"], "gzip");
    let plain = gzip::decompress(&res.bytes().await.unwrap(), 1 << 20).unwrap();
    let m: serde_json::Value = serde_json::from_slice(&plain).unwrap();
    assert_eq!(m["delta"], 2);

    let res = app
        .http
        .get(app.url("/value/counter/absent"))
        .header("Accept-Encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get("content-encoding").is_none());
}

#[tokio::test]
async fn zero_quality_gzip_gets_a_plain_body() {
    let app = spawn_app().await;
    app.http.post(app.url("/update/counter/hits/2")).send().await.unwrap();

    let res = app
        .http
        .get(app.url("/value/counter/hits"))
        .header("Accept-Encoding", "gzip;q=0, identity")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-encoding").is_none());
    assert_eq!(res.text().await.unwrap(), "2");
}

#[tokio::test]
async fn index_lists_every_metric() {
    let app = spawn_app().await;
    app.http.post(app.url("/update/counter/PollCount/4")).send().await.unwrap();
    app.http.post(app.url("/update/gauge/Alloc/1.5")).send().await.unwrap();

    let res = app.http.get(app.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
    let html = res.text().await.unwrap();
    assert!(html.contains("PollCount"));
    assert!(html.contains("Alloc"));
}

#[tokio::test]
async fn synchronous_mode_writes_snapshot_before_responding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let file = Arc::new(FileStore::new(&path));

    let app = spawn_with(|store| AppState::with_persistence(store, file, FlushMode::Synchronous)).await;
    let res = app.http.post(app.url("/update/counter/a/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["counters"]["a"], 1);
}
