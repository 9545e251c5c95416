//! HTTP feature client and driver against an in-process feature server.
//!
//! The stub server mirrors the analysis server's routes:
//! - `/get_zcr/{i}` answers `{ "zcr": .. }`, except index 7 which answers
//!   `{ "error": "index not found" }` with 200
//! - `/get_dom_freq/{i}` answers 60 Hz at 0, an unrelated body at 1 and
//!   plain text at 2
//! - `/get_features/{i}` answers `{ "zcr", "rms" }` below 3 and 404 after

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reactive_particles::error::{ErrorCode, FeatureErrorCodes};
use reactive_particles::features::FeatureSource;
use reactive_particles::render::{FrameSnapshot, RenderSink};
use reactive_particles::{AppConfig, Driver, FeatureError, FeatureKind, HttpFeatureClient};
use serde_json::json;

async fn zcr(Path(index): Path<u64>) -> Json<serde_json::Value> {
    if index == 7 {
        Json(json!({ "error": "index not found" }))
    } else {
        Json(json!({ "zcr": 0.05 }))
    }
}

async fn dom_freq(Path(index): Path<u64>) -> Response {
    match index {
        0 => Json(json!({ "freq": 60.0 })).into_response(),
        1 => Json(json!({ "unexpected": 1 })).into_response(),
        _ => "not json".into_response(),
    }
}

async fn features(Path(index): Path<u64>) -> Response {
    if index < 3 {
        Json(json!({ "zcr": 0.3, "rms": 0.01 * index as f64 })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Index {index} is out of range or no features available")
            })),
        )
            .into_response()
    }
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/get_zcr/:index", get(zcr))
        .route("/get_dom_freq/:index", get(dom_freq))
        .route("/get_features/:index", get(features));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn client_parses_each_route() {
    let client = HttpFeatureClient::new(spawn_server().await);

    let sample = client
        .fetch(FeatureKind::Zcr, 3)
        .await
        .expect("zcr fetch")
        .expect("zcr sample");
    assert_eq!(sample.index, 3);
    assert!((sample.zcr.unwrap() - 0.05).abs() < 1e-6);

    let sample = client
        .fetch(FeatureKind::DominantFrequency, 0)
        .await
        .expect("freq fetch")
        .expect("freq sample");
    assert_eq!(sample.dominant_frequency, Some(60.0));

    let sample = client
        .fetch(FeatureKind::Features, 2)
        .await
        .expect("features fetch")
        .expect("features sample");
    assert_eq!(sample.zcr, Some(0.3));
    assert!((sample.rms.unwrap() - 0.02).abs() < 1e-6);
}

#[tokio::test]
async fn client_maps_failures_to_error_codes() {
    let client = HttpFeatureClient::new(spawn_server().await);

    let err = client.fetch(FeatureKind::Zcr, 7).await.unwrap_err();
    assert_eq!(
        err,
        FeatureError::RemoteFeature {
            message: "index not found".into()
        }
    );

    let err = client.fetch(FeatureKind::Features, 9).await.unwrap_err();
    assert_eq!(err.code(), FeatureErrorCodes::SERVER_STATUS);
    assert!(matches!(err, FeatureError::ServerStatus { status: 404, .. }));

    let err = client
        .fetch(FeatureKind::DominantFrequency, 2)
        .await
        .unwrap_err();
    assert_eq!(err.code(), FeatureErrorCodes::MALFORMED_BODY);

    let dropped = client
        .fetch(FeatureKind::DominantFrequency, 1)
        .await
        .expect("2xx body without freq is not an error");
    assert!(dropped.is_none());
}

struct CountingSink(u64);

impl RenderSink for CountingSink {
    fn render(&mut self, _frame: &FrameSnapshot<'_>) {
        self.0 += 1;
    }
}

#[tokio::test]
async fn driver_holds_zcr_stream_at_failing_index() {
    let base_url = spawn_server().await;
    let mut config = AppConfig::default();
    config.server.base_url = base_url.clone();
    config.polling.streams = vec![FeatureKind::Zcr];
    config.polling.skip_after_failures = None;
    config.field.particle_count = 8;
    config.field.seed = Some(1);

    // 45 frames span 0.75 s, room for well over eight polls
    let mut driver = Driver::new(&config, HttpFeatureClient::new(base_url), CountingSink(0))
        .max_frames(Some(45));
    let summary = driver.run(std::future::pending()).await;

    assert_eq!(summary.frames, 45);
    assert_eq!(driver.sink().0, 45);
    assert_eq!(driver.state().next_index(FeatureKind::Zcr), 7);
    assert!(driver.state().modes().shooting_star);
    let counters = driver.telemetry().counters(FeatureKind::Zcr);
    assert_eq!(counters.succeeded, 7);
    assert!(counters.failed >= 1);
}
